// spec.rs — Typed spec blocks and the guardrail vocabulary.
//
// `Phase` and `EnforcementAction` live here rather than in the guardrail
// engine because they are part of the definition surface: the validator
// checks them and the engine consumes them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ResourceError;

/// When a guardrail applies: before the model/tool call, after it, or both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pre,
    Post,
    Both,
}

impl Phase {
    /// Whether a guardrail declared with this phase runs at `target`.
    ///
    /// `target` is an evaluation point (`Pre` or `Post`); `Both` applies to
    /// either.
    pub fn applies_to(self, target: Phase) -> bool {
        self == target || self == Phase::Both
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Post => "post",
            Phase::Both => "both",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(Phase::Pre),
            "post" => Ok(Phase::Post),
            "both" => Ok(Phase::Both),
            other => Err(ResourceError::UnknownPhase(other.to_string())),
        }
    }
}

/// What happens when a configured guardrail fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementAction {
    /// Halt the pipeline step.
    Block,
    /// Record the violation and continue.
    Warn,
    /// Record only.
    Log,
}

impl EnforcementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementAction::Block => "block",
            EnforcementAction::Warn => "warn",
            EnforcementAction::Log => "log",
        }
    }
}

impl fmt::Display for EnforcementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnforcementAction {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(EnforcementAction::Block),
            "warn" => Ok(EnforcementAction::Warn),
            "log" => Ok(EnforcementAction::Log),
            other => Err(ResourceError::UnknownAction(other.to_string())),
        }
    }
}

/// Spec block of a `Guardrail` resource.
///
/// ```yaml
/// spec:
///   type: token-limit
///   phase: pre
///   action: block
///   priority: 90
///   config:
///     maxTokens: 2048
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailSpec {
    #[serde(default)]
    pub description: String,
    /// Check type, e.g. "prompt-injection" or "rate-limiter".
    #[serde(rename = "type")]
    pub guardrail_type: String,
    pub phase: Phase,
    pub action: EnforcementAction,
    /// Advisory priority. Dispatch order is registration order.
    #[serde(default)]
    pub priority: i32,
    /// Per-type settings (maxTokens, maxRepeats, maxPerMinute, expectedFields, patterns).
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// Spec block of an `Agent` resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    #[serde(default)]
    pub description: String,
    pub runtime: String,
    pub model: ModelConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    /// Names of Guardrail resources applied to this agent's steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guardrails: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
    #[serde(default)]
    pub max_retries: u32,
}

/// Model selection for an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: u32,
}

/// Spec block of a `Tool` resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    #[serde(default)]
    pub description: String,
    /// Transport type, e.g. "http" or "command".
    #[serde(rename = "type")]
    pub tool_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub schema: ToolSchema,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
    /// Duration string such as "30s".
    #[serde(default)]
    pub timeout: String,
}

/// Input/output JSON schemas of a tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    #[serde(default)]
    pub input: Map<String, Value>,
    #[serde(default)]
    pub output: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenericResource;

    #[test]
    fn phase_applies_to_itself_and_both() {
        assert!(Phase::Pre.applies_to(Phase::Pre));
        assert!(!Phase::Pre.applies_to(Phase::Post));
        assert!(Phase::Post.applies_to(Phase::Post));
        assert!(Phase::Both.applies_to(Phase::Pre));
        assert!(Phase::Both.applies_to(Phase::Post));
    }

    #[test]
    fn phase_typo_is_an_error() {
        assert_eq!("both".parse::<Phase>().unwrap(), Phase::Both);
        let err = "prre".parse::<Phase>().unwrap_err();
        assert!(err.to_string().contains("prre"));
    }

    #[test]
    fn action_round_trips_through_strings() {
        for action in [
            EnforcementAction::Block,
            EnforcementAction::Warn,
            EnforcementAction::Log,
        ] {
            assert_eq!(action.as_str().parse::<EnforcementAction>().unwrap(), action);
        }
        assert!("deny".parse::<EnforcementAction>().is_err());
    }

    #[test]
    fn guardrail_spec_from_resource() {
        let resource = GenericResource::from_yaml_str(
            r#"
apiVersion: pipe/v1
kind: Guardrail
metadata:
  name: short-prompts
  namespace: default
  version: "1"
spec:
  type: token-limit
  phase: pre
  action: warn
  priority: 90
  config:
    maxTokens: 2048
"#,
        )
        .unwrap();

        let spec: GuardrailSpec = resource.typed_spec().unwrap();
        assert_eq!(spec.guardrail_type, "token-limit");
        assert_eq!(spec.phase, Phase::Pre);
        assert_eq!(spec.action, EnforcementAction::Warn);
        assert_eq!(spec.priority, 90);
        assert_eq!(spec.config["maxTokens"], 2048);
    }

    #[test]
    fn agent_spec_uses_camel_case_keys() {
        let resource = GenericResource::from_yaml_str(
            r#"
kind: Agent
spec:
  runtime: python
  maxRetries: 3
  guardrails: [short-prompts]
  model:
    provider: anthropic
    name: claude
    maxTokens: 1024
"#,
        )
        .unwrap();

        let spec: AgentSpec = resource.typed_spec().unwrap();
        assert_eq!(spec.max_retries, 3);
        assert_eq!(spec.model.max_tokens, 1024);
        assert_eq!(spec.guardrails, vec!["short-prompts".to_string()]);
    }
}
