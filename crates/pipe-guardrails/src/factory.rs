// factory.rs — Builds guardrails from Guardrail resource definitions.
//
// A definition names a check type and carries a per-type config map:
//
//   prompt-injection   patterns: [string]        (default phrase list)
//   token-limit        maxTokens: integer        (default 4096)
//   loop-detection     maxRepeats: integer       (default 3)
//   rate-limiter       maxPerMinute: integer     (default 100)
//   schema-validation  expectedFields: [string]  (default none)
//
// Unknown keys are ignored. A key with the wrong shape is an error.

use std::sync::Arc;

use serde_json::{Map, Value};

use pipe_observability::{Component, MetricsSink};
use pipe_resources::{validate_resource, GenericResource, GuardrailSpec, ResourceKind};

use crate::checks::{
    loop_detection, rate_limiter, token_limit, LoopDetectionGuardrail, PromptInjectionGuardrail,
    RateLimiterGuardrail, SchemaValidationGuardrail, TokenLimitGuardrail,
};
use crate::clock::{Clock, SystemClock};
use crate::configured::ConfiguredGuardrail;
use crate::engine::GuardrailEngine;
use crate::error::GuardrailError;
use crate::guardrail::Guardrail;

pub const TYPE_PROMPT_INJECTION: &str = "prompt-injection";
pub const TYPE_TOKEN_LIMIT: &str = "token-limit";
pub const TYPE_LOOP_DETECTION: &str = "loop-detection";
pub const TYPE_RATE_LIMITER: &str = "rate-limiter";
pub const TYPE_SCHEMA_VALIDATION: &str = "schema-validation";

pub const SUPPORTED_TYPES: &[&str] = &[
    TYPE_PROMPT_INJECTION,
    TYPE_TOKEN_LIMIT,
    TYPE_LOOP_DETECTION,
    TYPE_RATE_LIMITER,
    TYPE_SCHEMA_VALIDATION,
];

pub struct GuardrailFactory {
    clock: Arc<dyn Clock>,
}

impl Default for GuardrailFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardrailFactory {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Rate limiters built by this factory read time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Build the check described by `spec`, identified as `name`.
    pub fn build(
        &self,
        spec: &GuardrailSpec,
        name: &str,
    ) -> Result<ConfiguredGuardrail, GuardrailError> {
        let config = &spec.config;
        let inner: Box<dyn Guardrail> = match spec.guardrail_type.as_str() {
            TYPE_PROMPT_INJECTION => match string_list(config, name, "patterns")? {
                Some(patterns) => Box::new(PromptInjectionGuardrail::with_patterns(patterns)),
                None => Box::new(PromptInjectionGuardrail::new()),
            },
            TYPE_TOKEN_LIMIT => {
                let max = integer(config, name, "maxTokens")?
                    .unwrap_or(token_limit::DEFAULT_MAX_TOKENS as u64);
                Box::new(TokenLimitGuardrail::new(to_usize(max, name, "maxTokens")?))
            }
            TYPE_LOOP_DETECTION => {
                let max = integer(config, name, "maxRepeats")?
                    .unwrap_or(u64::from(loop_detection::DEFAULT_MAX_REPEATS));
                let max = u32::try_from(max).map_err(|_| invalid(name, "maxRepeats", "is too large"))?;
                Box::new(LoopDetectionGuardrail::new(max))
            }
            TYPE_RATE_LIMITER => {
                let max = integer(config, name, "maxPerMinute")?
                    .unwrap_or(rate_limiter::DEFAULT_MAX_PER_MINUTE as u64);
                Box::new(RateLimiterGuardrail::with_clock(
                    to_usize(max, name, "maxPerMinute")?,
                    Arc::clone(&self.clock),
                ))
            }
            TYPE_SCHEMA_VALIDATION => {
                let fields = string_list(config, name, "expectedFields")?.unwrap_or_default();
                Box::new(SchemaValidationGuardrail::new(fields))
            }
            other => {
                return Err(GuardrailError::UnknownType {
                    name: name.to_string(),
                    guardrail_type: other.to_string(),
                })
            }
        };

        Ok(ConfiguredGuardrail::new(
            name,
            spec.phase,
            spec.priority,
            spec.action,
            inner,
        ))
    }

    /// Validate and register every Guardrail resource, in document order.
    /// Other kinds are skipped. Returns how many guardrails were registered.
    ///
    /// Nothing is registered if any definition is invalid.
    pub fn register_resources(
        &self,
        engine: &mut GuardrailEngine,
        resources: &[GenericResource],
    ) -> Result<usize, GuardrailError> {
        let mut built = Vec::new();
        for resource in resources {
            if resource.resource_kind().ok() != Some(ResourceKind::Guardrail) {
                tracing::debug!(key = %resource.key(), "skipping non-guardrail resource");
                continue;
            }
            let report = validate_resource(resource);
            if !report.is_valid() {
                return Err(GuardrailError::InvalidDefinition {
                    name: resource.key(),
                    reason: report.to_string(),
                });
            }
            let spec: GuardrailSpec = resource.typed_spec()?;
            built.push(self.build(&spec, &resource.metadata.name)?);
        }

        let count = built.len();
        for guardrail in built {
            engine.register(guardrail);
        }
        Ok(count)
    }
}

impl GuardrailEngine {
    /// An engine holding exactly the Guardrail resources in `resources`.
    pub fn from_resources(
        resources: &[GenericResource],
        metrics: Arc<dyn MetricsSink>,
        parent: &Component,
    ) -> Result<Self, GuardrailError> {
        let mut engine = GuardrailEngine::new(metrics, parent);
        GuardrailFactory::new().register_resources(&mut engine, resources)?;
        Ok(engine)
    }
}

fn invalid(name: &str, field: &str, reason: &str) -> GuardrailError {
    GuardrailError::InvalidConfig {
        name: name.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn integer(config: &Map<String, Value>, name: &str, field: &str) -> Result<Option<u64>, GuardrailError> {
    match config.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(name, field, "must be a non-negative integer")),
    }
}

fn to_usize(value: u64, name: &str, field: &str) -> Result<usize, GuardrailError> {
    usize::try_from(value).map_err(|_| invalid(name, field, "is too large"))
}

fn string_list(
    config: &Map<String, Value>,
    name: &str,
    field: &str,
) -> Result<Option<Vec<String>>, GuardrailError> {
    let Some(value) = config.get(field) else {
        return Ok(None);
    };
    let not_a_list = || invalid(name, field, "must be a list of strings");
    let items = value.as_array().ok_or_else(not_a_list)?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(not_a_list))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
