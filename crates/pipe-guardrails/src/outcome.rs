// outcome.rs — Result of one guardrail check.
//
// `CheckOutcome` keeps its fields private so that the pairing of `passed`
// and `action` is fixed by construction: a passing outcome always carries
// `Action::None`, and only a failing outcome can block.

use std::fmt;

use serde::Serialize;

use pipe_resources::EnforcementAction;

/// Consequence attached to a check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The check passed.
    None,
    /// Record only.
    Log,
    /// Record and surface, but let the step continue.
    Warn,
    /// Halt the step.
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::None => "none",
            Action::Log => "log",
            Action::Warn => "warn",
            Action::Block => "block",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EnforcementAction> for Action {
    fn from(action: EnforcementAction) -> Self {
        match action {
            EnforcementAction::Block => Action::Block,
            EnforcementAction::Warn => Action::Warn,
            EnforcementAction::Log => Action::Log,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    passed: bool,
    guardrail_id: String,
    message: String,
    action: Action,
}

impl CheckOutcome {
    pub fn pass(guardrail_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            passed: true,
            guardrail_id: guardrail_id.into(),
            message: message.into(),
            action: Action::None,
        }
    }

    pub fn log(guardrail_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::violation(guardrail_id, message, EnforcementAction::Log)
    }

    pub fn warn(guardrail_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::violation(guardrail_id, message, EnforcementAction::Warn)
    }

    pub fn block(guardrail_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::violation(guardrail_id, message, EnforcementAction::Block)
    }

    /// A failing outcome with the given enforcement action.
    pub fn violation(
        guardrail_id: impl Into<String>,
        message: impl Into<String>,
        action: EnforcementAction,
    ) -> Self {
        Self {
            passed: false,
            guardrail_id: guardrail_id.into(),
            message: message.into(),
            action: action.into(),
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn guardrail_id(&self) -> &str {
        &self.guardrail_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn is_block(&self) -> bool {
        self.action == Action::Block
    }

    /// Same verdict and message, reported under a different guardrail id.
    pub fn with_guardrail_id(mut self, guardrail_id: impl Into<String>) -> Self {
        self.guardrail_id = guardrail_id.into();
        self
    }

    /// Replace the action of a failing outcome. Passing outcomes are
    /// returned unchanged.
    pub fn regrade(mut self, action: EnforcementAction) -> Self {
        if !self.passed {
            self.action = action.into();
        }
        self
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            write!(f, "{}: pass ({})", self.guardrail_id, self.message)
        } else {
            write!(f, "{}: {} ({})", self.guardrail_id, self.action, self.message)
        }
    }
}
