// configured.rs — A built-in check bound to a Guardrail resource definition.

use pipe_resources::{EnforcementAction, Phase};

use crate::context::EvaluationContext;
use crate::guardrail::Guardrail;
use crate::outcome::CheckOutcome;

/// Wraps a check with the identity and enforcement a definition declares.
///
/// The definition's name becomes the guardrail id, and its phase and
/// priority replace the check's own. Failing outcomes are re-graded to the
/// declared action; passing outcomes keep their message.
pub struct ConfiguredGuardrail {
    name: String,
    phase: Phase,
    priority: i32,
    action: EnforcementAction,
    inner: Box<dyn Guardrail>,
}

impl ConfiguredGuardrail {
    pub fn new(
        name: impl Into<String>,
        phase: Phase,
        priority: i32,
        action: EnforcementAction,
        inner: Box<dyn Guardrail>,
    ) -> Self {
        Self {
            name: name.into(),
            phase,
            priority,
            action,
            inner,
        }
    }

    pub fn action(&self) -> EnforcementAction {
        self.action
    }

    /// Id of the wrapped check, e.g. "rate-limiter".
    pub fn check_id(&self) -> &str {
        self.inner.id()
    }
}

impl Guardrail for ConfiguredGuardrail {
    fn id(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> CheckOutcome {
        self.inner
            .evaluate(ctx)
            .regrade(self.action)
            .with_guardrail_id(self.name.as_str())
    }

    fn forget_execution(&self, execution_id: &str) -> usize {
        self.inner.forget_execution(execution_id)
    }
}
