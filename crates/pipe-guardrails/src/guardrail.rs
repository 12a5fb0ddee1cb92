// guardrail.rs — The check abstraction every guardrail implements.

use serde::Serialize;

use pipe_resources::Phase;

use crate::context::EvaluationContext;
use crate::outcome::CheckOutcome;

/// A pluggable pre- or post-call check.
///
/// Implementations are shared across every concurrent execution flow, so
/// `evaluate` takes `&self` and any mutable state must sit behind the
/// implementation's own synchronisation. A panic inside `evaluate` is
/// contained by the engine; stateful checks must not leave their state
/// unusable when that happens.
pub trait Guardrail: Send + Sync {
    /// Stable identifier used in outcomes, logs and metric names.
    fn id(&self) -> &str;

    /// Evaluation point(s) this check runs at.
    fn phase(&self) -> Phase;

    /// Advisory priority. Dispatch order is registration order.
    fn priority(&self) -> i32;

    fn evaluate(&self, ctx: &EvaluationContext) -> CheckOutcome;

    /// Drop any per-execution state held for `execution_id`.
    ///
    /// Called by the executor once an execution has finished. Returns the
    /// number of entries removed. Stateless checks keep the default.
    fn forget_execution(&self, _execution_id: &str) -> usize {
        0
    }
}

/// Listing entry for a registered guardrail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardrailInfo {
    pub id: String,
    pub phase: Phase,
    pub priority: i32,
}

impl GuardrailInfo {
    pub fn of(guardrail: &dyn Guardrail) -> Self {
        Self {
            id: guardrail.id().to_string(),
            phase: guardrail.phase(),
            priority: guardrail.priority(),
        }
    }
}
