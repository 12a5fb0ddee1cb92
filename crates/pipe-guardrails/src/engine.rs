// engine.rs — Ordered evaluation of registered guardrails.
//
// The executor calls `evaluate_pre` before a model/tool call and
// `evaluate_post` after it. For each evaluation point the engine:
//
// 1. Selects the guardrails whose phase applies, in registration order.
// 2. Runs each one, containing panics as a warn outcome.
// 3. Counts every check and every violation, and logs violations.
// 4. Stops at the first outcome whose action is block.
//
// The guardrail list is fixed once the engine is shared: registration needs
// `&mut self`, evaluation only `&self`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;

use pipe_observability::{Component, MetricsSink};
use pipe_resources::Phase;

use crate::context::EvaluationContext;
use crate::error::GuardrailError;
use crate::guardrail::{Guardrail, GuardrailInfo};
use crate::outcome::CheckOutcome;

pub const METRIC_CHECKS_TOTAL: &str = "guardrail.checks.total";
pub const METRIC_VIOLATIONS_TOTAL: &str = "guardrail.violations.total";
const METRIC_VIOLATIONS_PREFIX: &str = "guardrail.violations.";

/// Per-guardrail violation counter name.
pub fn violation_metric(guardrail_id: &str) -> String {
    format!("{METRIC_VIOLATIONS_PREFIX}{guardrail_id}")
}

/// The guardrail that halted an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedBy {
    pub guardrail_id: String,
    pub message: String,
}

/// Everything one evaluation point produced.
///
/// `outcomes` holds one entry per guardrail that ran, in order. When
/// `blocked` is set, the last outcome is the blocking one and later
/// guardrails were not invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub phase: Phase,
    pub outcomes: Vec<CheckOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<BlockedBy>,
}

impl EvaluationReport {
    pub fn is_blocked(&self) -> bool {
        self.blocked.is_some()
    }

    /// Failing outcomes, including non-blocking warn and log ones.
    pub fn violations(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    /// The blocking failure as an error; otherwise the outcomes.
    pub fn into_result(self) -> Result<Vec<CheckOutcome>, GuardrailError> {
        match self.blocked {
            Some(BlockedBy {
                guardrail_id,
                message,
            }) => Err(GuardrailError::Blocked {
                guardrail_id,
                message,
            }),
            None => Ok(self.outcomes),
        }
    }
}

pub struct GuardrailEngine {
    guardrails: Vec<Arc<dyn Guardrail>>,
    metrics: Arc<dyn MetricsSink>,
    component: Component,
}

impl GuardrailEngine {
    /// An engine with nothing registered. Logs under `<parent>.guardrails`.
    pub fn new(metrics: Arc<dyn MetricsSink>, parent: &Component) -> Self {
        Self {
            guardrails: Vec::new(),
            metrics,
            component: parent.child("guardrails"),
        }
    }

    pub fn register<G: Guardrail + 'static>(&mut self, guardrail: G) {
        self.register_shared(Arc::new(guardrail));
    }

    /// Register a guardrail the caller keeps a handle to.
    pub fn register_shared(&mut self, guardrail: Arc<dyn Guardrail>) {
        tracing::info!(
            component = %self.component,
            id = guardrail.id(),
            phase = %guardrail.phase(),
            priority = guardrail.priority(),
            "guardrail registered"
        );
        self.guardrails.push(guardrail);
    }

    pub fn len(&self) -> usize {
        self.guardrails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guardrails.is_empty()
    }

    /// Registered guardrails in dispatch order.
    pub fn guardrails(&self) -> Vec<GuardrailInfo> {
        self.guardrails
            .iter()
            .map(|g| GuardrailInfo::of(g.as_ref()))
            .collect()
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn evaluate_pre(&self, ctx: &EvaluationContext) -> EvaluationReport {
        self.evaluate(Phase::Pre, ctx)
    }

    pub fn evaluate_post(&self, ctx: &EvaluationContext) -> EvaluationReport {
        self.evaluate(Phase::Post, ctx)
    }

    /// Run every guardrail that applies at `phase`.
    ///
    /// Evaluating at `Phase::Both` runs every registered guardrail.
    pub fn evaluate(&self, phase: Phase, ctx: &EvaluationContext) -> EvaluationReport {
        let mut outcomes = Vec::new();

        let applicable = self
            .guardrails
            .iter()
            .filter(|g| phase == Phase::Both || g.phase().applies_to(phase));

        for guardrail in applicable {
            let outcome = self.run_one(guardrail.as_ref(), ctx);
            self.metrics.increment(METRIC_CHECKS_TOTAL);

            if outcome.passed() {
                outcomes.push(outcome);
                continue;
            }

            let id = guardrail.id();
            self.metrics.increment(METRIC_VIOLATIONS_TOTAL);
            self.metrics.increment(&violation_metric(id));
            tracing::warn!(
                component = %self.component,
                guardrail = id,
                action = %outcome.action(),
                reason = outcome.message(),
                agent = %ctx.agent,
                execution = %ctx.execution_id,
                "guardrail violation"
            );

            if outcome.is_block() {
                let blocked = BlockedBy {
                    guardrail_id: id.to_string(),
                    message: outcome.message().to_string(),
                };
                outcomes.push(outcome);
                return EvaluationReport {
                    phase,
                    outcomes,
                    blocked: Some(blocked),
                };
            }
            outcomes.push(outcome);
        }

        EvaluationReport {
            phase,
            outcomes,
            blocked: None,
        }
    }

    /// Tell every guardrail that `execution_id` has finished. Returns the
    /// total number of state entries released.
    pub fn forget_execution(&self, execution_id: &str) -> usize {
        let released: usize = self
            .guardrails
            .iter()
            .map(|g| g.forget_execution(execution_id))
            .sum();
        tracing::debug!(
            component = %self.component,
            execution = execution_id,
            released,
            "execution state released"
        );
        released
    }

    fn run_one(&self, guardrail: &dyn Guardrail, ctx: &EvaluationContext) -> CheckOutcome {
        // Guardrails only get `&self` and `&ctx`; stateful ones recover their
        // own poisoned locks, so observing them after a panic is sound.
        match panic::catch_unwind(AssertUnwindSafe(|| guardrail.evaluate(ctx))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::error!(
                    component = %self.component,
                    guardrail = guardrail.id(),
                    reason = %reason,
                    "guardrail panicked"
                );
                CheckOutcome::warn(guardrail.id(), format!("guardrail fault: {reason}"))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
