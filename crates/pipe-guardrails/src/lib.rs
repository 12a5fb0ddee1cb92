//! # pipe-guardrails
//!
//! Policy enforcement on agent pipeline steps.
//!
//! The executor builds an [`EvaluationContext`] for each step and asks the
//! [`GuardrailEngine`] to evaluate it twice: before the model or tool call
//! ([`GuardrailEngine::evaluate_pre`]) and after it, with the output filled in
//! ([`GuardrailEngine::evaluate_post`]). Each registered [`Guardrail`] whose
//! phase applies produces a [`CheckOutcome`]; the first outcome with action
//! `block` ends the evaluation and the step must not proceed.
//!
//! Built-in checks live in [`checks`]: prompt injection, token limit, loop
//! detection, per-agent rate limiting and output schema validation. They can
//! be assembled from `pipe.toml` ([`GuardrailSettings`]) or from Guardrail
//! resource definitions ([`GuardrailFactory`]).
//!
//! ## Key invariants
//!
//! - **Registration order is dispatch order.** Priority is reported but does
//!   not reorder checks.
//! - **A block stops the phase.** Guardrails after the blocking one are not
//!   invoked for that evaluation.
//! - **Faults are contained.** A panicking guardrail yields a warn outcome
//!   and the remaining guardrails still run.
//! - **Shared state is per guardrail.** The loop detector and rate limiter
//!   each own their map and lock; the engine itself is immutable once
//!   shared.

pub mod checks;
pub mod clock;
pub mod configured;
pub mod context;
pub mod engine;
pub mod error;
pub mod factory;
pub mod fingerprint;
pub mod guardrail;
pub mod outcome;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use configured::ConfiguredGuardrail;
pub use context::EvaluationContext;
pub use engine::{
    violation_metric, BlockedBy, EvaluationReport, GuardrailEngine, METRIC_CHECKS_TOTAL,
    METRIC_VIOLATIONS_TOTAL,
};
pub use error::GuardrailError;
pub use factory::{GuardrailFactory, SUPPORTED_TYPES};
pub use guardrail::{Guardrail, GuardrailInfo};
pub use outcome::{Action, CheckOutcome};
pub use settings::{DefaultGuardrails, GuardrailSettings};

// Re-exported so callers need only this crate for the guardrail vocabulary.
pub use pipe_resources::{EnforcementAction, Phase};
