// mod.rs — Subcommand implementations and the engine setup they share.

pub mod check;
pub mod guardrails;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use pipe_guardrails::{GuardrailEngine, GuardrailSettings};
use pipe_observability::{Component, MetricsSink};
use pipe_resources::load_resources_file;

pub const COMPONENT: &str = "pipe-cli";

/// The engine a command runs against: the Guardrail resources in
/// `definitions` when given, otherwise the default set from settings.
pub fn build_engine(
    settings: &GuardrailSettings,
    definitions: Option<&Path>,
    metrics: Arc<dyn MetricsSink>,
) -> anyhow::Result<GuardrailEngine> {
    let component = Component::new(COMPONENT);
    match definitions {
        Some(path) => {
            let resources = load_resources_file(path)?;
            GuardrailEngine::from_resources(&resources, metrics, &component)
                .with_context(|| format!("loading guardrails from {}", path.display()))
        }
        None => Ok(settings.build_engine(metrics, &component)),
    }
}
