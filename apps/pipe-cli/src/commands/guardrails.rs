// guardrails.rs — `pipe guardrails`: list what an engine would run.

use std::path::Path;
use std::sync::Arc;

use pipe_guardrails::GuardrailSettings;
use pipe_observability::NoopMetrics;

pub fn execute(settings: &GuardrailSettings, definitions: Option<&Path>) -> anyhow::Result<()> {
    let engine = super::build_engine(settings, definitions, Arc::new(NoopMetrics))?;

    if engine.is_empty() {
        println!("No guardrails registered.");
        return Ok(());
    }

    println!("{:<4} {:<32} {:<6} PRIORITY", "#", "ID", "PHASE");
    for (i, info) in engine.guardrails().iter().enumerate() {
        println!(
            "{:<4} {:<32} {:<6} {}",
            i + 1,
            info.id,
            info.phase.as_str(),
            info.priority
        );
    }
    Ok(())
}
