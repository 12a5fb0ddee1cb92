// settings.rs — `pipe.toml` settings for the default guardrail set.
//
// ```toml
// [guardrails]
// max_tokens = 4096
// max_repeats = 3
// max_per_minute = 100
// expected_fields = ["answer"]      # enables output schema validation
// injection_patterns = ["..."]      # replaces the built-in phrase list
//
// [logging]
// level = "info"
// json = false
// ```
//
// Every key is optional; a missing file means all defaults.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use pipe_observability::{Component, LogConfig, MetricsSink};

use crate::checks::{
    loop_detection, rate_limiter, token_limit, LoopDetectionGuardrail, PromptInjectionGuardrail,
    RateLimiterGuardrail, SchemaValidationGuardrail, TokenLimitGuardrail,
};
use crate::clock::{Clock, SystemClock};
use crate::engine::GuardrailEngine;
use crate::error::GuardrailError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailSettings {
    pub guardrails: DefaultGuardrails,
    pub logging: LogConfig,
}

/// Limits for the built-in guardrail set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultGuardrails {
    pub max_tokens: usize,
    pub max_repeats: u32,
    pub max_per_minute: usize,
    /// Top-level keys required in step output. Empty disables the check.
    pub expected_fields: Vec<String>,
    pub injection_patterns: Option<Vec<String>>,
}

impl Default for DefaultGuardrails {
    fn default() -> Self {
        Self {
            max_tokens: token_limit::DEFAULT_MAX_TOKENS,
            max_repeats: loop_detection::DEFAULT_MAX_REPEATS,
            max_per_minute: rate_limiter::DEFAULT_MAX_PER_MINUTE,
            expected_fields: Vec::new(),
            injection_patterns: None,
        }
    }
}

impl GuardrailSettings {
    pub fn load(path: &Path) -> Result<Self, GuardrailError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| GuardrailError::SettingsRead {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| GuardrailError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings, falling back to defaults when the file is absent.
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, GuardrailError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// The default guardrail set, in dispatch order: prompt injection,
    /// token limit, loop detection, rate limiter, then output schema
    /// validation when expected fields are configured.
    pub fn build_engine(&self, metrics: Arc<dyn MetricsSink>, parent: &Component) -> GuardrailEngine {
        self.build_engine_with_clock(metrics, parent, Arc::new(SystemClock))
    }

    pub fn build_engine_with_clock(
        &self,
        metrics: Arc<dyn MetricsSink>,
        parent: &Component,
        clock: Arc<dyn Clock>,
    ) -> GuardrailEngine {
        let limits = &self.guardrails;
        let mut engine = GuardrailEngine::new(metrics, parent);

        match &limits.injection_patterns {
            Some(patterns) => engine.register(PromptInjectionGuardrail::with_patterns(patterns)),
            None => engine.register(PromptInjectionGuardrail::new()),
        }
        engine.register(TokenLimitGuardrail::new(limits.max_tokens));
        engine.register(LoopDetectionGuardrail::new(limits.max_repeats));
        engine.register(RateLimiterGuardrail::with_clock(limits.max_per_minute, clock));
        if !limits.expected_fields.is_empty() {
            engine.register(SchemaValidationGuardrail::new(limits.expected_fields.iter().cloned()));
        }
        engine
    }
}

impl GuardrailEngine {
    /// The built-in guardrail set with default limits.
    pub fn with_defaults(metrics: Arc<dyn MetricsSink>, parent: &Component) -> Self {
        GuardrailSettings::default().build_engine(metrics, parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipe_observability::NoopMetrics;
    use pipe_resources::Phase;
    use tempfile::tempdir;

    fn ids(engine: &GuardrailEngine) -> Vec<String> {
        engine.guardrails().into_iter().map(|g| g.id).collect()
    }

    #[test]
    fn defaults_register_four_guardrails_in_order() {
        let engine = GuardrailEngine::with_defaults(Arc::new(NoopMetrics), &Component::new("t"));
        assert_eq!(
            ids(&engine),
            vec!["prompt-injection", "token-limit", "loop-detection", "rate-limiter"]
        );
        let listed = engine.guardrails();
        assert_eq!(listed[2].phase, Phase::Both);
        assert_eq!(listed[3].priority, 95);
    }

    #[test]
    fn expected_fields_add_schema_validation() {
        let mut settings = GuardrailSettings::default();
        settings.guardrails.expected_fields = vec!["answer".into()];
        let engine = settings.build_engine(Arc::new(NoopMetrics), &Component::new("t"));
        assert_eq!(ids(&engine).last().map(String::as_str), Some("output-schema-validation"));
        assert_eq!(engine.len(), 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipe.toml");
        std::fs::write(
            &path,
            "[guardrails]\nmax_tokens = 512\n\n[logging]\njson = true\n",
        )
        .unwrap();

        let settings = GuardrailSettings::load(&path).unwrap();
        assert_eq!(settings.guardrails.max_tokens, 512);
        assert_eq!(settings.guardrails.max_repeats, 3);
        assert_eq!(settings.guardrails.max_per_minute, 100);
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn missing_file_is_default_but_broken_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(
            GuardrailSettings::load_or_default(&missing).unwrap(),
            GuardrailSettings::default()
        );

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[guardrails\nmax_tokens = ").unwrap();
        let err = GuardrailSettings::load_or_default(&broken).unwrap_err();
        assert!(matches!(err, GuardrailError::SettingsParse { .. }));
    }
}
