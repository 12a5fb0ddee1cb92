// error.rs — Error types for the guardrail engine.

use std::path::PathBuf;

use thiserror::Error;

use pipe_resources::ResourceError;

#[derive(Debug, Error)]
pub enum GuardrailError {
    /// A guardrail with action `block` failed during evaluation.
    #[error("blocked by guardrail {guardrail_id}: {message}")]
    Blocked {
        guardrail_id: String,
        message: String,
    },

    /// A Guardrail resource failed definition-time validation.
    #[error("invalid guardrail definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// The definition names a check type this engine does not provide.
    #[error("guardrail '{name}' has unknown type '{guardrail_type}'")]
    UnknownType {
        name: String,
        guardrail_type: String,
    },

    /// A per-type config entry has the wrong shape.
    #[error("guardrail '{name}': config '{field}' {reason}")]
    InvalidConfig {
        name: String,
        field: String,
        reason: String,
    },

    #[error("failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl GuardrailError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GuardrailError::Blocked { .. })
    }
}
