// error.rs — Error types for the resource model.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or interpreting resource definitions.
///
/// Definition-time *validation* problems are not errors: they are collected
/// as [`crate::ValidationError`] entries so the caller decides whether to
/// accept or reject a resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Failed to read a definition file from disk.
    #[error("failed to read resource file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The YAML document could not be parsed into a resource.
    #[error("invalid resource YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The resource spec could not be converted into its typed form.
    #[error("invalid {kind} spec: {source}")]
    InvalidSpec {
        kind: String,
        source: serde_json::Error,
    },

    /// The resource has no spec block at all.
    #[error("resource '{key}' has no spec")]
    MissingSpec { key: String },

    /// The kind string is not one of the known resource kinds.
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    /// The phase string is not one of pre, post, both.
    #[error("unknown guardrail phase '{0}': must be 'pre', 'post', or 'both'")]
    UnknownPhase(String),

    /// The action string is not one of block, warn, log.
    #[error("unknown guardrail action '{0}': must be 'block', 'warn', or 'log'")]
    UnknownAction(String),
}
