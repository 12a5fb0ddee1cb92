// error.rs — Error types for observability setup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// The configured log level is not a valid filter directive.
    #[error("invalid log filter '{level}': {source}")]
    InvalidFilter {
        level: String,
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber was already installed.
    #[error("logging already initialised: {0}")]
    AlreadyInitialised(#[from] tracing_subscriber::util::TryInitError),
}
