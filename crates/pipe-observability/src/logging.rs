// logging.rs — Process-wide tracing subscriber setup.
//
// Logs go to stderr so stdout stays free for command output (the CLI prints
// JSON reports there). `RUST_LOG` takes precedence over the configured level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ObservabilityError;

/// Logging settings, usually read from the `[logging]` table of `pipe.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "pipe_guardrails=debug".
    pub level: String,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    /// The filter this config resolves to, honouring `RUST_LOG` first.
    pub fn env_filter(&self) -> Result<EnvFilter, ObservabilityError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|source| ObservabilityError::InvalidFilter {
                level: self.level.clone(),
                source,
            })
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<(), ObservabilityError> {
    let filter = config.env_filter()?;

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
            .try_init()?;
    }

    tracing::debug!(level = %config.level, json = config.json, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: LogConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert_eq!(config.level, "info");
        assert!(config.json);
    }

    #[test]
    fn bad_level_is_reported() {
        // Only meaningful when RUST_LOG is unset; otherwise the env wins.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            level: "pipe=loudest".to_string(),
            json: false,
        };
        let err = config.env_filter().unwrap_err();
        assert!(err.to_string().contains("pipe=loudest"));
    }
}
