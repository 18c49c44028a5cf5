//! Logging setup for the binary.

use scenewright_error::{ConfigError, ConfigErrorKind, ScenewrightResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "scenewright=debug")
    log_level: String,
    /// Emit JSON-formatted logs
    json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl LoggingConfig {
    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// The filter to install. `RUST_LOG` wins over the configured level.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns a configuration error if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> ScenewrightResult<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let result = if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };

    result.map_err(|e| ConfigError::new(ConfigErrorKind::Logging(e.to_string())))?;
    tracing::debug!(log_level = %config.log_level, json = config.json_logs, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = LoggingConfig::default()
            .with_log_level("debug")
            .with_json_logs(true);

        assert_eq!(config.log_level(), "debug");
        assert!(*config.json_logs());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: LoggingConfig = from_override("json_logs", true);
        assert_eq!(config.log_level(), "info");
        assert!(*config.json_logs());
    }

    fn from_override(key: &str, value: bool) -> LoggingConfig {
        config::Config::builder()
            .set_override(key, value)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
