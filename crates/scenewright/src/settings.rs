//! Layered configuration loading.

use crate::LoggingConfig;
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use scenewright_error::{ConfigError, ConfigErrorKind, ScenewrightError, ScenewrightResult};
use scenewright_models::GeminiSettings;
use scenewright_pipeline::{GatewayModels, PipelineSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Bundled defaults, shipped with the library.
const DEFAULT_CONFIG: &str = include_str!("../../../scenewright.toml");

/// Top-level Scenewright configuration.
///
/// Loaded with a precedence system where later sources override earlier ones:
/// 1. Bundled defaults (scenewright.toml shipped with the library)
/// 2. User config in the home directory (~/.config/scenewright/scenewright.toml)
/// 3. User config in the current directory (./scenewright.toml)
///
/// # Example
///
/// ```no_run
/// use scenewright::ScenewrightConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScenewrightConfig::load()?;
/// println!("Script model: {}", config.models().script());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters,
)]
#[serde(default)]
pub struct ScenewrightConfig {
    /// `[gemini]` client settings
    gemini: GeminiSettings,
    /// `[models]` per-stage model names
    models: GatewayModels,
    /// `[pipeline]` orchestration settings
    pipeline: PipelineSettings,
    /// `[logging]` subscriber settings
    logging: LoggingConfig,
}

impl ScenewrightConfig {
    /// The bundled defaults alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file does not parse.
    pub fn bundled() -> ScenewrightResult<Self> {
        finish(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load configuration from a specific file layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ScenewrightResult<Self> {
        debug!("Loading configuration from file");
        finish(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from(path.as_ref())),
        )
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> ScenewrightResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/scenewright/scenewright.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("scenewright").required(false));
        finish(builder)
    }

    /// Replace the logging settings.
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Replace the pipeline settings.
    pub fn with_pipeline(mut self, pipeline: PipelineSettings) -> Self {
        self.pipeline = pipeline;
        self
    }
}

fn finish(builder: ConfigBuilder<DefaultState>) -> ScenewrightResult<ScenewrightConfig> {
    builder
        .build()
        .map_err(|e| {
            ScenewrightError::from(ConfigError::new(ConfigErrorKind::Build(e.to_string())))
        })?
        .try_deserialize()
        .map_err(|e| {
            ScenewrightError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string())))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenewright_core::AspectRatio;
    use std::io::Write;

    #[test]
    fn test_bundled_defaults() {
        let config = ScenewrightConfig::bundled().unwrap();

        assert_eq!(config.models(), &GatewayModels::default());
        assert_eq!(config.gemini().api_key_env(), "GEMINI_API_KEY");
        assert_eq!(config.gemini().rpm(), &Some(60));
        assert_eq!(config.pipeline().aspect_ratio, AspectRatio::Landscape);
        assert_eq!(config.pipeline().max_concurrent_visuals, None);
        assert_eq!(config.logging().log_level(), "info");
        assert!(!*config.logging().json_logs());
    }

    #[test]
    fn test_file_overrides_defaults() -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
[models]
image = "imagen-custom"

[pipeline]
aspect_ratio = "9:16"
max_concurrent_visuals = 2

[gemini]
no_retry = true
"#
        )?;

        let config = ScenewrightConfig::from_file(file.path())?;

        assert_eq!(config.models().image(), "imagen-custom");
        assert_eq!(config.models().script(), "gemini-2.5-pro");
        assert_eq!(config.pipeline().aspect_ratio, AspectRatio::Portrait);
        assert_eq!(config.pipeline().max_concurrent_visuals, Some(2));
        assert!(config.gemini().no_retry());
        assert_eq!(config.gemini().timeout_secs(), &180);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ScenewrightConfig::from_file("/nonexistent/scenewright.toml").unwrap_err();
        let scenewright_error::ScenewrightErrorKind::Config(config) = err.kind() else {
            panic!("expected a configuration error, got {err}");
        };
        assert!(matches!(config.kind, ConfigErrorKind::Build(_)));
    }

    #[test]
    fn test_unknown_aspect_ratio_is_rejected() -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[pipeline]\naspect_ratio = \"4:3\"")?;

        let err = ScenewrightConfig::from_file(file.path()).unwrap_err();
        let scenewright_error::ScenewrightErrorKind::Config(config) = err.kind() else {
            panic!("expected a configuration error, got {err}");
        };
        assert!(matches!(config.kind, ConfigErrorKind::Parse(_)));
        Ok(())
    }
}
