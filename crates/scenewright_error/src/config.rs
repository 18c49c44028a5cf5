//! Configuration error types.

/// Ways loading settings or installing logging can fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A settings source could not be read or merged
    #[display("Failed to build configuration: {}", _0)]
    Build(String),
    /// Merged settings did not match the expected shape
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
    /// The global tracing subscriber could not be installed
    #[display("Failed to initialize logging: {}", _0)]
    Logging(String),
}

/// Configuration error with location tracking.
///
/// # Examples
///
/// ```
/// use scenewright_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Parse("unknown aspect ratio".to_string()));
/// assert!(format!("{}", err).contains("unknown aspect ratio"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
