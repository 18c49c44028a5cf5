//! Top-level error wrapper types.

use crate::{ConfigError, ExportError, GeminiError, GenerationError, ValidationError};

/// Every error family in the workspace.
///
/// # Examples
///
/// ```
/// use scenewright_error::{ScenewrightError, ValidationError, ValidationErrorKind};
///
/// let err: ScenewrightError = ValidationError::new(ValidationErrorKind::BlankIdea).into();
/// assert!(format!("{}", err).contains("Please enter a story idea."));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ScenewrightErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Gemini provider error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// Normalized generation failure
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Rejected input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Export failure
    #[from(ExportError)]
    Export(ExportError),
}

/// Scenewright error with kind discrimination.
///
/// # Examples
///
/// ```
/// use scenewright_error::{ConfigError, ConfigErrorKind, ScenewrightErrorKind, ScenewrightResult};
///
/// fn might_fail() -> ScenewrightResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::Parse("missing field".to_string())))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), ScenewrightErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Scenewright Error: {}", _0)]
pub struct ScenewrightError(Box<ScenewrightErrorKind>);

impl ScenewrightError {
    /// Create a new error from a kind.
    pub fn new(kind: ScenewrightErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ScenewrightErrorKind {
        &self.0
    }

    /// The normalized generation failure, if this is one.
    pub fn as_generation(&self) -> Option<&GenerationError> {
        match self.kind() {
            ScenewrightErrorKind::Generation(err) => Some(err),
            _ => None,
        }
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self.kind() {
            ScenewrightErrorKind::Validation(err) => Some(err),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to ScenewrightErrorKind
impl<T> From<T> for ScenewrightError
where
    T: Into<ScenewrightErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Scenewright operations.
pub type ScenewrightResult<T> = std::result::Result<T, ScenewrightError>;
