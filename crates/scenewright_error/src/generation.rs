//! Generation pipeline error types.
//!
//! These are the normalized failures the generation gateway reports, independent
//! of which provider produced them.

/// Specific error conditions for a generation round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Transport, service, or provider failure
    #[display("Generation failed: {}", _0)]
    Failed(String),
    /// The provider reported an exhausted quota or rate limit
    #[display("Quota exceeded: {}", _0)]
    QuotaExceeded(String),
    /// Structured screenplay response did not match the expected schema
    #[display("Malformed screenplay: {}", _0)]
    MalformedScreenplay(String),
    /// The image response carried no image payload
    #[display("No image data returned from the generation service")]
    NoImageReturned,
}

impl GenerationErrorKind {
    /// Whether this failure is caused by an exhausted quota.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, GenerationErrorKind::QuotaExceeded(_))
    }
}

/// Error type for gateway operations.
///
/// # Examples
///
/// ```
/// use scenewright_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::NoImageReturned);
/// assert!(format!("{}", err).contains("No image data"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error condition
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
