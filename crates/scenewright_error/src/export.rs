//! Export error types.

/// Kinds of export errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ExportErrorKind {
    /// Image payload was not valid base64
    #[display("Failed to decode image for scene {}: {}", scene_number, message)]
    ImageDecode {
        /// Scene whose keyframe failed to decode
        scene_number: u32,
        /// Decoder message
        message: String,
    },
    /// Title card payload was not valid base64
    #[display("Failed to decode thumbnail: {}", _0)]
    ThumbnailDecode(String),
    /// Zip archive could not be written
    #[display("Failed to write archive: {}", _0)]
    Archive(String),
    /// Failed to create the output directory
    #[display("Failed to create output directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write an output file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
}

/// Export error with location tracking.
///
/// # Examples
///
/// ```
/// use scenewright_error::{ExportError, ExportErrorKind};
///
/// let err = ExportError::new(ExportErrorKind::Archive("disk full".to_string()));
/// assert!(format!("{}", err).contains("disk full"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Export Error: {} at line {} in {}", kind, line, file)]
pub struct ExportError {
    /// The kind of error that occurred
    pub kind: ExportErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ExportError {
    /// Create a new export error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ExportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
