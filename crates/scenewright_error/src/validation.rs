//! Input validation error types.

/// Rejected inputs, caught before any external call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Story idea was empty or whitespace
    #[display("Please enter a story idea.")]
    BlankIdea,
    /// Character prompt was empty or whitespace
    #[display("Please describe the character to generate.")]
    BlankCharacterPrompt,
    /// Aspect ratio string is not one of the supported values
    #[display("Unsupported aspect ratio '{}'; expected 16:9, 9:16 or 1:1", _0)]
    UnknownAspectRatio(String),
    /// An input file could not be read
    #[display("Failed to read {}: {}", path, message)]
    UnreadableInput {
        /// Path as given by the caller
        path: String,
        /// Underlying I/O message
        message: String,
    },
}

/// Validation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
