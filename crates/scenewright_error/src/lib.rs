//! Error types for the Scenewright library.
//!
//! This crate provides the foundation error types used throughout the Scenewright workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use scenewright_error::{ScenewrightResult, ValidationError, ValidationErrorKind};
//!
//! fn check_idea(idea: &str) -> ScenewrightResult<()> {
//!     if idea.trim().is_empty() {
//!         Err(ValidationError::new(ValidationErrorKind::BlankIdea))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_idea("   ").is_err());
//! assert!(check_idea("A lighthouse keeper").is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod export;
mod gemini;
mod generation;
mod validation;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{ScenewrightError, ScenewrightErrorKind, ScenewrightResult};
pub use export::{ExportError, ExportErrorKind};
pub use gemini::{GeminiError, GeminiErrorKind, RetryableError};
pub use generation::{GenerationError, GenerationErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
