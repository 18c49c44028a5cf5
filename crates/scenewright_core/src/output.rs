//! Output types from generation responses.

use crate::ImageData;
use serde::{Deserialize, Serialize};

/// Supported outputs from the generative backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),

    /// Generated image output.
    Image(ImageData),

    /// Structured JSON output.
    Json(serde_json::Value),
}
