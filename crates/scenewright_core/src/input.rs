//! Input types for generation requests.

use crate::ImageData;
use serde::{Deserialize, Serialize};

/// Supported inputs to the generative backend.
///
/// # Examples
///
/// ```
/// use scenewright_core::{ImageData, Input};
///
/// let text = Input::Text("A lighthouse at dusk".to_string());
/// let image = Input::Image(ImageData::png("iVBORw0KGgo="));
/// assert!(text.as_text().is_some());
/// assert!(image.as_text().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    /// Plain text input.
    Text(String),

    /// Inline image input (reference characters, images to edit).
    Image(ImageData),
}

impl Input {
    /// Text content, if this is a text input.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Input::Text(text) => Some(text),
            Input::Image(_) => None,
        }
    }
}
