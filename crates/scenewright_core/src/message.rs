//! Message types for generation requests.

use crate::{Input, Role};
use serde::{Deserialize, Serialize};

/// A multimodal message sent to the generative backend.
///
/// # Examples
///
/// ```
/// use scenewright_core::{Input, Message, Role};
///
/// let message = Message::user(vec![Input::Text("Hello!".to_string())]);
/// assert_eq!(message.role, Role::User);
/// assert_eq!(message.content.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The content of the message (can be multimodal)
    pub content: Vec<Input>,
}

impl Message {
    /// A user message with the given content.
    pub fn user(content: Vec<Input>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// A single-text user message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Input::Text(text.into())])
    }
}
