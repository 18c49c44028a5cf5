//! Request and response types for generation.

use crate::{AspectRatio, ImageData, Message, Output};
use serde::{Deserialize, Serialize};

/// Shape of the text the backend should return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,
    /// JSON constrained to a schema
    Json {
        /// Provider-neutral JSON schema (OpenAPI subset)
        schema: serde_json::Value,
    },
}

/// Modality the backend should answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ResponseModality {
    /// Text parts
    #[strum(serialize = "TEXT")]
    Text,
    /// Image parts
    #[strum(serialize = "IMAGE")]
    Image,
}

/// Generic generation request (multimodal-safe).
///
/// # Examples
///
/// ```
/// use scenewright_core::{GenerateRequest, Message, ResponseFormat};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user_text("Hello!")])
///     .model(Some("gemini-2.5-flash".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(request.response_format(), &ResponseFormat::Text);
/// assert!(!request.wants_image());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    messages: Vec<Message>,
    /// Instruction sent as the provider's system instruction
    system_prompt: Option<String>,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Model identifier to use
    model: Option<String>,
    /// Requested text shape
    response_format: ResponseFormat,
    /// Requested response modalities (empty means provider default)
    response_modalities: Vec<ResponseModality>,
    /// Aspect ratio for image outputs
    aspect_ratio: Option<AspectRatio>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// Whether this request asks for an image.
    pub fn wants_image(&self) -> bool {
        self.response_modalities.contains(&ResponseModality::Image)
    }

    /// Whether this request asks for schema-constrained JSON.
    pub fn wants_json(&self) -> bool {
        matches!(self.response_format, ResponseFormat::Json { .. })
    }

    /// All text inputs, in order.
    pub fn text_inputs(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .flat_map(|msg| &msg.content)
            .filter_map(|input| input.as_text())
    }

    /// All image inputs, in order.
    pub fn image_inputs(&self) -> impl Iterator<Item = &ImageData> {
        self.messages
            .iter()
            .flat_map(|msg| &msg.content)
            .filter_map(|input| match input {
                crate::Input::Image(image) => Some(image),
                crate::Input::Text(_) => None,
            })
    }
}

/// The unified response object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenated text outputs.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// The first image output, if any.
    pub fn first_image(&self) -> Option<&ImageData> {
        self.outputs.iter().find_map(|output| match output {
            Output::Image(image) => Some(image),
            _ => None,
        })
    }
}
