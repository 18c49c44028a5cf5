//! Google Gemini REST client.
//!
//! [`GeminiClient`] speaks the `generateContent` endpoint directly over reqwest,
//! so multimodal inputs (reference images, images to edit) and image outputs
//! travel as inline base64 parts.

mod client;
mod protocol;

pub use client::GeminiClient;
pub use protocol::{
    ApiErrorBody, ApiErrorEnvelope, Candidate, CandidateContent, Content, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, ImageConfig, InlineData, InlineDataPart, Part,
    PromptFeedback, ResponsePart, SystemInstruction, TextPart,
};

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, scenewright_error::GeminiError>;
