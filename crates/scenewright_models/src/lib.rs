//! Generative provider integrations for Scenewright.
//!
//! Currently a single provider is supported: Google Gemini over the REST
//! `generateContent` endpoint, with text, structured JSON and image output.
//!
//! # Example
//!
//! ```no_run
//! use scenewright_core::{GenerateRequest, Message};
//! use scenewright_interface::GenerativeDriver;
//! use scenewright_models::{GeminiClient, GeminiSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::from_settings(&GeminiSettings::default(), "gemini-2.5-flash")?;
//! let request = GenerateRequest::builder()
//!     .messages(vec![Message::user_text("Describe a lighthouse at dusk.")])
//!     .build()?;
//! let response = client.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;
mod rate_limit;
mod settings;

pub use gemini::{
    ApiErrorBody, ApiErrorEnvelope, Candidate, CandidateContent, Content, GeminiClient, GeminiResult, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, ImageConfig, InlineData, InlineDataPart, Part,
    PromptFeedback, ResponsePart, SystemInstruction, TextPart,
};
pub use rate_limit::{RateLimiter, RateLimiterGuard, RetryPolicy};
pub use settings::GeminiSettings;
