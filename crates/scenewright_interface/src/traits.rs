//! Trait definitions for generative backends.

use async_trait::async_trait;
use scenewright_core::{GenerateRequest, GenerateResponse};
use scenewright_error::ScenewrightResult;
use std::sync::Arc;

/// Core trait that every generative backend implements.
///
/// A single request/response round trip: text requests may ask for free text or
/// schema-constrained JSON, image requests carry a text instruction plus zero or
/// more reference images and answer with an image.
#[async_trait]
pub trait GenerativeDriver: Send + Sync {
    /// Generate model output given a multimodal request.
    async fn generate(&self, req: &GenerateRequest) -> ScenewrightResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier, used when a request names none.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<D> GenerativeDriver for Arc<D>
where
    D: GenerativeDriver + ?Sized,
{
    async fn generate(&self, req: &GenerateRequest) -> ScenewrightResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
