//! Google Gemini REST client.
//!
//! Supports per-request model selection: the request's `model` wins, otherwise
//! the client's default model is used. All calls share one rate limiter.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use scenewright_core::{
    GenerateRequest, GenerateResponse, ImageData, Input, Output, ResponseFormat, Role,
};
use scenewright_error::{GeminiError, GeminiErrorKind, ScenewrightResult};
use scenewright_interface::GenerativeDriver;

use super::GeminiResult;
use super::protocol::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ImageConfig, Part, SystemInstruction,
};
use crate::{GeminiSettings, RateLimiter, RetryPolicy};

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model_name: String,
    limiter: RateLimiter,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiClient {
    /// Create a client, reading the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` if the variable is unset or empty.
    #[instrument(skip(settings), fields(api_key_env = %settings.api_key_env()))]
    pub fn from_settings(
        settings: &GeminiSettings,
        default_model: impl Into<String> + std::fmt::Debug,
    ) -> GeminiResult<Self> {
        let api_key = std::env::var(settings.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GeminiError::new(GeminiErrorKind::MissingApiKey(
                    settings.api_key_env().to_string(),
                ))
            })?;
        Self::with_api_key(api_key, settings, default_model)
    }

    /// Create a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `ClientCreation` if the HTTP client cannot be built.
    #[instrument(skip(api_key, settings))]
    pub fn with_api_key(
        api_key: impl Into<String>,
        settings: &GeminiSettings,
        default_model: impl Into<String> + std::fmt::Debug,
    ) -> GeminiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(*settings.timeout_secs()))
            .build()
            .map_err(|e| GeminiError::new(GeminiErrorKind::ClientCreation(e.to_string())))?;

        let limiter = RateLimiter::new(
            *settings.rpm(),
            *settings.max_concurrent(),
            RetryPolicy {
                no_retry: settings.no_retry(),
                max_retries: *settings.max_retries(),
                backoff_ms: *settings.retry_backoff_ms(),
            },
        );

        let model_name = default_model.into();
        debug!(model = %model_name, base_url = %settings.base_url(), "Created Gemini client");

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: settings.base_url().trim_end_matches('/').to_string(),
            model_name,
            limiter,
        })
    }

    /// Endpoint URL for a model.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Convert a provider-neutral request into a `generateContent` body.
    pub fn build_request(req: &GenerateRequest) -> GenerateContentRequest {
        let mut system_parts: Vec<Part> = req
            .system_prompt()
            .iter()
            .map(|prompt| Part::text(prompt.as_str()))
            .collect();
        let mut contents = Vec::new();

        for msg in req.messages() {
            let parts: Vec<Part> = msg.content.iter().map(Self::convert_input).collect();
            match msg.role {
                // Gemini uses a separate system instruction
                Role::System => system_parts.extend(parts),
                Role::User => contents.push(Content {
                    role: "user".to_string(),
                    parts,
                }),
                Role::Assistant => contents.push(Content {
                    role: "model".to_string(),
                    parts,
                }),
            }
        }

        let mut config = GenerationConfig {
            max_output_tokens: *req.max_tokens(),
            temperature: *req.temperature(),
            ..GenerationConfig::default()
        };

        if let ResponseFormat::Json { schema } = req.response_format() {
            config.response_mime_type = Some("application/json".to_string());
            config.response_schema = Some(schema.clone());
        }

        if !req.response_modalities().is_empty() {
            config.response_modalities = Some(
                req.response_modalities()
                    .iter()
                    .map(|modality| modality.to_string())
                    .collect(),
            );
        }

        if req.wants_image() {
            config.image_config = req.aspect_ratio().map(|ratio| ImageConfig {
                aspect_ratio: ratio.to_string(),
            });
        }

        let has_config = config.max_output_tokens.is_some()
            || config.temperature.is_some()
            || config.response_mime_type.is_some()
            || config.response_modalities.is_some();

        GenerateContentRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| SystemInstruction {
                parts: system_parts,
            }),
            generation_config: has_config.then_some(config),
        }
    }

    fn convert_input(input: &Input) -> Part {
        match input {
            Input::Text(text) => Part::text(text.as_str()),
            Input::Image(image) => Part::inline(image.mime().as_str(), image.data().to_string()),
        }
    }

    /// Convert a `generateContent` response into provider-neutral outputs.
    ///
    /// Parts are kept in order; reasoning parts are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Blocked` when the prompt was rejected and no candidate came back.
    pub fn convert_response(response: GenerateContentResponse) -> GeminiResult<GenerateResponse> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            if let Some(reason) = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
            {
                return Err(GeminiError::new(GeminiErrorKind::Blocked(reason)));
            }
            return Ok(GenerateResponse::default());
        };

        let outputs = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| match (part.inline_data, part.text) {
                (Some(data), _) => Some(Output::Image(ImageData::new(data.mime_type, data.data))),
                (None, Some(text)) => Some(Output::Text(text)),
                (None, None) => None,
            })
            .collect();

        Ok(GenerateResponse { outputs })
    }

    /// Build an error from a non-2xx status and its body.
    ///
    /// The message is `"{STATUS}: {message}"` when the body is a Gemini error
    /// envelope, otherwise the raw body.
    pub fn parse_error(status_code: u16, body: &str) -> GeminiError {
        let message = match serde_json::from_str::<ApiErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(status) => format!("{}: {}", status, envelope.error.message),
                None => envelope.error.message,
            },
            Err(_) => body.trim().to_string(),
        };
        GeminiError::new(GeminiErrorKind::HttpError {
            status_code,
            message,
        })
    }

    fn transport_error(err: reqwest::Error) -> GeminiError {
        if err.is_timeout() || err.is_connect() {
            GeminiError::new(GeminiErrorKind::Transport(err.to_string()))
        } else {
            GeminiError::new(GeminiErrorKind::ApiRequest(err.to_string()))
        }
    }

    /// One round trip, without rate limiting or retry.
    async fn send(
        &self,
        url: &str,
        body: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = Self::parse_error(status.as_u16(), &error_text);
            warn!(status = %status, error = %err.kind, "Gemini API error");
            return Err(err);
        }

        let text = response.text().await.map_err(Self::transport_error)?;
        debug!(response_len = text.len(), "Received response");

        serde_json::from_str(&text)
            .map_err(|e| GeminiError::new(GeminiErrorKind::InvalidResponse(e.to_string())))
    }

    /// Internal generate method that returns Gemini-specific errors.
    async fn generate_internal(&self, req: &GenerateRequest) -> GeminiResult<GenerateResponse> {
        let model = req.model().as_deref().unwrap_or(&self.model_name);
        let url = self.endpoint(model);
        let body = Self::build_request(req);

        debug!(
            model,
            turns = body.contents.len(),
            json = req.wants_json(),
            image = req.wants_image(),
            "Sending generateContent request"
        );

        let response = self.limiter.execute(|| self.send(&url, &body)).await?;
        Self::convert_response(response)
    }
}

#[async_trait]
impl GenerativeDriver for GeminiClient {
    #[instrument(skip(self, req), fields(provider = "gemini", default_model = %self.model_name))]
    async fn generate(&self, req: &GenerateRequest) -> ScenewrightResult<GenerateResponse> {
        self.generate_internal(req).await.map_err(Into::into)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    /// Returns the default model name used when `GenerateRequest.model` is None.
    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerateContentResponse, ResponsePart};
    use scenewright_core::{AspectRatio, Message, ResponseModality};

    #[test]
    fn test_image_request_carries_parts_and_image_config() {
        let req = GenerateRequest::builder()
            .messages(vec![Message::user(vec![
                Input::Image(ImageData::png("UkVG")),
                Input::Text("Draw the keeper".to_string()),
            ])])
            .response_modalities(vec![ResponseModality::Image])
            .aspect_ratio(Some(AspectRatio::Square))
            .build()
            .unwrap();

        let body = serde_json::to_value(GeminiClient::build_request(&req)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "UkVG");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "Draw the keeper");
        assert_eq!(
            body["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE"])
        );
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "1:1");
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_json_request_sets_schema() {
        let schema = serde_json::json!({"type": "OBJECT"});
        let req = GenerateRequest::builder()
            .messages(vec![Message::user_text("Write a script")])
            .system_prompt(Some("You are a screenwriter.".to_string()))
            .response_format(ResponseFormat::Json {
                schema: schema.clone(),
            })
            .build()
            .unwrap();

        let body = GeminiClient::build_request(&req);
        let config = body.generation_config.unwrap();
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(config.response_schema, Some(schema));
        assert!(config.image_config.is_none());
        assert!(body.system_instruction.is_some());
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let req = GenerateRequest::builder()
            .messages(vec![Message::user_text("Hello")])
            .build()
            .unwrap();
        assert!(GeminiClient::build_request(&req).generation_config.is_none());
    }

    #[test]
    fn test_response_parts_convert_in_order() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking", "thought": true},
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": "QUJD"}},
                    {"thoughtSignature": "xyz"}
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let converted = GeminiClient::convert_response(response).unwrap();
        assert_eq!(converted.outputs.len(), 2);
        assert_eq!(converted.text(), "Here you go");
        assert_eq!(converted.first_image(), Some(&ImageData::png("QUJD")));
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let response = GenerateContentResponse {
            candidates: vec![],
            prompt_feedback: Some(crate::PromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
        };
        let err = GeminiClient::convert_response(response).unwrap_err();
        assert_eq!(err.kind, GeminiErrorKind::Blocked("SAFETY".to_string()));
    }

    #[test]
    fn test_empty_candidate_yields_no_outputs() {
        let response = GenerateContentResponse {
            candidates: vec![crate::Candidate {
                content: Some(crate::CandidateContent {
                    parts: vec![ResponsePart::default()],
                }),
                finish_reason: None,
            }],
            prompt_feedback: None,
        };
        let converted = GeminiClient::convert_response(response).unwrap();
        assert!(converted.outputs.is_empty());
    }

    #[test]
    fn test_error_envelope_is_parsed() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded for metric", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = GeminiClient::parse_error(429, body);
        match err.kind {
            GeminiErrorKind::HttpError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded for metric");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_error_body_is_kept() {
        let err = GeminiClient::parse_error(502, "Bad Gateway\n");
        assert_eq!(
            err.kind,
            GeminiErrorKind::HttpError {
                status_code: 502,
                message: "Bad Gateway".to_string(),
            }
        );
    }

    #[test]
    fn test_endpoint_uses_request_model() {
        let settings = GeminiSettings::default().with_base_url("http://localhost:9999/");
        let client = GeminiClient::with_api_key("key", &settings, "gemini-2.5-flash").unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-flash-image"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-2.5-flash");
    }
}
