//! Connection settings for the Gemini provider.

use serde::{Deserialize, Serialize};

/// The `[gemini]` configuration section.
///
/// # Examples
///
/// ```
/// use scenewright_models::GeminiSettings;
///
/// let settings = GeminiSettings::default();
/// assert_eq!(settings.api_key_env(), "GEMINI_API_KEY");
/// assert!(!settings.no_retry());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct GeminiSettings {
    /// API root, without the version segment
    base_url: String,
    /// Environment variable holding the API key
    api_key_env: String,
    /// Requests per minute (None = unlimited)
    rpm: Option<u32>,
    /// Maximum requests in flight (None = unlimited)
    max_concurrent: Option<u32>,
    /// Per-request transport timeout
    timeout_secs: u64,
    /// Disable automatic retry of transient failures
    #[getter(skip)]
    no_retry: bool,
    /// Override the per-error retry count
    max_retries: Option<usize>,
    /// Override the per-error initial backoff
    retry_backoff_ms: Option<u64>,
}

impl GeminiSettings {
    /// Whether retries are disabled.
    pub fn no_retry(&self) -> bool {
        self.no_retry
    }

    /// Copy with a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Copy with retries disabled or enabled.
    pub fn with_no_retry(mut self, no_retry: bool) -> Self {
        self.no_retry = no_retry;
        self
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            rpm: Some(60),
            max_concurrent: Some(8),
            timeout_secs: 180,
            no_retry: false,
            max_retries: None,
            retry_backoff_ms: None,
        }
    }
}
