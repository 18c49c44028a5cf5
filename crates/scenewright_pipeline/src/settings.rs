//! Pipeline configuration sections.

use scenewright_core::AspectRatio;
use serde::{Deserialize, Serialize};

/// Model used for each gateway operation (the `[models]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct GatewayModels {
    /// Structured screenplay generation
    script: String,
    /// Visual prompt and transition generation
    visuals: String,
    /// Keyframe, thumbnail and character image generation
    image: String,
}

impl GatewayModels {
    /// Create a model selection.
    pub fn new(
        script: impl Into<String>,
        visuals: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            script: script.into(),
            visuals: visuals.into(),
            image: image.into(),
        }
    }
}

impl Default for GatewayModels {
    fn default() -> Self {
        Self::new("gemini-2.5-pro", "gemini-2.5-flash", "gemini-2.5-flash-image")
    }
}

/// The `[pipeline]` section.
///
/// # Examples
///
/// ```
/// use scenewright_core::AspectRatio;
/// use scenewright_pipeline::PipelineSettings;
///
/// let settings: PipelineSettings = serde_json::from_str(r#"{"aspect_ratio": "9:16"}"#).unwrap();
/// assert_eq!(settings.aspect_ratio, AspectRatio::Portrait);
/// assert_eq!(settings.max_concurrent_visuals, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Initial aspect ratio for generated images
    pub aspect_ratio: AspectRatio,
    /// Cap on scenes enriched at once (None = every scene simultaneously)
    pub max_concurrent_visuals: Option<usize>,
}
