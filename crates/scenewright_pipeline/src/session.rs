//! Session state and the read-only snapshot handed to callers.

use crate::CharacterRegistry;
use scenewright_core::{AspectRatio, CharacterReference, ImageData, Scene, SceneId, Screenplay};
use scenewright_error::ScenewrightError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Top-level pipeline state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Stage {
    /// No generation running; screenplay empty or ready for a new idea
    #[default]
    Idle,
    /// Waiting on the structured script
    ScriptGenerating,
    /// Waiting on the per-scene enrichment batch
    VisualsGenerating,
    /// Screenplay complete; keyframes may be requested
    Ready,
}

/// In-flight flags per operation scope.
///
/// Per-scene keyframe flags live on [`Scene::is_generating_image`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    /// Script generation in flight
    pub script: bool,
    /// Visuals batch in flight
    pub visuals: bool,
    /// Thumbnail generation in flight
    pub thumbnail: bool,
    /// Character image generation in flight
    pub character: bool,
}

/// Which operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum ErrorScope {
    /// Rejected input
    #[display("input")]
    Validation,
    /// Script or visuals stage
    #[display("screenplay")]
    Script,
    /// A single scene's keyframe
    #[display("keyframe for scene {}", scene_number)]
    Keyframe {
        /// The failing scene
        scene_number: u32,
    },
    /// The title card
    #[display("thumbnail")]
    Thumbnail,
    /// A generated character reference
    #[display("character image")]
    CharacterImage,
}

/// The single user-facing error slot. The latest error wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{}", message)]
pub struct ErrorReport {
    /// The failing operation
    pub scope: ErrorScope,
    /// User-facing message
    pub message: String,
}

impl ErrorReport {
    /// Build the user-facing report for a failure in `scope`.
    ///
    /// Quota exhaustion gets its own message pointing at rate limits; malformed
    /// screenplays read the same as any other script failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenewright_error::{GenerationError, GenerationErrorKind, ScenewrightError};
    /// use scenewright_pipeline::{ErrorReport, ErrorScope};
    ///
    /// let err: ScenewrightError = GenerationError::new(GenerationErrorKind::NoImageReturned).into();
    /// let report = ErrorReport::new(ErrorScope::Keyframe { scene_number: 3 }, &err);
    /// assert_eq!(report.message, "Failed to generate keyframe for scene 3. Please try again.");
    /// ```
    pub fn new(scope: ErrorScope, err: &ScenewrightError) -> Self {
        let quota = err
            .as_generation()
            .is_some_and(|generation| generation.kind.is_quota_exceeded());

        let message = match scope {
            ErrorScope::Validation => err
                .as_validation()
                .map(|validation| validation.kind.to_string())
                .unwrap_or_else(|| err.to_string()),
            _ if quota => format!(
                "API quota exceeded while generating the {}. Please wait a moment or check your plan's rate limits, then try again.",
                scope
            ),
            ErrorScope::Script => {
                "Failed to generate screenplay. Please check your API key and try again.".to_string()
            }
            _ => format!("Failed to generate {}. Please try again.", scope),
        };

        Self { scope, message }
    }
}

/// Owned, read-only view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Top-level stage
    pub stage: Stage,
    /// Current screenplay, if any
    pub screenplay: Option<Screenplay>,
    /// Title card image
    pub thumbnail: Option<ImageData>,
    /// Character references, in registry order
    pub character_references: Arc<Vec<CharacterReference>>,
    /// Aspect ratio applied to the next image generation
    pub aspect_ratio: AspectRatio,
    /// Latest error
    pub error: Option<ErrorReport>,
    /// Per-scope in-flight flags
    pub loading: LoadingFlags,
}

impl SessionSnapshot {
    /// Look up a scene.
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.screenplay.as_ref()?.scene(id)
    }

    /// Whether the scene's current keyframe is a registered character reference.
    ///
    /// Computed from the snapshot on every call, never stored.
    pub fn is_locked(&self, id: SceneId) -> bool {
        self.scene(id)
            .and_then(|scene| scene.keyframe_image().as_ref())
            .is_some_and(|image| {
                self.character_references
                    .iter()
                    .any(|reference| reference.image_data() == image)
            })
    }

    /// Whether any scene has a keyframe.
    pub fn has_keyframes(&self) -> bool {
        self.screenplay
            .as_ref()
            .is_some_and(|screenplay| screenplay.keyframes().next().is_some())
    }

    /// Whether any operation is in flight.
    pub fn is_busy(&self) -> bool {
        let LoadingFlags {
            script,
            visuals,
            thumbnail,
            character,
        } = self.loading;
        script
            || visuals
            || thumbnail
            || character
            || self.screenplay.as_ref().is_some_and(|screenplay| {
                screenplay
                    .scenes()
                    .iter()
                    .any(|scene| *scene.is_generating_image())
            })
    }
}

/// Mutable session state behind the pipeline's lock.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    /// Bumped by every accepted idea; results from older stories are discarded
    pub(crate) epoch: u64,
    pub(crate) stage: Stage,
    pub(crate) screenplay: Option<Screenplay>,
    pub(crate) thumbnail: Option<ImageData>,
    pub(crate) registry: CharacterRegistry,
    pub(crate) aspect_ratio: AspectRatio,
    pub(crate) error: Option<ErrorReport>,
    pub(crate) loading: LoadingFlags,
    /// Thumbnail requests outstanding for the current story
    pub(crate) thumbnails_in_flight: usize,
}

impl SessionState {
    pub(crate) fn new(aspect_ratio: AspectRatio) -> Self {
        Self {
            aspect_ratio,
            ..Self::default()
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stage: self.stage,
            screenplay: self.screenplay.clone(),
            thumbnail: self.thumbnail.clone(),
            character_references: self.registry.snapshot(),
            aspect_ratio: self.aspect_ratio,
            error: self.error.clone(),
            loading: self.loading,
        }
    }

    /// Start a new story, discarding everything from the previous one.
    pub(crate) fn reset_for_new_story(&mut self) -> u64 {
        self.epoch += 1;
        self.stage = Stage::ScriptGenerating;
        self.screenplay = None;
        self.thumbnail = None;
        self.registry.clear();
        self.error = None;
        self.loading = LoadingFlags {
            script: true,
            ..LoadingFlags::default()
        };
        self.thumbnails_in_flight = 0;
        self.epoch
    }

    pub(crate) fn begin_thumbnail(&mut self) {
        self.thumbnails_in_flight += 1;
        self.loading.thumbnail = true;
    }

    /// The thumbnail flag stays up while another request for this story is outstanding.
    pub(crate) fn finish_thumbnail(&mut self) {
        self.thumbnails_in_flight = self.thumbnails_in_flight.saturating_sub(1);
        self.loading.thumbnail = self.thumbnails_in_flight > 0 && self.screenplay.is_some();
    }

    /// Abort the script or visuals stage.
    pub(crate) fn abort_story(&mut self, report: ErrorReport) {
        self.stage = Stage::Idle;
        self.screenplay = None;
        self.thumbnail = None;
        self.loading.script = false;
        self.loading.visuals = false;
        self.loading.thumbnail = false;
        self.error = Some(report);
    }
}
