//! Generation gateway: the only component that talks to the generative backend.

use crate::extraction::parse_screenplay;
use crate::settings::GatewayModels;
use crate::templates;
use scenewright_core::{
    AspectRatio, CharacterReference, GenerateRequest, GenerateResponse, ImageData, Input, Message,
    RawScreenplay, ResponseFormat, ResponseModality, Scene, StoryIdea,
};
use scenewright_error::{
    GeminiErrorKind, GenerationError, GenerationErrorKind, ScenewrightError, ScenewrightErrorKind,
    ScenewrightResult,
};
use scenewright_interface::GenerativeDriver;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A keyframe image request.
///
/// Edit mode needs both a base image and an instruction, so an instruction
/// without an image to apply it to cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyframeRequest {
    /// Synthesize a new image from a prompt
    Create {
        /// The scene's visual prompt
        prompt: String,
        /// Character references, in registry order
        references: Arc<Vec<CharacterReference>>,
    },
    /// Modify an existing image according to an instruction
    Edit {
        /// The image to modify
        base_image: ImageData,
        /// What to change
        instruction: String,
        /// Character references, in registry order
        references: Arc<Vec<CharacterReference>>,
    },
}

impl KeyframeRequest {
    /// Choose the mode from what the caller has.
    ///
    /// Edit mode when both an existing image and a non-blank instruction are
    /// present, create mode otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenewright_core::ImageData;
    /// use scenewright_pipeline::KeyframeRequest;
    /// use std::sync::Arc;
    ///
    /// let refs = Arc::new(Vec::new());
    /// let image = ImageData::png("QQ==");
    ///
    /// let edit = KeyframeRequest::select("prompt", refs.clone(), Some(image.clone()), Some("add rain"));
    /// assert!(edit.is_edit());
    ///
    /// let create = KeyframeRequest::select("prompt", refs.clone(), None, Some("add rain"));
    /// assert!(!create.is_edit());
    ///
    /// let create = KeyframeRequest::select("prompt", refs, Some(image), None);
    /// assert!(!create.is_edit());
    /// ```
    pub fn select(
        prompt: &str,
        references: Arc<Vec<CharacterReference>>,
        existing_image: Option<ImageData>,
        edit_instruction: Option<&str>,
    ) -> Self {
        let instruction = edit_instruction
            .map(str::trim)
            .filter(|instruction| !instruction.is_empty());
        match (existing_image, instruction) {
            (Some(base_image), Some(instruction)) => KeyframeRequest::Edit {
                base_image,
                instruction: instruction.to_string(),
                references,
            },
            _ => KeyframeRequest::Create {
                prompt: prompt.to_string(),
                references,
            },
        }
    }

    /// Whether this is an edit.
    pub fn is_edit(&self) -> bool {
        matches!(self, KeyframeRequest::Edit { .. })
    }

    /// The attached character references.
    pub fn references(&self) -> &[CharacterReference] {
        match self {
            KeyframeRequest::Create { references, .. } | KeyframeRequest::Edit { references, .. } => {
                references
            }
        }
    }

    /// The text part sent with the request.
    pub fn instruction_text(&self) -> String {
        let has_references = !self.references().is_empty();
        match self {
            KeyframeRequest::Create { prompt, .. } => {
                templates::create_instruction(prompt, has_references)
            }
            KeyframeRequest::Edit { instruction, .. } => {
                templates::edit_instruction(instruction, has_references)
            }
        }
    }

    /// Request content: base image (edit mode), then references, then the text.
    pub fn inputs(&self) -> Vec<Input> {
        let mut inputs = Vec::with_capacity(self.references().len() + 2);
        if let KeyframeRequest::Edit { base_image, .. } = self {
            inputs.push(Input::Image(base_image.clone()));
        }
        inputs.extend(
            self.references()
                .iter()
                .map(|reference| Input::Image(reference.image_data().clone())),
        );
        inputs.push(Input::Text(self.instruction_text()));
        inputs
    }
}

/// Enrichment results for one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneVisuals {
    /// Text prompt for keyframe generation
    pub visual_prompt: String,
    /// Transition into the next scene ([`templates::CUT_TO`] for the final scene)
    pub transition_prompt: String,
}

/// Whether an error message carries a known quota exhaustion indicator.
///
/// # Examples
///
/// ```
/// use scenewright_pipeline::is_quota_message;
///
/// assert!(is_quota_message("429 RESOURCE_EXHAUSTED: try later"));
/// assert!(is_quota_message("You exceeded your current Quota"));
/// assert!(!is_quota_message("503 Service Unavailable"));
/// ```
pub fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["resource_exhausted", "quota", "rate limit"]
        .iter()
        .any(|indicator| lower.contains(indicator))
}

/// Issues the four generation operations and normalizes their failures.
///
/// Every failure leaving the gateway is a [`GenerationError`] (or the
/// [`ValidationError`](scenewright_error::ValidationError) that prevented a call).
#[derive(Debug, Clone)]
pub struct GenerationGateway<D> {
    driver: D,
    models: GatewayModels,
}

impl<D: GenerativeDriver> GenerationGateway<D> {
    /// Create a gateway over a driver.
    pub fn new(driver: D, models: GatewayModels) -> Self {
        Self { driver, models }
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The configured models.
    pub fn models(&self) -> &GatewayModels {
        &self.models
    }

    /// Decompose a story idea into a structured screenplay.
    ///
    /// # Errors
    ///
    /// `MalformedScreenplay` if the response does not parse, `Failed` or
    /// `QuotaExceeded` for backend failures.
    #[instrument(skip(self, idea), fields(idea_len = idea.as_str().len(), model = %self.models.script()))]
    pub async fn generate_screenplay(&self, idea: &StoryIdea) -> ScenewrightResult<RawScreenplay> {
        let request = GenerateRequest::builder()
            .messages(vec![Message::user_text(templates::script_prompt(idea))])
            .model(Some(self.models.script().clone()))
            .response_format(ResponseFormat::Json {
                schema: templates::screenplay_schema(),
            })
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::Failed(e.to_string())))?;

        let response = self.call(&request).await?;
        let text = response.text();
        debug!(response_len = text.len(), "Received screenplay response");

        let raw = parse_screenplay(&text)?;
        debug!(scenes = raw.scenes.len(), title = %raw.title, "Parsed screenplay");
        Ok(raw)
    }

    /// Derive a scene's visual prompt and its transition into `next`.
    ///
    /// Both requests are issued together when `next` is present; for the final
    /// scene no transition request is made and the transition is
    /// [`templates::CUT_TO`].
    #[instrument(skip(self, scene, next), fields(scene_number = *scene.scene_number(), has_next = next.is_some()))]
    pub async fn generate_scene_visuals(
        &self,
        scene: &Scene,
        next: Option<&Scene>,
    ) -> ScenewrightResult<SceneVisuals> {
        let visual = self.text_request(templates::visual_prompt(scene))?;
        let transition = next
            .map(|next| self.text_request(templates::transition_prompt(scene, next)))
            .transpose()?;

        let (visual_response, transition_response) = match &transition {
            Some(transition) => {
                let (visual, transition) =
                    futures::future::join(self.call(&visual), self.call(transition)).await;
                (visual?, Some(transition?))
            }
            None => (self.call(&visual).await?, None),
        };

        let transition_prompt = transition_response
            .map(|response| response.text().trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| templates::CUT_TO.to_string());

        Ok(SceneVisuals {
            visual_prompt: visual_response.text().trim().to_string(),
            transition_prompt,
        })
    }

    /// Generate or edit a keyframe.
    ///
    /// # Errors
    ///
    /// `NoImageReturned` when the response carries no image. It is not retried.
    #[instrument(skip_all, fields(edit = request.is_edit(), references = request.references().len(), aspect_ratio = %aspect_ratio))]
    pub async fn generate_keyframe_image(
        &self,
        request: &KeyframeRequest,
        aspect_ratio: AspectRatio,
    ) -> ScenewrightResult<ImageData> {
        self.image_request(request.inputs(), aspect_ratio).await
    }

    /// Generate a character portrait from a text prompt alone.
    #[instrument(skip_all, fields(prompt_len = prompt.len(), aspect_ratio = %aspect_ratio))]
    pub async fn generate_character_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> ScenewrightResult<ImageData> {
        self.image_request(vec![Input::Text(prompt.to_string())], aspect_ratio)
            .await
    }

    /// Generate the title card. Same contract as character images.
    #[instrument(skip_all, fields(prompt_len = prompt.len(), aspect_ratio = %aspect_ratio))]
    pub async fn generate_thumbnail_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> ScenewrightResult<ImageData> {
        self.image_request(vec![Input::Text(prompt.to_string())], aspect_ratio)
            .await
    }

    fn text_request(&self, prompt: String) -> ScenewrightResult<GenerateRequest> {
        GenerateRequest::builder()
            .messages(vec![Message::user_text(prompt)])
            .model(Some(self.models.visuals().clone()))
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::Failed(e.to_string())).into())
    }

    async fn image_request(
        &self,
        inputs: Vec<Input>,
        aspect_ratio: AspectRatio,
    ) -> ScenewrightResult<ImageData> {
        let request = GenerateRequest::builder()
            .messages(vec![Message::user(inputs)])
            .model(Some(self.models.image().clone()))
            .response_modalities(vec![ResponseModality::Image])
            .aspect_ratio(Some(aspect_ratio))
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::Failed(e.to_string())))?;

        let response = self.call(&request).await?;
        match response.first_image() {
            Some(image) => {
                debug!(encoded_len = image.encoded_len(), "Received image");
                Ok(image.clone())
            }
            None => {
                warn!(outputs = response.outputs.len(), "No image data in response");
                Err(GenerationError::new(GenerationErrorKind::NoImageReturned).into())
            }
        }
    }

    async fn call(&self, request: &GenerateRequest) -> ScenewrightResult<GenerateResponse> {
        self.driver.generate(request).await.map_err(normalize)
    }
}

/// Map any driver failure onto the generation taxonomy.
fn normalize(err: ScenewrightError) -> ScenewrightError {
    let kind = match err.kind() {
        ScenewrightErrorKind::Generation(_) | ScenewrightErrorKind::Validation(_) => return err,
        ScenewrightErrorKind::Gemini(gemini) => match &gemini.kind {
            GeminiErrorKind::HttpError {
                status_code: 429,
                message,
            } => GenerationErrorKind::QuotaExceeded(message.clone()),
            other => classify(other.to_string()),
        },
        other => classify(other.to_string()),
    };
    warn!(error = %kind, "Generation request failed");
    GenerationError::new(kind).into()
}

fn classify(message: String) -> GenerationErrorKind {
    if is_quota_message(&message) {
        GenerationErrorKind::QuotaExceeded(message)
    } else {
        GenerationErrorKind::Failed(message)
    }
}
