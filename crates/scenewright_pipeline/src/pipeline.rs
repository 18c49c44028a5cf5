//! Pipeline orchestrator.

use crate::gateway::{GenerationGateway, KeyframeRequest, SceneVisuals};
use crate::session::{ErrorReport, ErrorScope, SessionSnapshot, SessionState, Stage};
use crate::settings::PipelineSettings;
use futures::StreamExt;
use scenewright_core::{AspectRatio, ImageData, SceneId, Screenplay, StoryIdea};
use scenewright_error::{ScenewrightResult, ValidationError, ValidationErrorKind};
use scenewright_interface::GenerativeDriver;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

struct Inner<D> {
    gateway: GenerationGateway<D>,
    settings: PipelineSettings,
    state: RwLock<SessionState>,
    thumbnail_task: Mutex<Option<JoinHandle<()>>>,
}

/// Drives a story from idea to illustrated screenplay.
///
/// The pipeline is a cheap handle: clones share one session. Session state is
/// only locked between generation calls, never across one, so every operation
/// may run concurrently with the others. Results of operations started for a
/// previous story are discarded once a new idea has been submitted.
///
/// Issuing two keyframe requests for the same scene at once is caller misuse;
/// the last one to finish wins.
pub struct Pipeline<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for Pipeline<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> std::fmt::Debug for Pipeline<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl<D: GenerativeDriver + 'static> Pipeline<D> {
    /// Create a pipeline with an empty session.
    pub fn new(gateway: GenerationGateway<D>, settings: PipelineSettings) -> Self {
        let state = SessionState::new(settings.aspect_ratio);
        Self {
            inner: Arc::new(Inner {
                gateway,
                settings,
                state: RwLock::new(state),
                thumbnail_task: Mutex::new(None),
            }),
        }
    }

    /// The gateway this pipeline drives.
    pub fn gateway(&self) -> &GenerationGateway<D> {
        &self.inner.gateway
    }

    /// Owned copy of the current session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.read().await.snapshot()
    }

    /// Generate a screenplay for an idea and enrich every scene.
    ///
    /// A blank idea is rejected before anything else changes. An accepted idea
    /// discards the previous screenplay, thumbnail and character references.
    /// Resolves once the visuals stage has resolved; the thumbnail is generated
    /// in the background (see [`wait_for_thumbnail`](Self::wait_for_thumbnail)).
    ///
    /// # Errors
    ///
    /// The validation error for a blank idea, or the generation error that
    /// aborted the script or visuals stage. Either is also recorded in the
    /// session's error slot.
    #[instrument(skip(self, text), fields(idea_len = text.len()))]
    pub async fn submit_idea(&self, text: &str) -> ScenewrightResult<()> {
        let idea = match StoryIdea::parse(text) {
            Ok(idea) => idea,
            Err(err) => {
                let err = err.into();
                self.inner.state.write().await.error =
                    Some(ErrorReport::new(ErrorScope::Validation, &err));
                return Err(err);
            }
        };

        let epoch = self.inner.state.write().await.reset_for_new_story();
        info!(epoch, "Generating screenplay");

        let screenplay = match self.inner.gateway.generate_screenplay(&idea).await {
            Ok(raw) => {
                if !raw.is_contiguous() {
                    warn!(
                        scenes = raw.scenes.len(),
                        "Scene numbers were not contiguous from 1; renumbering by position"
                    );
                }
                Screenplay::from_raw(raw).map_err(Into::into)
            }
            Err(err) => Err(err),
        };

        let screenplay = match screenplay {
            Ok(screenplay) => screenplay,
            Err(err) => {
                let mut state = self.inner.state.write().await;
                if state.epoch == epoch {
                    error!(error = %err, "Script generation failed");
                    state.abort_story(ErrorReport::new(ErrorScope::Script, &err));
                }
                return Err(err);
            }
        };

        let aspect_ratio = {
            let mut state = self.inner.state.write().await;
            if state.epoch != epoch {
                debug!(epoch, "Discarding screenplay for superseded story");
                return Ok(());
            }
            state.screenplay = Some(screenplay.clone());
            state.stage = Stage::VisualsGenerating;
            state.loading.script = false;
            state.loading.visuals = true;
            state.begin_thumbnail();
            state.aspect_ratio
        };
        info!(
            scenes = screenplay.scenes().len(),
            title = %screenplay.title(),
            "Screenplay generated, enriching scenes"
        );

        self.spawn_thumbnail(epoch, screenplay.thumbnail_prompt().clone(), aspect_ratio)
            .await;

        let results = self.enrich(&screenplay).await;

        let mut state = self.inner.state.write().await;
        if state.epoch != epoch {
            debug!(epoch, "Discarding visuals for superseded story");
            return Ok(());
        }

        let visuals = match results.into_iter().collect::<ScenewrightResult<Vec<_>>>() {
            Ok(visuals) => visuals,
            Err(err) => {
                error!(error = %err, "Visuals generation failed");
                state.abort_story(ErrorReport::new(ErrorScope::Script, &err));
                return Err(err);
            }
        };

        if let Some(current) = state.screenplay.as_mut() {
            for (scene, SceneVisuals { visual_prompt, transition_prompt }) in
                current.scenes_mut().iter_mut().zip(visuals)
            {
                scene.set_visuals(visual_prompt, Some(transition_prompt));
            }
        }
        state.stage = Stage::Ready;
        state.loading.visuals = false;
        info!("Screenplay ready");
        Ok(())
    }

    /// Enrich every scene, all at once unless a concurrency cap is configured.
    ///
    /// Results come back in scene order regardless of completion order.
    async fn enrich(&self, screenplay: &Screenplay) -> Vec<ScenewrightResult<SceneVisuals>> {
        let gateway = &self.inner.gateway;
        let requests = screenplay
            .scene_pairs()
            .map(|(scene, next)| gateway.generate_scene_visuals(scene, next))
            .collect::<Vec<_>>();

        match self.inner.settings.max_concurrent_visuals {
            Some(limit) if limit > 0 => {
                futures::stream::iter(requests)
                    .buffered(limit)
                    .collect()
                    .await
            }
            _ => futures::future::join_all(requests).await,
        }
    }

    async fn spawn_thumbnail(&self, epoch: u64, prompt: String, aspect_ratio: AspectRatio) {
        let pipeline = self.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = pipeline.run_thumbnail(epoch, &prompt, aspect_ratio).await {
                debug!(error = %err, "Background thumbnail generation failed");
            }
        });
        *self.inner.thumbnail_task.lock().await = Some(handle);
    }

    async fn run_thumbnail(
        &self,
        epoch: u64,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> ScenewrightResult<Option<ImageData>> {
        let result = self
            .inner
            .gateway
            .generate_thumbnail_image(prompt, aspect_ratio)
            .await;

        let mut state = self.inner.state.write().await;
        if state.epoch != epoch {
            debug!(epoch, "Discarding thumbnail for superseded story");
            return Ok(None);
        }
        state.finish_thumbnail();
        if state.screenplay.is_none() {
            debug!(epoch, succeeded = result.is_ok(), "Discarding thumbnail for aborted story");
            return Ok(None);
        }

        match result {
            Ok(image) => {
                state.thumbnail = Some(image.clone());
                Ok(Some(image))
            }
            Err(err) => {
                warn!(error = %err, "Thumbnail generation failed");
                state.error = Some(ErrorReport::new(ErrorScope::Thumbnail, &err));
                Err(err)
            }
        }
    }

    /// Wait for the background thumbnail started by [`submit_idea`](Self::submit_idea).
    pub async fn wait_for_thumbnail(&self) {
        let handle = self.inner.thumbnail_task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "Thumbnail task did not complete");
            }
        }
    }

    /// Regenerate the thumbnail from the screenplay's thumbnail prompt.
    ///
    /// Returns `None` when there is no screenplay or the story changed meanwhile.
    ///
    /// # Errors
    ///
    /// The generation failure, also recorded in the error slot.
    #[instrument(skip(self))]
    pub async fn request_thumbnail(&self) -> ScenewrightResult<Option<ImageData>> {
        let (epoch, prompt, aspect_ratio) = {
            let mut state = self.inner.state.write().await;
            let Some(prompt) = state
                .screenplay
                .as_ref()
                .map(|screenplay| screenplay.thumbnail_prompt().clone())
            else {
                debug!("No screenplay, nothing to illustrate");
                return Ok(None);
            };
            state.begin_thumbnail();
            (state.epoch, prompt, state.aspect_ratio)
        };

        self.run_thumbnail(epoch, &prompt, aspect_ratio).await
    }

    /// Generate or edit a scene's keyframe.
    ///
    /// Edit mode when the scene already has a keyframe and a non-blank
    /// instruction is given; create mode otherwise. The current character
    /// references are attached either way. Returns `None` without issuing a
    /// request when the scene is unknown or has no visual prompt yet.
    ///
    /// # Errors
    ///
    /// The generation failure. The scene keeps its previous keyframe, its
    /// in-flight flag is cleared and a scoped error is recorded.
    #[instrument(skip(self, edit_instruction), fields(scene = %scene_id, edit = edit_instruction.is_some()))]
    pub async fn request_keyframe(
        &self,
        scene_id: SceneId,
        edit_instruction: Option<&str>,
    ) -> ScenewrightResult<Option<ImageData>> {
        let (epoch, request, aspect_ratio) = {
            let mut guard = self.inner.state.write().await;
            let state = &mut *guard;
            let Some(scene) = state
                .screenplay
                .as_mut()
                .and_then(|screenplay| screenplay.scene_mut(scene_id))
            else {
                debug!("Unknown scene");
                return Ok(None);
            };
            let Some(prompt) = scene
                .visual_prompt()
                .clone()
                .filter(|_| scene.has_visual_prompt())
            else {
                debug!("Scene has no visual prompt yet");
                return Ok(None);
            };

            let request = KeyframeRequest::select(
                &prompt,
                state.registry.snapshot(),
                scene.keyframe_image().clone(),
                edit_instruction,
            );
            scene.begin_image();
            (state.epoch, request, state.aspect_ratio)
        };

        let result = self
            .inner
            .gateway
            .generate_keyframe_image(&request, aspect_ratio)
            .await;

        let mut state = self.inner.state.write().await;
        if state.epoch != epoch {
            debug!(epoch, "Discarding keyframe for superseded story");
            return Ok(None);
        }
        let Some(scene) = state
            .screenplay
            .as_mut()
            .and_then(|screenplay| screenplay.scene_mut(scene_id))
        else {
            return Ok(None);
        };

        match result {
            Ok(image) => {
                scene.finish_image(image.clone());
                info!("Keyframe generated");
                Ok(Some(image))
            }
            Err(err) => {
                scene.fail_image();
                let scene_number = *scene.scene_number();
                warn!(error = %err, "Keyframe generation failed");
                state.error = Some(ErrorReport::new(
                    ErrorScope::Keyframe { scene_number },
                    &err,
                ));
                Err(err)
            }
        }
    }

    /// Generate a character portrait and add it to the references.
    ///
    /// Returns `None` if a new story was submitted while it was generating.
    ///
    /// # Errors
    ///
    /// `BlankCharacterPrompt` for an empty prompt, or the generation failure.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn request_character_image(
        &self,
        prompt: &str,
    ) -> ScenewrightResult<Option<ImageData>> {
        let prompt = prompt.trim();
        let (epoch, aspect_ratio) = {
            let mut state = self.inner.state.write().await;
            if prompt.is_empty() {
                let err = ValidationError::new(ValidationErrorKind::BlankCharacterPrompt).into();
                state.error = Some(ErrorReport::new(ErrorScope::Validation, &err));
                return Err(err);
            }
            state.loading.character = true;
            (state.epoch, state.aspect_ratio)
        };

        let result = self
            .inner
            .gateway
            .generate_character_image(prompt, aspect_ratio)
            .await;

        let mut state = self.inner.state.write().await;
        if state.epoch != epoch {
            debug!(epoch, "Discarding character image for superseded story");
            return Ok(None);
        }
        state.loading.character = false;

        match result {
            Ok(image) => {
                let added = state.registry.add(image.clone());
                info!(added, references = state.registry.len(), "Character image generated");
                Ok(Some(image))
            }
            Err(err) => {
                warn!(error = %err, "Character image generation failed");
                state.error = Some(ErrorReport::new(ErrorScope::CharacterImage, &err));
                Err(err)
            }
        }
    }

    /// Add an uploaded image to the character references.
    ///
    /// Returns whether it was new.
    #[instrument(skip_all, fields(encoded_len = image.encoded_len()))]
    pub async fn add_character_reference(&self, image: ImageData) -> bool {
        let mut state = self.inner.state.write().await;
        let added = state.registry.add(image);
        debug!(added, references = state.registry.len(), "Added character reference");
        added
    }

    /// Promote an existing image into the character references.
    #[instrument(skip_all, fields(encoded_len = image.encoded_len()))]
    pub async fn lock_character_reference(&self, image: ImageData) -> bool {
        let mut state = self.inner.state.write().await;
        let added = state.registry.lock(image);
        debug!(added, references = state.registry.len(), "Locked character reference");
        added
    }

    /// Lock a scene's current keyframe. Returns false if it has none or it is already locked.
    #[instrument(skip(self), fields(scene = %scene_id))]
    pub async fn lock_scene_keyframe(&self, scene_id: SceneId) -> bool {
        let mut guard = self.inner.state.write().await;
        let state = &mut *guard;
        let Some(image) = state
            .screenplay
            .as_ref()
            .and_then(|screenplay| screenplay.scene(scene_id))
            .and_then(|scene| scene.keyframe_image().clone())
        else {
            return false;
        };
        state.registry.lock(image)
    }

    /// Remove the reference at `index`. Out-of-range indices are a no-op returning false.
    #[instrument(skip(self))]
    pub async fn remove_character_reference(&self, index: usize) -> bool {
        let mut state = self.inner.state.write().await;
        state.registry.remove(index).is_some()
    }

    /// Change the aspect ratio for subsequent image generations.
    #[instrument(skip(self))]
    pub async fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        self.inner.state.write().await.aspect_ratio = aspect_ratio;
        info!(%aspect_ratio, "Aspect ratio changed");
    }
}
