//! Screenplay data model.

use crate::ImageData;
use scenewright_error::{
    GenerationError, GenerationErrorKind, ValidationError, ValidationErrorKind,
};
use serde::{Deserialize, Serialize};

/// A validated, non-blank story idea.
///
/// # Examples
///
/// ```
/// use scenewright_core::StoryIdea;
///
/// let idea = StoryIdea::parse("  A lighthouse keeper finds a bottle.  ").unwrap();
/// assert_eq!(idea.as_str(), "A lighthouse keeper finds a bottle.");
/// assert!(StoryIdea::parse(" \n\t").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub struct StoryIdea(String);

impl StoryIdea {
    /// Validate free text as a story idea.
    #[track_caller]
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::BlankIdea));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The idea text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A scene as returned by the script generation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScene {
    /// Scene number as reported by the model
    pub scene_number: u32,
    /// Where the scene takes place
    pub setting: String,
    /// What happens on screen
    pub action: String,
    /// Spoken dialogue or voiceover
    pub dialogue_vo: String,
}

/// The structured script returned by the script generation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScreenplay {
    /// Story title
    pub title: String,
    /// Prompt for the title card image
    pub thumbnail_prompt: String,
    /// Scenes in narrative order
    pub scenes: Vec<RawScene>,
}

impl RawScreenplay {
    /// Whether the reported scene numbers already form `1..=n` in order.
    pub fn is_contiguous(&self) -> bool {
        self.scenes
            .iter()
            .enumerate()
            .all(|(index, scene)| scene.scene_number as usize == index + 1)
    }
}

/// Stable identity of a scene, assigned from its scene number at creation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
pub struct SceneId(pub u32);

/// One ~8 second narrative unit.
///
/// Script content is immutable after creation; only the visuals, the keyframe
/// and the in-flight flag change over the scene's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Scene {
    id: SceneId,
    scene_number: u32,
    setting: String,
    action: String,
    dialogue_or_voiceover: String,
    visual_prompt: Option<String>,
    transition_prompt: Option<String>,
    keyframe_image: Option<ImageData>,
    is_generating_image: bool,
}

impl Scene {
    fn from_raw(position: usize, raw: RawScene) -> Self {
        let scene_number = position as u32 + 1;
        Self {
            id: SceneId(scene_number),
            scene_number,
            setting: raw.setting,
            action: raw.action,
            dialogue_or_voiceover: raw.dialogue_vo,
            visual_prompt: None,
            transition_prompt: None,
            keyframe_image: None,
            is_generating_image: false,
        }
    }

    /// Whether a keyframe may be requested for this scene.
    pub fn has_visual_prompt(&self) -> bool {
        self.visual_prompt
            .as_deref()
            .is_some_and(|prompt| !prompt.trim().is_empty())
    }

    /// Overwrite the enrichment results.
    pub fn set_visuals(&mut self, visual_prompt: String, transition_prompt: Option<String>) {
        self.visual_prompt = Some(visual_prompt);
        self.transition_prompt = transition_prompt;
    }

    /// Mark a keyframe request as outstanding.
    pub fn begin_image(&mut self) {
        self.is_generating_image = true;
    }

    /// Replace the keyframe and clear the in-flight flag.
    pub fn finish_image(&mut self, image: ImageData) {
        self.keyframe_image = Some(image);
        self.is_generating_image = false;
    }

    /// Clear the in-flight flag, keeping any existing keyframe.
    pub fn fail_image(&mut self) {
        self.is_generating_image = false;
    }
}

/// The top-level generation result.
///
/// # Examples
///
/// ```
/// use scenewright_core::{RawScene, RawScreenplay, SceneId, Screenplay};
///
/// let raw = RawScreenplay {
///     title: "The Bottle".to_string(),
///     thumbnail_prompt: "A bottle on a rocky shore".to_string(),
///     scenes: vec![RawScene {
///         scene_number: 7,
///         setting: "Shore".to_string(),
///         action: "A wave deposits a bottle.".to_string(),
///         dialogue_vo: "".to_string(),
///     }],
/// };
///
/// let screenplay = Screenplay::from_raw(raw).unwrap();
/// let scene = screenplay.scene(SceneId(1)).unwrap();
/// assert_eq!(*scene.scene_number(), 1);
/// assert!(scene.visual_prompt().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Screenplay {
    title: String,
    thumbnail_prompt: String,
    scenes: Vec<Scene>,
}

impl Screenplay {
    /// Materialize scenes from a raw script.
    ///
    /// Scene numbers are renumbered to their 1-based position and each scene's id
    /// is its scene number. A script with no scenes is malformed.
    #[track_caller]
    pub fn from_raw(raw: RawScreenplay) -> Result<Self, GenerationError> {
        if raw.scenes.is_empty() {
            return Err(GenerationError::new(
                GenerationErrorKind::MalformedScreenplay("response contained no scenes".into()),
            ));
        }
        let scenes = raw
            .scenes
            .into_iter()
            .enumerate()
            .map(|(position, scene)| Scene::from_raw(position, scene))
            .collect();
        Ok(Self {
            title: raw.title,
            thumbnail_prompt: raw.thumbnail_prompt,
            scenes,
        })
    }

    /// Look up a scene by id.
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    /// Look up a scene by id for mutation.
    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|scene| scene.id == id)
    }

    /// Mutable access to scenes in order.
    pub fn scenes_mut(&mut self) -> &mut [Scene] {
        &mut self.scenes
    }

    /// Scenes paired with the scene that follows them.
    pub fn scene_pairs(&self) -> impl Iterator<Item = (&Scene, Option<&Scene>)> {
        self.scenes
            .iter()
            .enumerate()
            .map(|(index, scene)| (scene, self.scenes.get(index + 1)))
    }

    /// Scenes that currently carry a keyframe.
    pub fn keyframes(&self) -> impl Iterator<Item = (&Scene, &ImageData)> {
        self.scenes
            .iter()
            .filter_map(|scene| scene.keyframe_image.as_ref().map(|image| (scene, image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_scene(number: u32, setting: &str) -> RawScene {
        RawScene {
            scene_number: number,
            setting: setting.to_string(),
            action: format!("{} action", setting),
            dialogue_vo: String::new(),
        }
    }

    fn raw(scenes: Vec<RawScene>) -> RawScreenplay {
        RawScreenplay {
            title: "Title".to_string(),
            thumbnail_prompt: "Thumb".to_string(),
            scenes,
        }
    }

    #[test]
    fn test_scene_numbers_follow_position() {
        let screenplay = Screenplay::from_raw(raw(vec![
            raw_scene(3, "Beach"),
            raw_scene(3, "Tower"),
            raw_scene(9, "Sea"),
        ]))
        .unwrap();

        let numbers: Vec<u32> = screenplay.scenes().iter().map(|s| *s.scene_number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        for scene in screenplay.scenes() {
            assert_eq!(scene.id().0, *scene.scene_number());
        }
        assert_eq!(screenplay.scenes()[1].setting(), "Tower");
    }

    #[test]
    fn test_empty_script_is_malformed() {
        let err = Screenplay::from_raw(raw(vec![])).unwrap_err();
        assert!(matches!(
            err.kind,
            GenerationErrorKind::MalformedScreenplay(_)
        ));
    }

    #[test]
    fn test_contiguity_check() {
        assert!(raw(vec![raw_scene(1, "A"), raw_scene(2, "B")]).is_contiguous());
        assert!(!raw(vec![raw_scene(0, "A"), raw_scene(1, "B")]).is_contiguous());
    }

    #[test]
    fn test_failed_image_keeps_existing_keyframe() {
        let mut screenplay = Screenplay::from_raw(raw(vec![raw_scene(1, "A")])).unwrap();
        let scene = screenplay.scene_mut(SceneId(1)).unwrap();
        scene.finish_image(ImageData::png("AAAA"));
        scene.begin_image();
        assert!(*scene.is_generating_image());
        scene.fail_image();
        assert!(!*scene.is_generating_image());
        assert_eq!(scene.keyframe_image(), &Some(ImageData::png("AAAA")));
    }

    #[test]
    fn test_blank_visual_prompt_does_not_count() {
        let mut screenplay = Screenplay::from_raw(raw(vec![raw_scene(1, "A")])).unwrap();
        let scene = screenplay.scene_mut(SceneId(1)).unwrap();
        assert!(!scene.has_visual_prompt());
        scene.set_visuals("  ".to_string(), None);
        assert!(!scene.has_visual_prompt());
        scene.set_visuals("Wide shot".to_string(), Some("CUT TO:".to_string()));
        assert!(scene.has_visual_prompt());
    }

    #[test]
    fn test_scene_pairs_end_with_none() {
        let screenplay =
            Screenplay::from_raw(raw(vec![raw_scene(1, "A"), raw_scene(2, "B")])).unwrap();
        let pairs: Vec<_> = screenplay
            .scene_pairs()
            .map(|(scene, next)| (*scene.scene_number(), next.map(|n| *n.scene_number())))
            .collect();
        assert_eq!(pairs, vec![(1, Some(2)), (2, None)]);
    }
}
