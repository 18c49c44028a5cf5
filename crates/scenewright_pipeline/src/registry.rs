//! Character reference registry.

use scenewright_core::{CharacterReference, ImageData};
use std::sync::Arc;

/// Ordered, deduplicated set of character reference images.
///
/// Entries keep their first-insertion order and never repeat a payload. The
/// backing list is shared copy-on-write: [`snapshot`](Self::snapshot) hands out
/// the current list, and a later mutation clones it instead of touching a list
/// an in-flight generation call still holds.
///
/// # Examples
///
/// ```
/// use scenewright_core::ImageData;
/// use scenewright_pipeline::CharacterRegistry;
///
/// let mut registry = CharacterRegistry::default();
/// let keeper = ImageData::png("S0VFUEVS");
///
/// assert!(registry.add(keeper.clone()));
/// assert!(!registry.lock(keeper.clone()));
/// assert_eq!(registry.len(), 1);
///
/// let before = registry.snapshot();
/// registry.remove(0);
/// assert_eq!(before.len(), 1);
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterRegistry {
    entries: Arc<Vec<CharacterReference>>,
}

impl CharacterRegistry {
    /// Append an image unless an identical payload is already present.
    ///
    /// Returns whether the registry changed.
    pub fn add(&mut self, image: ImageData) -> bool {
        if self.contains(&image) {
            return false;
        }
        Arc::make_mut(&mut self.entries).push(CharacterReference::new(image));
        true
    }

    /// Promote an existing image (typically a keyframe) into the registry.
    pub fn lock(&mut self, image: ImageData) -> bool {
        self.add(image)
    }

    /// Remove the entry at `index`, if there is one.
    pub fn remove(&mut self, index: usize) -> Option<CharacterReference> {
        if index >= self.entries.len() {
            return None;
        }
        Some(Arc::make_mut(&mut self.entries).remove(index))
    }

    /// Whether an identical payload is registered.
    pub fn contains(&self, image: &ImageData) -> bool {
        self.entries
            .iter()
            .any(|reference| reference.image_data() == image)
    }

    /// The current ordered entries, shared with the registry.
    pub fn snapshot(&self) -> Arc<Vec<CharacterReference>> {
        Arc::clone(&self.entries)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries = Arc::default();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
