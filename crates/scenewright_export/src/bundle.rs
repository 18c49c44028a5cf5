//! Writing a complete export to disk.

use crate::archive::{KEYFRAME_ARCHIVE, keyframe_archive};
use crate::text::{script_text, transitions_markdown};
use scenewright_core::{ImageData, Screenplay};
use scenewright_error::{ExportError, ExportErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File name of the script export.
pub const SCRIPT_FILE: &str = "screenplay.txt";
/// File name of the transitions export.
pub const TRANSITIONS_FILE: &str = "transitions.md";
/// File name of the title card.
pub const THUMBNAIL_FILE: &str = "thumbnail.png";

/// Everything a finished story exports.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct ExportBundle {
    screenplay: Screenplay,
    thumbnail: Option<ImageData>,
}

impl ExportBundle {
    /// Bundle a screenplay with its title card.
    pub fn new(screenplay: Screenplay, thumbnail: Option<ImageData>) -> Self {
        Self {
            screenplay,
            thumbnail,
        }
    }

    /// Write the bundle into `dir`, creating it if needed.
    ///
    /// Always writes the script and transitions; the keyframe archive only
    /// when some scene has a keyframe and the thumbnail only when present.
    /// Returns the written paths in that order.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display(), scenes = self.screenplay.scenes().len()))]
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ExportError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            ExportError::new(ExportErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let mut written = vec![
            write_file(dir, SCRIPT_FILE, script_text(&self.screenplay).as_bytes())?,
            write_file(
                dir,
                TRANSITIONS_FILE,
                transitions_markdown(&self.screenplay).as_bytes(),
            )?,
        ];

        if self.screenplay.keyframes().next().is_some() {
            let archive = keyframe_archive(&self.screenplay)?;
            written.push(write_file(dir, KEYFRAME_ARCHIVE, &archive)?);
        } else {
            debug!("No keyframes, skipping archive");
        }

        if let Some(thumbnail) = &self.thumbnail {
            let bytes = thumbnail
                .decode()
                .map_err(|e| ExportError::new(ExportErrorKind::ThumbnailDecode(e.to_string())))?;
            written.push(write_file(dir, THUMBNAIL_FILE, &bytes)?);
        }

        info!(files = written.len(), "Export written");
        Ok(written)
    }
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf, ExportError> {
    let path = dir.join(name);
    std::fs::write(&path, contents).map_err(|e| {
        ExportError::new(ExportErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote export file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenewright_core::{RawScene, RawScreenplay};

    fn screenplay() -> Screenplay {
        Screenplay::from_raw(RawScreenplay {
            title: "The Bottle".to_string(),
            thumbnail_prompt: "A bottle".to_string(),
            scenes: (1..=2)
                .map(|n| RawScene {
                    scene_number: n,
                    setting: format!("LOCATION {}", n),
                    action: "Waves.".to_string(),
                    dialogue_vo: String::new(),
                })
                .collect(),
        })
        .unwrap()
    }

    #[test]
    fn test_bundle_without_images() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("export");

        let written = ExportBundle::new(screenplay(), None).write_to(&out)?;

        assert_eq!(
            written,
            vec![out.join(SCRIPT_FILE), out.join(TRANSITIONS_FILE)]
        );
        let script = std::fs::read_to_string(out.join(SCRIPT_FILE))?;
        assert!(script.starts_with("# The Bottle\n"));
        assert!(!out.join(KEYFRAME_ARCHIVE).exists());
        assert!(!out.join(THUMBNAIL_FILE).exists());
        Ok(())
    }

    #[test]
    fn test_bundle_with_keyframes_and_thumbnail() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut screenplay = screenplay();
        screenplay.scenes_mut()[1].finish_image(ImageData::from_bytes("image/png", b"frame"));
        let thumbnail = ImageData::from_bytes("image/png", b"title card");

        let written = ExportBundle::new(screenplay, Some(thumbnail)).write_to(dir.path())?;

        assert_eq!(written.len(), 4);
        assert!(dir.path().join(KEYFRAME_ARCHIVE).exists());
        assert_eq!(std::fs::read(dir.path().join(THUMBNAIL_FILE))?, b"title card");
        Ok(())
    }

    #[test]
    fn test_unwritable_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "a file, not a directory")?;

        let err = ExportBundle::new(screenplay(), None)
            .write_to(&blocker)
            .unwrap_err();

        assert!(matches!(err.kind, ExportErrorKind::DirectoryCreation(_)));
        Ok(())
    }
}
