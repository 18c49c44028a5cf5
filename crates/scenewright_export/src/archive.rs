//! Keyframe archive.

use scenewright_core::Screenplay;
use scenewright_error::{ExportError, ExportErrorKind};
use std::io::{Cursor, Write};
use tracing::{debug, instrument};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// File name of the keyframe archive inside an export directory.
pub const KEYFRAME_ARCHIVE: &str = "screenplay_keyframes.zip";

/// Archive entry name for a scene's keyframe.
///
/// # Examples
///
/// ```
/// use scenewright_export::keyframe_filename;
///
/// assert_eq!(keyframe_filename(7), "scene_007.png");
/// assert_eq!(keyframe_filename(1234), "scene_1234.png");
/// ```
pub fn keyframe_filename(scene_number: u32) -> String {
    format!("scene_{:03}.png", scene_number)
}

/// Build a deflate zip holding one decoded image per scene with a keyframe.
///
/// Scenes without a keyframe are skipped; a screenplay with none yields an
/// empty archive.
///
/// # Errors
///
/// `ImageDecode` when a keyframe is not valid base64, `Archive` when the zip
/// cannot be written.
#[instrument(skip(screenplay), fields(scenes = screenplay.scenes().len()))]
pub fn keyframe_archive(screenplay: &Screenplay) -> Result<Vec<u8>, ExportError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

    let mut entries = 0;
    for (scene, image) in screenplay.keyframes() {
        let scene_number = *scene.scene_number();
        let bytes = image.decode().map_err(|e| {
            ExportError::new(ExportErrorKind::ImageDecode {
                scene_number,
                message: e.to_string(),
            })
        })?;

        writer
            .start_file(keyframe_filename(scene_number), options)
            .map_err(|e| ExportError::new(ExportErrorKind::Archive(e.to_string())))?;
        writer
            .write_all(&bytes)
            .map_err(|e| ExportError::new(ExportErrorKind::Archive(e.to_string())))?;
        entries += 1;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ExportError::new(ExportErrorKind::Archive(e.to_string())))?;
    let archive = cursor.into_inner();
    debug!(entries, bytes = archive.len(), "Built keyframe archive");
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenewright_core::{ImageData, RawScene, RawScreenplay};
    use std::io::Read;

    fn screenplay(scenes: u32) -> Screenplay {
        Screenplay::from_raw(RawScreenplay {
            title: "The Bottle".to_string(),
            thumbnail_prompt: "A bottle".to_string(),
            scenes: (1..=scenes)
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
    fn test_archive_holds_decoded_keyframes() {
        let mut screenplay = screenplay(3);
        screenplay.scenes_mut()[0].finish_image(ImageData::from_bytes("image/png", b"first"));
        screenplay.scenes_mut()[2].finish_image(ImageData::from_bytes("image/png", b"third"));

        let bytes = keyframe_archive(&screenplay).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), 2);
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["scene_001.png", "scene_003.png"]);

        let mut content = Vec::new();
        archive
            .by_name("scene_003.png")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"third");
    }

    #[test]
    fn test_archive_without_keyframes_is_empty() {
        let bytes = keyframe_archive(&screenplay(2)).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_undecodable_keyframe_names_scene() {
        let mut screenplay = screenplay(2);
        screenplay.scenes_mut()[1].finish_image(ImageData::png("not*base64!"));

        let err = keyframe_archive(&screenplay).unwrap_err();
        assert!(matches!(
            err.kind,
            ExportErrorKind::ImageDecode { scene_number: 2, .. }
        ));
    }
}
