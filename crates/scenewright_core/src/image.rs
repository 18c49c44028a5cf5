//! Opaque image payloads and character references.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An encoded image as exchanged with the generative backend.
///
/// The payload is kept base64-encoded and shared behind an `Arc`, so cloning an
/// image into a snapshot or an in-flight request never copies the bytes.
/// Equality and hashing look at the encoded payload only; the MIME type is
/// carried along for the wire but does not make two identical payloads distinct.
///
/// # Examples
///
/// ```
/// use scenewright_core::ImageData;
///
/// let a = ImageData::new("image/png", "iVBORw0KGgo=");
/// let b = ImageData::new("image/jpeg", "iVBORw0KGgo=");
/// assert_eq!(a, b);
/// assert_eq!(a.decode().unwrap()[..4], [0x89, b'P', b'N', b'G']);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, derive_getters::Getters)]
pub struct ImageData {
    /// MIME type, e.g. "image/png"
    mime: String,
    /// Base64-encoded payload
    data: Arc<str>,
}

impl ImageData {
    /// Wrap an already base64-encoded payload.
    pub fn new(mime: impl Into<String>, base64: impl Into<Arc<str>>) -> Self {
        Self {
            mime: mime.into(),
            data: base64.into(),
        }
    }

    /// Wrap a base64-encoded PNG.
    pub fn png(base64: impl Into<Arc<str>>) -> Self {
        Self::new("image/png", base64)
    }

    /// Encode raw bytes.
    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime, STANDARD.encode(bytes))
    }

    /// Guess the MIME type from a file extension, defaulting to JPEG.
    pub fn mime_for_extension(extension: &str) -> &'static str {
        match extension.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            _ => "image/jpeg",
        }
    }

    /// Decode the payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }

    /// Length of the encoded payload.
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}

impl PartialEq for ImageData {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for ImageData {}

impl Hash for ImageData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

/// An image designated as the canonical likeness of a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct CharacterReference {
    /// The reference image
    image_data: ImageData,
}

impl CharacterReference {
    /// Create a reference from an image.
    pub fn new(image_data: ImageData) -> Self {
        Self { image_data }
    }
}

impl From<ImageData> for CharacterReference {
    fn from(image_data: ImageData) -> Self {
        Self::new(image_data)
    }
}
