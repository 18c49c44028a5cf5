//! Output aspect ratio for generated images.

use scenewright_error::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};

/// Aspect ratio applied to every image generated after it is selected.
///
/// # Examples
///
/// ```
/// use scenewright_core::AspectRatio;
///
/// let ratio = AspectRatio::parse("9:16").unwrap();
/// assert_eq!(ratio, AspectRatio::Portrait);
/// assert_eq!(ratio.to_string(), "9:16");
/// assert!(AspectRatio::parse("4:3").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum AspectRatio {
    /// Landscape, 16:9
    #[default]
    #[strum(serialize = "16:9")]
    #[serde(rename = "16:9")]
    Landscape,
    /// Portrait, 9:16
    #[strum(serialize = "9:16")]
    #[serde(rename = "9:16")]
    Portrait,
    /// Square, 1:1
    #[strum(serialize = "1:1")]
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Parse one of the supported ratio strings.
    #[track_caller]
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        value.trim().parse().map_err(|_| {
            ValidationError::new(ValidationErrorKind::UnknownAspectRatio(value.to_string()))
        })
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "Landscape (16:9)",
            AspectRatio::Portrait => "Portrait (9:16)",
            AspectRatio::Square => "Square (1:1)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_ratio_round_trips_through_its_display_form() {
        for ratio in AspectRatio::iter() {
            assert_eq!(AspectRatio::parse(ratio.as_ref()).unwrap(), ratio);
        }
    }

    #[test]
    fn test_serde_uses_ratio_strings() {
        let json = serde_json::to_string(&AspectRatio::Square).unwrap();
        assert_eq!(json, "\"1:1\"");
        let parsed: AspectRatio = serde_json::from_str("\"16:9\"").unwrap();
        assert_eq!(parsed, AspectRatio::Landscape);
    }

    #[test]
    fn test_unknown_ratio_is_validation_error() {
        let err = AspectRatio::parse("21:9").unwrap_err();
        assert_eq!(
            err.kind,
            ValidationErrorKind::UnknownAspectRatio("21:9".to_string())
        );
    }
}
