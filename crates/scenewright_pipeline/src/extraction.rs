//! Utilities for extracting structured data from model responses.
//!
//! Structured output is requested with a response schema, but models still
//! occasionally wrap JSON in markdown fences or explanatory text. Parsing tries
//! the raw text first and falls back to extraction.

use scenewright_core::RawScreenplay;
use scenewright_error::{GenerationError, GenerationErrorKind};

/// Extract a JSON object from a response that may contain markdown or extra text.
///
/// Strategies, in order:
/// 1. Markdown code blocks: ```json ... ``` (or an unlabeled fence)
/// 2. Balanced braces: { ... }
///
/// # Errors
///
/// Returns `MalformedScreenplay` if no JSON object is found.
///
/// # Examples
///
/// ```
/// use scenewright_pipeline::extract_json;
///
/// let response = "Here's the screenplay:\n```json\n{\"title\": \"Bottle\"}\n```\n";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "{\"title\": \"Bottle\"}");
/// ```
#[track_caller]
pub fn extract_json(response: &str) -> Result<String, GenerationError> {
    if let Some(json) = extract_from_code_block(response, "json") {
        return Ok(json);
    }

    if let Some(json) = extract_balanced(response, '{', '}') {
        return Ok(json);
    }

    tracing::error!(
        response_length = response.len(),
        "No JSON found in model response"
    );

    Err(GenerationError::new(
        GenerationErrorKind::MalformedScreenplay(format!(
            "No JSON found in response (length: {})",
            response.len()
        )),
    ))
}

/// Parse a structured screenplay response.
///
/// # Errors
///
/// Returns `MalformedScreenplay` if neither the raw text nor any extracted JSON
/// matches the screenplay schema.
pub fn parse_screenplay(response: &str) -> Result<RawScreenplay, GenerationError> {
    let direct_err = match serde_json::from_str::<RawScreenplay>(response.trim()) {
        Ok(raw) => return Ok(raw),
        Err(e) => e,
    };

    tracing::debug!(error = %direct_err, "Direct parse failed, extracting JSON");

    let extracted = extract_json(response)?;
    serde_json::from_str::<RawScreenplay>(&extracted).map_err(|e| {
        tracing::warn!(error = %e, "Screenplay JSON does not match schema");
        GenerationError::new(GenerationErrorKind::MalformedScreenplay(e.to_string()))
    })
}

/// Extract content from markdown code blocks.
///
/// Looks for ```language\n...\n``` first, then an unlabeled fence. A missing
/// closing fence (truncated response) yields everything after the opening one.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        return Some(until_fence(&response[content_start..]));
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip to next newline (in case there's a language specifier)
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);
    Some(until_fence(&response[skip_to..]))
}

fn until_fence(rest: &str) -> String {
    match rest.find("```") {
        Some(end) => rest[..end].trim().to_string(),
        None => rest.trim().to_string(),
    }
}

/// Extract content between balanced delimiters, ignoring delimiters in strings.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREENPLAY: &str = r#"{"title":"Bottle","thumbnail_prompt":"A bottle","scenes":[{"scene_number":1,"setting":"EXT. SHORE","action":"A wave.","dialogue_vo":""}]}"#;

    #[test]
    fn test_parses_raw_json() {
        let raw = parse_screenplay(SCREENPLAY).unwrap();
        assert_eq!(raw.title, "Bottle");
        assert_eq!(raw.scenes.len(), 1);
    }

    #[test]
    fn test_parses_fenced_json() {
        let response = format!("Sure! Here it is:\n```json\n{}\n```\nEnjoy.", SCREENPLAY);
        let raw = parse_screenplay(&response).unwrap();
        assert_eq!(raw.scenes[0].setting, "EXT. SHORE");
    }

    #[test]
    fn test_parses_json_surrounded_by_text() {
        let response = format!("Screenplay follows {} and that is all.", SCREENPLAY);
        assert!(parse_screenplay(&response).is_ok());
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"note {"a": "}{", "b": {"c": "\"}"}} trailing"#;
        assert_eq!(
            extract_balanced(text, '{', '}').unwrap(),
            r#"{"a": "}{", "b": {"c": "\"}"}}"#
        );
    }

    #[test]
    fn test_wrong_schema_is_malformed() {
        let err = parse_screenplay(r#"{"scenes": [{"scene_number": 1}]}"#).unwrap_err();
        assert!(matches!(
            err.kind,
            GenerationErrorKind::MalformedScreenplay(_)
        ));
    }

    #[test]
    fn test_no_json_is_malformed() {
        let err = parse_screenplay("I cannot write that screenplay.").unwrap_err();
        assert!(matches!(
            err.kind,
            GenerationErrorKind::MalformedScreenplay(_)
        ));
    }

    #[test]
    fn test_unterminated_fence_returns_rest() {
        let text = "```json\n{\"title\": \"x\"}";
        assert_eq!(extract_json(text).unwrap(), "{\"title\": \"x\"}");
    }
}
