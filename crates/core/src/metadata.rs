//! Title and tag metadata
//!
//! The pure transforms applied to generated output (`sanitize_tags`,
//! `normalize_title`) and the bounded calls to the external generation
//! service. The service itself is behind [`MetadataGenerator`]; this module
//! never talks to a network.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

/// Fallback title for empty or missing generated titles
pub const UNTITLED_PROMPT: &str = "Untitled Prompt";

/// Title returned when the prompt is too long to send for title generation
pub const UNTITLED_TOO_LONG: &str = "Untitled Prompt (Text too long)";

/// Titles longer than this many words are truncated
pub const TITLE_MAX_WORDS: usize = 10;

/// Number of words kept when truncating a title
pub const TITLE_KEEP_WORDS: usize = 7;

/// Marker appended to a truncated title
pub const ELLIPSIS: &str = "...";

pub const TITLE_MIN_INPUT_CHARS: usize = 5;
pub const TITLE_MAX_INPUT_CHARS: usize = 5000;
pub const TAGS_MIN_INPUT_CHARS: usize = 10;
pub const TAGS_MAX_INPUT_CHARS: usize = 10000;

/// External text-generation service
///
/// Implementations return the raw output object of the model call:
/// `{"title": "..."}` for [`title`](Self::title) and `{"tags": [...]}` for
/// [`tags`](Self::tags). Malformed output is tolerated by the callers in this
/// module; transport failures should be returned as `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    async fn title(&self, prompt_text: &str) -> Result<Value>;

    async fn tags(&self, prompt_text: &str) -> Result<Value>;
}

/// Generator used when no service is configured
///
/// Produces empty output, which maps to the untitled label and no tags.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGenerator;

#[async_trait]
impl MetadataGenerator for NoopGenerator {
    async fn title(&self, _prompt_text: &str) -> Result<Value> {
        Ok(Value::Object(serde_json::Map::new()))
    }

    async fn tags(&self, _prompt_text: &str) -> Result<Value> {
        Ok(Value::Object(serde_json::Map::new()))
    }
}

/// Trim, lowercase and de-duplicate tag strings, keeping first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|tag| {
            let tag = tag.as_ref().trim();
            if tag.is_empty() {
                None
            } else {
                Some(tag.to_lowercase())
            }
        })
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Clean a generated tag list
///
/// Non-string entries are dropped, the rest go through [`normalize_tags`].
pub fn sanitize_tags(raw: &[Value]) -> Vec<String> {
    normalize_tags(raw.iter().filter_map(Value::as_str))
}

/// Clamp a generated title to a displayable length
pub fn normalize_title(raw: Option<&str>) -> String {
    let title = match raw {
        Some(title) if !title.trim().is_empty() => title,
        _ => return UNTITLED_PROMPT.to_string(),
    };

    let words: Vec<&str> = title.split_ascii_whitespace().collect();
    if words.len() > TITLE_MAX_WORDS {
        format!("{}{}", words[..TITLE_KEEP_WORDS].join(" "), ELLIPSIS)
    } else {
        title.to_string()
    }
}

/// Ask the service for a title, enforcing input bounds
pub async fn generate_title(generator: &dyn MetadataGenerator, prompt_text: &str) -> Result<String> {
    if prompt_text.trim().chars().count() < TITLE_MIN_INPUT_CHARS {
        tracing::debug!("title generation skipped: prompt text too short");
        return Ok(UNTITLED_PROMPT.to_string());
    }
    if prompt_text.chars().count() > TITLE_MAX_INPUT_CHARS {
        tracing::warn!(
            limit = TITLE_MAX_INPUT_CHARS,
            "title generation skipped: prompt text too long"
        );
        return Ok(UNTITLED_TOO_LONG.to_string());
    }

    let output = generator.title(prompt_text).await?;
    Ok(normalize_title(output.get("title").and_then(Value::as_str)))
}

/// Ask the service for tags, enforcing input bounds
pub async fn generate_tags(generator: &dyn MetadataGenerator, prompt_text: &str) -> Result<Vec<String>> {
    if prompt_text.trim().chars().count() < TAGS_MIN_INPUT_CHARS {
        tracing::debug!("tag generation skipped: prompt text too short");
        return Ok(Vec::new());
    }
    if prompt_text.chars().count() > TAGS_MAX_INPUT_CHARS {
        tracing::warn!(
            limit = TAGS_MAX_INPUT_CHARS,
            "tag generation skipped: prompt text too long"
        );
        return Ok(Vec::new());
    }

    let output = generator.tags(prompt_text).await?;
    match output.get("tags").and_then(Value::as_array) {
        Some(raw) => Ok(sanitize_tags(raw)),
        None => {
            tracing::warn!(%output, "tag generation did not return an array");
            Ok(Vec::new())
        },
    }
}
