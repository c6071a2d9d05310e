//! Recovery of JSON payloads from free-text model replies
//!
//! Models asked for "only JSON" still routinely wrap the payload in a
//! markdown code fence. [`extract_json`] peels off one such fence: the
//! opener at the start of the reply and everything from the last fence
//! marker onward. Anything else (prose before the opener, several fenced
//! blocks) is left for the JSON decoder to reject, and the rejection
//! carries the exact candidate text.

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::LlmError;

/// Markdown code fence marker
const FENCE: &str = "```";

/// Isolate the JSON candidate inside a raw model reply
///
/// Trims the reply; if it opens with a code fence (with or without a
/// language tag), strips the opener and cuts at the last fence marker, then
/// trims again.
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(body) = strip_fence_opener(trimmed) else {
        return trimmed;
    };

    let body = body.rfind(FENCE).map_or(body, |idx| &body[..idx]);
    body.trim()
}

/// Strip a leading fence and its optional language tag
fn strip_fence_opener(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;

    if let Some((first_line, remainder)) = rest.split_once('\n')
        && is_language_tag(first_line.trim_end())
    {
        return Some(remainder);
    }

    Some(rest.strip_prefix("json").unwrap_or(rest))
}

/// Whether `tag` looks like an info string such as `json` or `jsonc`
///
/// JSON scalars (`1.5`, `true`, `null`) on the opener line are payload, not tags.
fn is_language_tag(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_alphabetic())
        && !matches!(tag, "true" | "false" | "null")
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.'))
}

/// Extract and validate the JSON payload of a reply
///
/// Returned as raw JSON so the exact text reaches the final decoder.
pub fn extract_raw(raw: &str) -> Result<Box<RawValue>, LlmError> {
    let candidate = extract_json(raw);

    if candidate.len() != raw.len() {
        tracing::debug!(stripped = raw.len() - candidate.len(), "unwrapped JSON reply");
    }

    RawValue::from_string(candidate.to_owned()).map_err(|e| LlmError::decode(e, candidate))
}

/// Extract the JSON payload of a reply and decode it into `T`
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    decode_candidate(extract_json(raw))
}

/// Decode an already extracted candidate into `T`
pub fn decode_candidate<T: DeserializeOwned>(candidate: &str) -> Result<T, LlmError> {
    serde_json::from_str(candidate).map_err(|e| LlmError::decode(e, candidate))
}
