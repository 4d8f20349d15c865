//! Shared utility functions.

use serde_json::{Map, Value};

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Locate the JSON object embedded in free text.
///
/// Takes the substring from the first `{` to the last `}` inclusive.
/// Returns `None` when there is no such span.
pub fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Decode the JSON object embedded in free text.
///
/// Text starting with the `Error` marker never yields an object.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    if text.starts_with("Error") {
        return None;
    }
    match serde_json::from_str::<Value>(json_span(text)?) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
