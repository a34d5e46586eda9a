//! Pull a JSON object out of free-form LLM output
//!
//! Models wrap their answer in prose or code fences often enough that the
//! reply is never parsed as-is unless it happens to be clean JSON.

use serde_json::Value;

use crate::core::error::{AgentError, Result};

/// Extract the first complete JSON object from an LLM response
///
/// A reply that is a clean JSON object is used directly. Otherwise every
/// `{` is tried as a start position, left to right: the span up to the
/// brace that brings nesting depth back to zero is parsed, and the first
/// span that parses as an object wins.
pub fn extract_json(response: &str) -> Result<Value> {
    let text = response.trim();

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    // '{' and '}' are ASCII, so byte offsets are always char boundaries
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if bytes[start] != b'{' {
            continue;
        }
        if let Some(end) = matching_brace(bytes, start) {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&text[start..=end])
            {
                return Ok(value);
            }
        }
    }

    Err(AgentError::MalformedResponse("no_json_object_found".into()))
}

/// Position of the brace closing the one at `start`, by depth counting
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
