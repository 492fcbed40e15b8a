//! Text extraction from JSON payloads

use serde_json::Value;

/// Field names searched for displayable text, in priority order
pub(crate) const TEXT_FIELDS: &[&str] = &["text", "content", "data", "chunk", "token", "delta"];

/// Discriminator values that mark a completion object
const DONE_TYPES: &[&str] = &["done", "message_stop", "complete"];

/// Outcome of inspecting a parsed JSON payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JsonExtract {
    /// Displayable text found
    Text(String),
    /// Object carries a completion discriminator
    Done,
    /// Object with no text-bearing field
    Nothing,
    /// Not an object or string; the raw payload is the text
    Literal,
}

/// Inspect a JSON payload for a delta or a completion marker
pub(crate) fn extract_json_event(value: &Value) -> JsonExtract {
    match value {
        Value::String(text) => JsonExtract::Text(text.clone()),
        Value::Object(_) => {
            if is_done_marker(value) {
                return JsonExtract::Done;
            }
            match find_text(value).or_else(|| openai_delta(value)) {
                Some(text) => JsonExtract::Text(text),
                None => JsonExtract::Nothing,
            }
        }
        _ => JsonExtract::Literal,
    }
}

fn is_done_marker(value: &Value) -> bool {
    let tagged = ["type", "event"].iter().any(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(|t| DONE_TYPES.iter().any(|d| t.eq_ignore_ascii_case(d)))
            .unwrap_or(false)
    });

    tagged || value.get("done").and_then(Value::as_bool) == Some(true)
}

/// First candidate field holding a string, looking one level into nested objects
fn find_text(value: &Value) -> Option<String> {
    TEXT_FIELDS.iter().find_map(|field| match value.get(field)? {
        Value::String(text) => Some(text.clone()),
        nested @ Value::Object(_) => TEXT_FIELDS
            .iter()
            .find_map(|inner| nested.get(inner).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    })
}

/// OpenAI-style `choices[0].delta.content`
fn openai_delta(value: &Value) -> Option<String> {
    value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}
