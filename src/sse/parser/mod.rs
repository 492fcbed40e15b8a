//! SSE frame parsing logic
//!
//! Turns one complete frame (already isolated by the
//! [`FrameSplitter`](crate::sse::FrameSplitter)) into a [`StreamEvent`].
//! Payloads may be JSON or plain text; neither shape is an error.

mod content;

use crate::sse::events::{SseLine, StreamEvent};
use content::{extract_json_event, JsonExtract};

/// Default marker that starts a data line
pub const DEFAULT_DATA_PREFIX: &str = "data:";

/// Default payload that signals intentional completion
pub const DONE_SENTINEL: &str = "[DONE]";

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str, data_prefix: &str) -> SseLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(rest) = line.strip_prefix(data_prefix) {
        // Exactly one optional separating space belongs to the marker
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        return SseLine::Data(rest.to_string());
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    SseLine::Other(line.to_string())
}

/// Parse a frame using the default data prefix and sentinel
pub fn parse_frame(frame: &str) -> StreamEvent {
    FrameParser::default().parse(frame)
}

/// Frame parser configured with a data marker and a completion sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameParser {
    data_prefix: String,
    done_sentinel: String,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self {
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
            done_sentinel: DONE_SENTINEL.to_string(),
        }
    }
}

impl FrameParser {
    /// Create a parser with a custom data marker and sentinel
    pub fn new(data_prefix: impl Into<String>, done_sentinel: impl Into<String>) -> Self {
        Self {
            data_prefix: data_prefix.into(),
            done_sentinel: done_sentinel.into(),
        }
    }

    /// Extract the frame's payload: data lines, marker stripped, rejoined with `\n`.
    ///
    /// Returns `None` when the frame has no data lines at all.
    pub fn payload(&self, frame: &str) -> Option<String> {
        let data: Vec<String> = frame
            .split('\n')
            .filter_map(|line| match parse_sse_line(line, &self.data_prefix) {
                SseLine::Data(data) => Some(data),
                _ => None,
            })
            .collect();

        if data.is_empty() {
            None
        } else {
            Some(data.join("\n"))
        }
    }

    /// Parse one complete frame into an event
    pub fn parse(&self, frame: &str) -> StreamEvent {
        let Some(payload) = self.payload(frame) else {
            return StreamEvent::Ignore;
        };

        if payload == self.done_sentinel {
            return StreamEvent::Done;
        }

        let text = match serde_json::from_str::<serde_json::Value>(&payload) {
            Ok(value) => match extract_json_event(&value) {
                JsonExtract::Text(text) => text,
                JsonExtract::Done => return StreamEvent::Done,
                JsonExtract::Nothing => return StreamEvent::Ignore,
                JsonExtract::Literal => payload,
            },
            Err(e) => {
                tracing::debug!("Payload is not JSON, using plain text: {}", e);
                payload
            }
        };

        if text.is_empty() {
            StreamEvent::Ignore
        } else {
            StreamEvent::TextDelta(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(text: &str) -> StreamEvent {
        StreamEvent::TextDelta(text.to_string())
    }

    // Tests for parse_sse_line

    #[test]
    fn test_parse_empty_line() {
        assert_eq!(parse_sse_line("", "data:"), SseLine::Empty);
        assert_eq!(parse_sse_line("\r", "data:"), SseLine::Empty);
    }

    #[test]
    fn test_parse_comment_line() {
        assert_eq!(
            parse_sse_line(": keep-alive", "data:"),
            SseLine::Comment("keep-alive".to_string())
        );
    }

    #[test]
    fn test_parse_data_line_strips_one_space() {
        assert_eq!(
            parse_sse_line("data: hello", "data:"),
            SseLine::Data("hello".to_string())
        );
        assert_eq!(
            parse_sse_line("data:hello", "data:"),
            SseLine::Data("hello".to_string())
        );
        assert_eq!(
            parse_sse_line("data:  hello", "data:"),
            SseLine::Data(" hello".to_string())
        );
        assert_eq!(
            parse_sse_line("data: hello\r", "data:"),
            SseLine::Data("hello".to_string())
        );
    }

    #[test]
    fn test_parse_other_fields() {
        assert_eq!(
            parse_sse_line("event: content", "data:"),
            SseLine::Other("event: content".to_string())
        );
        assert_eq!(
            parse_sse_line("id: 7", "data:"),
            SseLine::Other("id: 7".to_string())
        );
    }

    // Tests for frame parsing

    #[test]
    fn test_json_text_field() {
        assert_eq!(parse_frame(r#"data: {"text":"hi"}"#), delta("hi"));
    }

    #[test]
    fn test_plain_text_fallback() {
        assert_eq!(
            parse_frame("data: plain text, no braces"),
            delta("plain text, no braces")
        );
    }

    #[test]
    fn test_leading_space_preserved_after_marker_space() {
        assert_eq!(parse_frame("data:  crankshaft"), delta(" crankshaft"));
    }

    #[test]
    fn test_sentinel_is_done() {
        assert_eq!(parse_frame("data: [DONE]"), StreamEvent::Done);
        assert_eq!(parse_frame("data:[DONE]"), StreamEvent::Done);
    }

    #[test]
    fn test_sentinel_split_across_lines_is_not_done() {
        // Rejoining inserts a newline, so the payload is no longer the sentinel
        assert_eq!(parse_frame("data: [DO\ndata: NE]"), delta("[DO\nNE]"));
    }

    #[test]
    fn test_sentinel_with_non_data_lines_is_done() {
        let frame = "event: message\nid: 12\n: comment\ndata: [DONE]";
        assert_eq!(parse_frame(frame), StreamEvent::Done);
    }

    #[test]
    fn test_multiline_plain_text_rejoined_with_newline() {
        assert_eq!(
            parse_frame("data: first line\ndata: second line"),
            delta("first line\nsecond line")
        );
    }

    #[test]
    fn test_multiline_json_rejoined() {
        let frame = "data: {\"text\":\ndata: \"split\"}";
        assert_eq!(parse_frame(frame), delta("split"));
    }

    #[test]
    fn test_json_string_value() {
        assert_eq!(parse_frame(r#"data: "quoted""#), delta("quoted"));
    }

    #[test]
    fn test_no_data_lines_is_ignore() {
        assert_eq!(parse_frame(""), StreamEvent::Ignore);
        assert_eq!(parse_frame(": keep-alive"), StreamEvent::Ignore);
        assert_eq!(parse_frame("event: ping"), StreamEvent::Ignore);
    }

    #[test]
    fn test_empty_payload_is_ignore() {
        assert_eq!(parse_frame("data:"), StreamEvent::Ignore);
        assert_eq!(parse_frame(r#"data: {"text":""}"#), StreamEvent::Ignore);
        assert_eq!(parse_frame(r#"data: """#), StreamEvent::Ignore);
    }

    #[test]
    fn test_object_without_text_is_ignore() {
        assert_eq!(
            parse_frame(r#"data: {"type":"ping","seq":4}"#),
            StreamEvent::Ignore
        );
    }

    #[test]
    fn test_done_discriminator_object() {
        assert_eq!(parse_frame(r#"data: {"type":"done"}"#), StreamEvent::Done);
        assert_eq!(
            parse_frame(r#"data: {"type":"done","message_id":"m-1"}"#),
            StreamEvent::Done
        );
    }

    #[test]
    fn test_non_object_json_scalars_are_literal_text() {
        assert_eq!(parse_frame("data: 42"), delta("42"));
        assert_eq!(parse_frame("data: true"), delta("true"));
    }

    #[test]
    fn test_custom_prefix_and_sentinel() {
        let parser = FrameParser::new("payload:", "<eos>");
        assert_eq!(parser.parse("payload: hello"), delta("hello"));
        assert_eq!(parser.parse("payload: <eos>"), StreamEvent::Done);
        assert_eq!(parser.parse("data: hello"), StreamEvent::Ignore);
    }

    #[test]
    fn test_backend_stream_with_metadata() {
        let frame = r#"data: {"type":"content","seq":1,"session_id":"sess-abc","data":"Hello "}"#;
        assert_eq!(parse_frame(frame), delta("Hello "));
    }
}
