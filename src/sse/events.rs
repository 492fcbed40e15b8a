//! SSE event types and definitions
//!
//! Contains the [`StreamEvent`] enum produced for every frame of a chat
//! response stream, and the [`SseLine`] classification of raw frame lines.

/// Semantic result of parsing one frame.
///
/// Events are created per frame and consumed immediately; they are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental assistant text to append to the in-progress message
    TextDelta(String),
    /// The server signalled intentional completion
    Done,
    /// Control, metadata or empty frame with nothing to display
    Ignore,
}

impl StreamEvent {
    /// Returns the event type name as a string for debugging purposes.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamEvent::TextDelta(_) => "text_delta",
            StreamEvent::Done => "done",
            StreamEvent::Ignore => "ignore",
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}

/// Represents a classified SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Data payload with the marker and one optional space removed
    Data(String),
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':'), typically a keep-alive
    Comment(String),
    /// Any other field (`event:`, `id:`, `retry:`) or unknown text
    Other(String),
}
