use serde::{Deserialize, Serialize};

/// Body of a session-scoped streaming request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamRequest {
    /// The user utterance to send
    pub content: String,
    /// Ask the server for an SSE response
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

impl StreamRequest {
    /// Create a streaming request for the given text
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            stream: true,
        }
    }
}
