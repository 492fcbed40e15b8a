//! Stream configuration.
//!
//! Use the builder methods to customize the endpoint and framing.
//!
//! # Example
//!
//! ```ignore
//! use chat_stream::config::StreamConfig;
//! use std::time::Duration;
//!
//! let config = StreamConfig::default()
//!     .with_base_url("https://chat.example.com")
//!     .with_idle_timeout(Duration::from_secs(45));
//! ```

use std::time::Duration;

use crate::sse::{FrameParser, DEFAULT_DATA_PREFIX, DONE_SENTINEL};

/// Default idle window between chunks
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default streaming endpoint, relative to the base URL
pub const DEFAULT_STREAM_PATH: &str = "/v1/sessions/{session_id}/stream";

const SESSION_PLACEHOLDER: &str = "{session_id}";

/// Configuration for opening and decoding response streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Base URL of the chat backend (default: http://localhost:8000)
    pub base_url: String,
    /// Path template; `{session_id}` is replaced per request
    pub stream_path: String,
    /// Longest allowed gap between chunks before the stream counts as stalled
    pub idle_timeout: Duration,
    /// Marker that starts a data line (default: `data:`)
    pub data_prefix: String,
    /// Payload that signals completion (default: `[DONE]`)
    pub done_sentinel: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
            done_sentinel: DONE_SENTINEL.to_string(),
        }
    }
}

impl StreamConfig {
    /// Create a new StreamConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the stream path template.
    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the data line marker.
    pub fn with_data_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.data_prefix = prefix.into();
        self
    }

    /// Set the completion sentinel.
    pub fn with_done_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.done_sentinel = sentinel.into();
        self
    }

    /// Create config from environment variables.
    ///
    /// Reads `CHAT_STREAM_BASE_URL` and `CHAT_STREAM_IDLE_TIMEOUT_SECS`;
    /// anything unset or unparsable keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("CHAT_STREAM_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup("CHAT_STREAM_IDLE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.idle_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    "Ignoring invalid CHAT_STREAM_IDLE_TIMEOUT_SECS value: {:?}",
                    raw
                ),
            }
        }

        config
    }

    /// Full URL of the streaming endpoint for a session
    pub fn stream_url(&self, session_id: &str) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.stream_path.replace(SESSION_PLACEHOLDER, session_id)
        )
    }

    /// Frame parser using this config's marker and sentinel
    pub fn frame_parser(&self) -> FrameParser {
        FrameParser::new(self.data_prefix.clone(), self.done_sentinel.clone())
    }
}
