//! Streaming-related error types.

use thiserror::Error;

use crate::traits::HttpError;

/// Result alias for stream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Terminal failure kinds of a response stream.
///
/// `Timeout` and `TransportFailure` both abort the same transport, but are
/// kept apart so callers can tell a stalled response from a dropped one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Could not establish the stream (network or HTTP error before the first byte).
    #[error("Failed to open stream: {message}")]
    OpenFailure {
        status: Option<u16>,
        message: String,
    },

    /// Read error after the stream was established.
    #[error("Stream connection lost: {message}")]
    TransportFailure { message: String },

    /// No chunk arrived within the idle window.
    #[error("Stream timeout after {duration_secs} seconds")]
    Timeout { duration_secs: u64 },

    /// Aborted by the caller or superseded by a newer send.
    #[error("Stream cancelled")]
    Cancelled,
}

impl StreamError {
    /// Classify an error raised while opening the stream
    pub fn open_failure(err: HttpError) -> Self {
        StreamError::OpenFailure {
            status: err.status(),
            message: err.to_string(),
        }
    }

    /// Classify an error raised while reading an open stream
    pub fn transport_failure(err: HttpError) -> Self {
        StreamError::TransportFailure {
            message: err.to_string(),
        }
    }

    /// Whether this error should be surfaced to the user at all.
    ///
    /// Cancellation is the normal result of sending a new message early.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, StreamError::Cancelled)
    }

    /// Check if this error is likely transient and the send can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::OpenFailure { status, .. } => {
                status.map(|s| s >= 500 || s == 429).unwrap_or(true)
            }
            StreamError::TransportFailure { .. } | StreamError::Timeout { .. } => true,
            StreamError::Cancelled => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::OpenFailure { status: Some(status), .. } => {
                format!("Could not reach the assistant (HTTP {}). Please try again.", status)
            }
            StreamError::OpenFailure { status: None, .. } => {
                "Could not reach the assistant. Check your connection and try again.".to_string()
            }
            StreamError::TransportFailure { .. } => {
                "Connection lost while the response was streaming.".to_string()
            }
            StreamError::Timeout { duration_secs } => {
                format!("Response timed out after {} seconds without data.", duration_secs)
            }
            StreamError::Cancelled => "Response cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::OpenFailure { .. } => "E_STREAM_OPEN",
            StreamError::TransportFailure { .. } => "E_STREAM_CONN",
            StreamError::Timeout { .. } => "E_STREAM_TIMEOUT",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
        }
    }
}
