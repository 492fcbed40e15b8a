//! Error handling for streamed chat responses.
//!
//! | Variant | Meaning | Shown to the user |
//! |---------|---------|-------------------|
//! | OpenFailure | No stream could be established | Yes |
//! | TransportFailure | Read error mid-stream | Yes ("connection lost") |
//! | Timeout | Idle window elapsed | Yes ("response timed out") |
//! | Cancelled | Caller or a newer send aborted the stream | No |
//!
//! Malformed frames are never errors; the parser falls back to plain text.

mod stream;

pub use stream::{StreamError, StreamResult};
