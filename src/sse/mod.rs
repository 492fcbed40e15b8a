//! SSE (Server-Sent Events) stream handling
//!
//! A chat response arrives as frames separated by a blank line:
//! - `data: <payload>` - data payload line(s), JSON or plain text
//! - `: comment` - keep-alive comments (ignored)
//! - `data: [DONE]` - completion sentinel
//!
//! # Module structure
//! - `decoder` - Byte-to-text decoding and frame splitting (Utf8Decoder, FrameSplitter)
//! - `events` - Event type definitions (StreamEvent, SseLine)
//! - `parser` - Frame parsing (FrameParser, parse_frame, parse_sse_line)

mod decoder;
mod events;
mod parser;

// Re-export public types
pub use decoder::{FrameSplitter, Utf8Decoder};
pub use events::{SseLine, StreamEvent};
pub use parser::{parse_frame, parse_sse_line, FrameParser, DEFAULT_DATA_PREFIX, DONE_SENTINEL};
