//! Chat Stream - assembles streamed chat responses into a live transcript
//!
//! A user message is appended optimistically, the reply is opened as an
//! SSE-style byte stream, and every text delta is folded into an in-progress
//! assistant message as it arrives.
//!
//! - [`sse`] - incremental UTF-8 decoding, frame splitting and frame parsing
//! - [`controller`] - lifecycle of one stream (idle timeout, cancellation)
//! - [`assembler`] - transcript orchestration with last-send-wins semantics
//! - [`traits`] / [`adapters`] - transport and id seams with production and mock implementations

pub mod adapters;
pub mod assembler;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod sse;
pub mod state;
pub mod traits;

pub use assembler::{Assembler, SendReport};
pub use config::StreamConfig;
pub use controller::{StreamController, StreamObserver, StreamState};
pub use error::{StreamError, StreamResult};
pub use models::{Message, MessageId, MessageRole};
pub use state::TranscriptStore;
