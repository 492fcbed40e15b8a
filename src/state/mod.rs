//! Conversation state management
//!
//! - TranscriptStore: ordered messages of one session with a single
//!   in-progress assistant slot that receives streamed deltas

pub mod transcript;

pub use transcript::TranscriptStore;
