//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - Streaming HTTP POST
//! - [`StreamTransport`] - Opens a session-scoped response stream
//! - [`IdGenerator`] - Produces ids for locally created messages

pub mod http;
pub mod ids;
pub mod transport;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
pub use ids::IdGenerator;
pub use transport::StreamTransport;
