//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable streaming responses
//! - [`MockTransport`] - Scripted response streams for the assembler
//! - [`SequentialIds`] - Deterministic message ids

pub mod http;
pub mod ids;
pub mod transport;

pub use http::MockHttpClient;
pub use ids::SequentialIds;
pub use transport::{MockTransport, StreamScript};
