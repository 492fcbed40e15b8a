//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`SessionStreamClient`] - Session-scoped streaming endpoint over any [`HttpClient`](crate::traits::HttpClient)
//! - [`UuidIdGenerator`] - Random v4 UUID message ids
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable streaming HTTP responses
//! - [`mock::MockTransport`] - Scripted byte streams with delays, errors and stalls
//! - [`mock::SequentialIds`] - Predictable message ids

pub mod mock;
pub mod reqwest_http;
pub mod session_stream;
pub mod uuid_ids;

pub use mock::{MockHttpClient, MockTransport, SequentialIds};
pub use reqwest_http::ReqwestHttpClient;
pub use session_stream::SessionStreamClient;
pub use uuid_ids::UuidIdGenerator;
