//! Mock streaming HTTP client.
//!
//! Routes are matched by URL prefix, longest first, so one route can serve
//! every session under `/v1/sessions/` while a more specific one overrides a
//! single session. Every POST is recorded for later inspection.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A POST the mock received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPost {
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

impl RecordedPost {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Body parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// What a route answers with
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Body delivered as these chunks, then closed
    Chunks(Vec<Bytes>),
    /// Rejected before any body byte
    Error(HttpError),
}

impl MockResponse {
    /// SSE body with each frame delivered as its own chunk
    pub fn sse<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        MockResponse::Chunks(
            frames
                .into_iter()
                .map(|frame| Bytes::copy_from_slice(frame.as_ref().as_bytes()))
                .collect(),
        )
    }

    /// Non-2xx answer
    pub fn status(status: u16, message: &str) -> Self {
        MockResponse::Error(HttpError::ServerError {
            status,
            message: message.to_string(),
        })
    }
}

/// Mock [`HttpClient`]; clones share routes and recorded posts.
///
/// ```ignore
/// let http = MockHttpClient::new();
/// http.route("http://localhost:8000/v1/sessions/", MockResponse::sse(["data: hi\n\n"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    routes: Arc<Mutex<Vec<(String, MockResponse)>>>,
    posts: Arc<Mutex<Vec<RecordedPost>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every URL starting with `prefix`; an empty prefix matches everything.
    pub fn route(&self, prefix: &str, response: MockResponse) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|(p, _)| p != prefix);
        routes.push((prefix.to_string(), response));
        routes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Every POST received, in order
    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> Option<MockResponse> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.posts.lock().unwrap().push(RecordedPost {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });

        match self.lookup(url) {
            Some(MockResponse::Chunks(chunks)) => {
                Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
            }
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::ServerError {
                status: 404,
                message: format!("no route for {}", url),
            }),
        }
    }
}
