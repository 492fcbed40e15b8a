//! Session-scoped streaming endpoint client.

use async_trait::async_trait;

use crate::config::StreamConfig;
use crate::models::StreamRequest;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, StreamTransport};

/// Opens response streams by POSTing the user text to the session's endpoint.
#[derive(Debug, Clone)]
pub struct SessionStreamClient<C> {
    http: C,
    config: StreamConfig,
    headers: Headers,
}

impl<C: HttpClient> SessionStreamClient<C> {
    pub fn new(http: C, config: StreamConfig) -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        Self {
            http,
            config,
            headers,
        }
    }

    /// Add a header sent with every request (e.g. authorization supplied by the caller)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

#[async_trait]
impl<C: HttpClient> StreamTransport for SessionStreamClient<C> {
    async fn open(&self, session_id: &str, text: &str) -> Result<ByteStream, HttpError> {
        let url = self.config.stream_url(session_id);
        let body = serde_json::to_string(&StreamRequest::new(text))
            .map_err(|e| HttpError::Other(e.to_string()))?;

        tracing::debug!(session_id, url = %url, "Opening response stream");
        self.http.post_stream(&url, &body, &self.headers).await
    }
}
