//! Upstream streaming endpoint abstraction.

use async_trait::async_trait;

use super::http::{ByteStream, HttpError};

/// Opens a one-shot streaming response for a user utterance in a session.
///
/// The returned body is a sequence of blank-line-delimited frames. It ends
/// either when the transport closes or with a `[DONE]` sentinel frame.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn open(&self, session_id: &str, text: &str) -> Result<ByteStream, HttpError>;
}

#[async_trait]
impl<T: StreamTransport + ?Sized> StreamTransport for std::sync::Arc<T> {
    async fn open(&self, session_id: &str, text: &str) -> Result<ByteStream, HttpError> {
        (**self).open(session_id, text).await
    }
}
