//! Scripted stream transport for testing the controller and assembler.
//!
//! Each call to [`StreamTransport::open`] consumes the next queued script.
//! Scripts can interleave chunks with delays, errors and a never-ending stall,
//! which makes idle timeouts and supersession testable under tokio's paused clock.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{ByteStream, HttpError, StreamTransport};

#[derive(Debug, Clone)]
enum Step {
    Chunk(Bytes),
    Delay(Duration),
    Error(HttpError),
    Stall,
}

/// Script for one response stream.
#[derive(Debug, Clone, Default)]
pub struct StreamScript {
    steps: Vec<Step>,
}

impl StreamScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script that yields each frame as its own chunk and then closes
    pub fn frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        frames
            .into_iter()
            .fold(Self::new(), |script, frame| script.chunk(frame.as_ref()))
    }

    /// Yield a text chunk
    pub fn chunk(self, text: &str) -> Self {
        self.bytes(text.as_bytes())
    }

    /// Yield raw bytes (may split code points)
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.steps.push(Step::Chunk(Bytes::copy_from_slice(bytes)));
        self
    }

    /// Wait before the next step
    pub fn delay(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Delay(duration));
        self
    }

    /// Yield a read error
    pub fn error(mut self, err: HttpError) -> Self {
        self.steps.push(Step::Error(err));
        self
    }

    /// Never yield again and never close
    pub fn stall(mut self) -> Self {
        self.steps.push(Step::Stall);
        self
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Stream(StreamScript),
    Fail(HttpError),
    Hang,
}

/// Counts live streams; decremented when the stream is dropped.
#[derive(Debug)]
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock transport serving queued scripts in order.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    queue: Arc<Mutex<VecDeque<Scripted>>>,
    opened: Arc<Mutex<Vec<(String, String)>>>,
    live: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a stream for the next `open`
    pub fn push_stream(&self, script: StreamScript) -> &Self {
        self.queue.lock().unwrap().push_back(Scripted::Stream(script));
        self
    }

    /// Queue an open failure
    pub fn push_open_error(&self, err: HttpError) -> &Self {
        self.queue.lock().unwrap().push_back(Scripted::Fail(err));
        self
    }

    /// Queue an open that never completes
    pub fn push_hanging_open(&self) -> &Self {
        self.queue.lock().unwrap().push_back(Scripted::Hang);
        self
    }

    /// Every `(session_id, text)` pair that was opened, in order
    pub fn opened(&self) -> Vec<(String, String)> {
        self.opened.lock().unwrap().clone()
    }

    /// Streams handed out and not yet dropped
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamTransport for MockTransport {
    async fn open(&self, session_id: &str, text: &str) -> Result<ByteStream, HttpError> {
        self.opened
            .lock()
            .unwrap()
            .push((session_id.to_string(), text.to_string()));

        let scripted = self.queue.lock().unwrap().pop_front();
        let script = match scripted {
            Some(Scripted::Stream(script)) => script,
            Some(Scripted::Fail(err)) => return Err(err),
            Some(Scripted::Hang) => return futures::future::pending().await,
            None => {
                return Err(HttpError::Other(format!(
                    "No scripted stream for session {}",
                    session_id
                )))
            }
        };

        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(self.live.clone());
        let steps: VecDeque<Step> = script.steps.into();

        let stream = futures::stream::unfold((steps, guard), |(mut steps, guard)| async move {
            loop {
                match steps.pop_front()? {
                    Step::Chunk(bytes) => return Some((Ok(bytes), (steps, guard))),
                    Step::Error(err) => return Some((Err(err), (steps, guard))),
                    Step::Delay(duration) => tokio::time::sleep(duration).await,
                    Step::Stall => futures::future::pending::<()>().await,
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
