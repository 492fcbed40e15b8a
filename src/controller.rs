//! Lifecycle of one outstanding response stream.
//!
//! A [`StreamController`] opens the stream, drives the read loop, applies the
//! idle timeout, honours cancellation and classifies how the stream ended.
//!
//! ```text
//! Idle -> Opening -> Streaming -> Completed
//!            |           |
//!            +-----------+--> Cancelled | TimedOut | Failed
//! ```

use futures_util::StreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::StreamConfig;
use crate::error::{StreamError, StreamResult};
use crate::sse::{FrameParser, FrameSplitter, StreamEvent, Utf8Decoder};
use crate::traits::StreamTransport;

/// Lifecycle state of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamState {
    #[default]
    Idle,
    Opening,
    Streaming,
    Completed,
    Cancelled,
    TimedOut,
    Failed,
}

impl StreamState {
    /// Whether no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamState::Completed
                | StreamState::Cancelled
                | StreamState::TimedOut
                | StreamState::Failed
        )
    }

    /// Whether a stream is outstanding (drives the typing indicator)
    pub fn is_active(&self) -> bool {
        matches!(self, StreamState::Opening | StreamState::Streaming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Opening => "opening",
            StreamState::Streaming => "streaming",
            StreamState::Completed => "completed",
            StreamState::Cancelled => "cancelled",
            StreamState::TimedOut => "timed_out",
            StreamState::Failed => "failed",
        }
    }

    /// Terminal state for the result of a run
    fn from_result(result: &StreamResult<()>) -> Self {
        match result {
            Ok(()) => StreamState::Completed,
            Err(StreamError::Cancelled) => StreamState::Cancelled,
            Err(StreamError::Timeout { .. }) => StreamState::TimedOut,
            Err(StreamError::OpenFailure { .. }) | Err(StreamError::TransportFailure { .. }) => {
                StreamState::Failed
            }
        }
    }
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives the controller's transitions and parsed deltas.
pub trait StreamObserver {
    /// Called on every transition, terminal ones included.
    fn on_state(&mut self, state: StreamState);

    /// Fold one delta into the transcript.
    ///
    /// Returning false means this stream is no longer the active one; the
    /// controller then stops as cancelled without folding anything else.
    fn on_delta(&mut self, delta: &str) -> bool;
}

/// What the read loop should do after folding a batch of frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
    Superseded,
}

/// Drives exactly one stream; consumed by [`StreamController::run`].
#[derive(Debug)]
pub struct StreamController {
    generation: u64,
    cancel: CancellationToken,
    idle_timeout: Duration,
    parser: FrameParser,
}

impl StreamController {
    pub fn new(generation: u64, config: &StreamConfig) -> Self {
        Self {
            generation,
            cancel: CancellationToken::new(),
            idle_timeout: config.idle_timeout,
            parser: config.frame_parser(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token that aborts this stream when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Open the stream and read it to a terminal state.
    ///
    /// The transport handle is dropped before the terminal state is reported.
    pub async fn run<T, O>(
        self,
        transport: &T,
        session_id: &str,
        text: &str,
        observer: &mut O,
    ) -> StreamResult<()>
    where
        T: StreamTransport + ?Sized,
        O: StreamObserver + Send,
    {
        let generation = self.generation;
        debug!(generation, session_id, "Stream opening");
        observer.on_state(StreamState::Opening);

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return self.finish(Err(StreamError::Cancelled), session_id, observer);
            }
            opened = tokio::time::timeout(self.idle_timeout, transport.open(session_id, text)) => opened,
        };

        let mut stream = match opened {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return self.finish(Err(StreamError::open_failure(e)), session_id, observer);
            }
            Err(_) => {
                let err = self.timeout_error();
                return self.finish(Err(err), session_id, observer);
            }
        };

        info!(generation, session_id, "Stream established");
        observer.on_state(StreamState::Streaming);

        let mut decoder = Utf8Decoder::new();
        let mut splitter = FrameSplitter::new();

        let result = loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break Err(StreamError::Cancelled),
                next = tokio::time::timeout(self.idle_timeout, stream.next()) => next,
            };

            match next {
                Ok(Some(Ok(bytes))) => {
                    let text = decoder.feed(&bytes);
                    match self.fold_frames(splitter.push(&text), observer) {
                        Flow::Continue => {}
                        Flow::Done => {
                            // Whatever follows the sentinel is discarded
                            let _ = decoder.feed_final();
                            break Ok(());
                        }
                        Flow::Superseded => break Err(StreamError::Cancelled),
                    }
                }
                Ok(Some(Err(e))) => break Err(StreamError::transport_failure(e)),
                Ok(None) => {
                    let tail = decoder.feed_final();
                    let mut frames = splitter.push(&tail);
                    frames.extend(splitter.finish());
                    match self.fold_frames(frames, observer) {
                        Flow::Superseded => break Err(StreamError::Cancelled),
                        Flow::Continue | Flow::Done => break Ok(()),
                    }
                }
                Err(_) => break Err(self.timeout_error()),
            }
        };

        drop(stream);
        self.finish(result, session_id, observer)
    }

    /// Parse frames in order and fold their deltas, stopping at `Done`
    fn fold_frames<O: StreamObserver>(&self, frames: Vec<String>, observer: &mut O) -> Flow {
        for frame in frames {
            let event = self.parser.parse(&frame);
            trace!(
                generation = self.generation,
                event = event.event_type_name(),
                "Frame parsed"
            );
            if event.is_terminal() {
                return Flow::Done;
            }
            if let StreamEvent::TextDelta(delta) = event {
                if !observer.on_delta(&delta) {
                    return Flow::Superseded;
                }
            }
        }
        Flow::Continue
    }

    fn timeout_error(&self) -> StreamError {
        StreamError::Timeout {
            duration_secs: self.idle_timeout.as_secs(),
        }
    }

    fn finish<O: StreamObserver>(
        &self,
        result: StreamResult<()>,
        session_id: &str,
        observer: &mut O,
    ) -> StreamResult<()> {
        let state = StreamState::from_result(&result);
        let generation = self.generation;

        match &result {
            Ok(()) => info!(generation, session_id, "Stream completed"),
            Err(StreamError::Cancelled) => debug!(generation, session_id, "Stream cancelled"),
            Err(e) => warn!(
                generation,
                session_id,
                code = e.error_code(),
                "Stream ended: {}",
                e
            ),
        }

        observer.on_state(state);
        result
    }
}
