//! Chat response assembler.
//!
//! Orchestrates sending a user message: optimistic user entry, opening the
//! response stream, creating the assistant placeholder and folding deltas
//! into it. A new send always supersedes the previous stream (last send wins).
//!
//! All transcript mutation and the stream identity check happen under one
//! lock, so a delta from a superseded stream can never land in the transcript.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::{ReqwestHttpClient, SessionStreamClient, UuidIdGenerator};
use crate::config::StreamConfig;
use crate::controller::{StreamController, StreamObserver, StreamState};
use crate::error::StreamError;
use crate::models::{Message, MessageId};
use crate::state::TranscriptStore;
use crate::traits::{IdGenerator, StreamTransport};

/// The stream currently allowed to fold into the transcript
#[derive(Debug)]
struct ActiveStream {
    generation: u64,
    cancel: CancellationToken,
    /// Assistant placeholder, once the stream reached `Streaming`
    fold_target: Option<MessageId>,
}

#[derive(Debug)]
struct Inner {
    transcript: TranscriptStore,
    /// Bumped on every send and every abort
    generation: u64,
    active: Option<ActiveStream>,
    last_error: Option<StreamError>,
}

/// Outcome of one [`Assembler::send_message`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub user_message_id: MessageId,
    /// Set once the stream reached `Streaming`
    pub assistant_message_id: Option<MessageId>,
    /// Terminal state of this send's stream
    pub state: StreamState,
    pub error: Option<StreamError>,
}

impl SendReport {
    pub fn is_completed(&self) -> bool {
        self.state == StreamState::Completed
    }

    /// Error worth showing to the user (cancellation is silent)
    pub fn user_visible_error(&self) -> Option<&StreamError> {
        self.error.as_ref().filter(|e| e.is_user_visible())
    }
}

/// Assembles streamed responses into a session transcript.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct Assembler<T> {
    transport: T,
    config: StreamConfig,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<StreamState>,
    revision_tx: watch::Sender<u64>,
}

impl Assembler<SessionStreamClient<ReqwestHttpClient>> {
    /// Assembler talking to the configured backend over HTTP
    pub fn connect(config: StreamConfig) -> Self {
        let transport = SessionStreamClient::new(ReqwestHttpClient::new(), config.clone());
        Self::new(transport, config, UuidIdGenerator::new())
    }
}

impl<T: StreamTransport> Assembler<T> {
    pub fn new(transport: T, config: StreamConfig, ids: impl IdGenerator + 'static) -> Self {
        let (state_tx, _) = watch::channel(StreamState::Idle);
        let (revision_tx, _) = watch::channel(0);
        Self {
            transport,
            config,
            inner: Mutex::new(Inner {
                transcript: TranscriptStore::new(ids),
                generation: 0,
                active: None,
                last_error: None,
            }),
            state_tx,
            revision_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `text` to `session_id` and assemble the streamed reply.
    ///
    /// Returns `None` without side effects when the text is empty or
    /// whitespace, or when there is no session. Otherwise resolves once this
    /// send's stream reaches a terminal state, including being superseded by
    /// a later send.
    pub async fn send_message(&self, text: &str, session_id: Option<&str>) -> Option<SendReport> {
        if text.trim().is_empty() {
            debug!("Ignoring empty message");
            return None;
        }
        let Some(session_id) = session_id.filter(|s| !s.trim().is_empty()) else {
            debug!("Ignoring message without a session");
            return None;
        };

        let (controller, user_message_id) = {
            let mut inner = self.lock();
            if self.abort_active(&mut inner) {
                info!("Superseding previous stream");
            }

            inner.generation += 1;
            let controller = StreamController::new(inner.generation, &self.config);
            let user_message_id = inner.transcript.append_user(text);
            inner.active = Some(ActiveStream {
                generation: controller.generation(),
                cancel: controller.cancel_token(),
                fold_target: None,
            });
            inner.last_error = None;
            self.publish_revision(&inner);
            (controller, user_message_id)
        };

        let generation = controller.generation();
        let mut fold = Fold {
            inner: &self.inner,
            state_tx: &self.state_tx,
            revision_tx: &self.revision_tx,
            generation,
            assistant_id: None,
            state: StreamState::Idle,
        };

        let result = controller
            .run(&self.transport, session_id, text, &mut fold)
            .await;
        let error = result.err();

        if let Some(err) = error.as_ref().filter(|e| e.is_user_visible()) {
            let mut inner = self.lock();
            if inner.generation == generation {
                inner.last_error = Some(err.clone());
            }
        }

        Some(SendReport {
            user_message_id,
            assistant_message_id: fold.assistant_id.take(),
            state: fold.state,
            error,
        })
    }

    /// Cancel the active stream, keeping any partial content.
    ///
    /// Returns false when nothing was streaming.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        let cancelled = self.abort_active(&mut inner);
        if cancelled {
            info!("Stream cancelled by user");
        }
        cancelled
    }

    /// Stop the active stream so nothing it still delivers is folded.
    fn abort_active(&self, inner: &mut Inner) -> bool {
        let Some(active) = inner.active.take() else {
            return false;
        };
        active.cancel.cancel();
        inner.generation += 1;
        if let Some(id) = active.fold_target {
            inner.transcript.finish_in_progress(&id);
        }
        debug!(generation = active.generation, "Aborted stream");
        self.state_tx.send_replace(StreamState::Cancelled);
        true
    }

    /// Replace the transcript, cancelling any active stream first
    pub fn replace_transcript(&self, messages: Vec<Message>) {
        let mut inner = self.lock();
        self.abort_active(&mut inner);
        inner.transcript.replace_all(messages);
        self.publish_revision(&inner);
    }

    /// Clear the transcript, cancelling any active stream first
    pub fn clear_transcript(&self) {
        let mut inner = self.lock();
        self.abort_active(&mut inner);
        inner.transcript.clear();
        self.publish_revision(&inner);
    }

    /// Append a system notice
    pub fn append_system(&self, text: &str) -> MessageId {
        let mut inner = self.lock();
        let id = inner.transcript.append_system(text);
        self.publish_revision(&inner);
        id
    }

    pub fn state(&self) -> StreamState {
        *self.state_tx.borrow()
    }

    /// Watch lifecycle transitions of the current stream
    pub fn subscribe_state(&self) -> watch::Receiver<StreamState> {
        self.state_tx.subscribe()
    }

    /// Whether a stream is opening or streaming
    pub fn is_streaming(&self) -> bool {
        self.state().is_active()
    }

    /// Owned copy of the transcript
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().transcript.snapshot()
    }

    /// Watch the transcript revision; it changes on every mutation
    pub fn subscribe_transcript(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    /// Id of the assistant message currently receiving deltas
    pub fn in_progress_id(&self) -> Option<MessageId> {
        self.lock().transcript.in_progress().map(str::to_string)
    }

    /// Most recent user-visible failure of the current stream
    pub fn last_error(&self) -> Option<StreamError> {
        self.lock().last_error.clone()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn publish_revision(&self, inner: &Inner) {
        self.revision_tx.send_replace(inner.transcript.revision());
    }
}

impl<T> std::fmt::Debug for Assembler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembler")
            .field("config", &self.config)
            .field("state", &*self.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

/// Folds one send's stream into the shared transcript.
///
/// Every callback first checks that its generation is still current; a
/// superseded stream neither mutates the transcript nor publishes state.
struct Fold<'a> {
    inner: &'a Mutex<Inner>,
    state_tx: &'a watch::Sender<StreamState>,
    revision_tx: &'a watch::Sender<u64>,
    generation: u64,
    assistant_id: Option<MessageId>,
    state: StreamState,
}

impl Fold<'_> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Fold<'_> {
    /// Release the stream when the send future is dropped before a terminal state.
    fn drop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        let mut inner = self.lock();
        if inner.generation != self.generation {
            return;
        }

        if let Some(active) = inner.active.take() {
            active.cancel.cancel();
            if let Some(id) = active.fold_target {
                inner.transcript.finish_in_progress(&id);
            }
        }
        inner.generation += 1;
        debug!(generation = self.generation, "Send dropped before the stream ended");
        self.state_tx.send_replace(StreamState::Cancelled);
    }
}

impl StreamObserver for Fold<'_> {
    fn on_state(&mut self, state: StreamState) {
        self.state = state;

        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.generation != self.generation {
            return;
        }

        match state {
            StreamState::Streaming => {
                let id = inner.transcript.append_empty_assistant_placeholder();
                if let Some(active) = inner.active.as_mut() {
                    active.fold_target = Some(id.clone());
                }
                self.assistant_id = Some(id);
                self.revision_tx.send_replace(inner.transcript.revision());
            }
            s if s.is_terminal() => {
                if let Some(id) = &self.assistant_id {
                    inner.transcript.finish_in_progress(id);
                }
                inner.active = None;
            }
            _ => {}
        }

        self.state_tx.send_replace(state);
    }

    fn on_delta(&mut self, delta: &str) -> bool {
        let Some(id) = self.assistant_id.clone() else {
            return false;
        };
        let mut inner = self.lock();
        if inner.generation != self.generation {
            return false;
        }
        if inner.transcript.append_delta(&id, delta) {
            self.revision_tx.send_replace(inner.transcript.revision());
        }
        true
    }
}
