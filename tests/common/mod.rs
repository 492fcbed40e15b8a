//! Common test utilities for integration tests.
//!
//! Fixtures for building assemblers over scripted transports and for the
//! frame sequences used across several tests.
//!
//! # Example
//!
//! ```ignore
//! use common::{crankshaft_script, TestAssemblerBuilder};
//!
//! let (asm, transport) = TestAssemblerBuilder::new()
//!     .with_stream(crankshaft_script())
//!     .build();
//! ```

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chat_stream::adapters::mock::{MockTransport, SequentialIds, StreamScript};
use chat_stream::{Assembler, MessageRole, StreamConfig};

/// Session id used by tests that don't care about it
pub const TEST_SESSION: &str = "42";

/// `The crankshaft` in two deltas, then the sentinel
pub fn crankshaft_script() -> StreamScript {
    StreamScript::frames(["data: The\n\n", "data:  crankshaft\n\n", "data: [DONE]\n\n"])
}

/// Builder for an assembler over a [`MockTransport`].
pub struct TestAssemblerBuilder {
    transport: MockTransport,
    config: StreamConfig,
}

impl TestAssemblerBuilder {
    pub fn new() -> Self {
        Self {
            transport: MockTransport::new(),
            config: StreamConfig::default(),
        }
    }

    /// Queue a scripted stream
    pub fn with_stream(self, script: StreamScript) -> Self {
        self.transport.push_stream(script);
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_idle_timeout(timeout);
        self
    }

    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }

    pub fn build(self) -> (Arc<Assembler<MockTransport>>, MockTransport) {
        let asm = Assembler::new(
            self.transport.clone(),
            self.config,
            SequentialIds::new("msg"),
        );
        (Arc::new(asm), self.transport)
    }
}

impl Default for TestAssemblerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `(role, content)` pairs of the transcript, in order
pub fn transcript<T: chat_stream::traits::StreamTransport>(
    asm: &Assembler<T>,
) -> Vec<(MessageRole, String)> {
    asm.snapshot()
        .into_iter()
        .map(|m| (m.role, m.content))
        .collect()
}
