//! Tracing setup for binaries and tests embedding the assembler.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host application. [`init_tracing`] is a convenience for hosts
//! that have none.

use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter, checked before `RUST_LOG`
pub const LOG_LEVEL_ENV: &str = "CHAT_STREAM_LOG";

/// Resolve the filter from `CHAT_STREAM_LOG`, then `RUST_LOG`, then `default_filter`.
pub fn resolve_filter(default_filter: &str) -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a stderr fmt subscriber.
///
/// Returns false if a global subscriber was already set, so repeated calls
/// (e.g. from several tests) are harmless.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(resolve_filter(default_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok()
}
