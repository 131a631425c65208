//! Diagnostics emitted by this crate and helpers for consuming them.
//!
//! The library itself only emits `tracing` events:
//!
//! - `debug` when the process-wide render configuration is replaced
//! - `debug` when decoding falls back from a node to a plain reason
//!
//! Binaries that want to see them call [`init_subscriber`]. Tests capture
//! them in memory with [`capture_logs`].

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

/// Initialize the global tracing subscriber with stderr output.
///
/// Entry point for downstream binaries; the library never calls it.
///
/// `RUST_LOG` takes precedence over `level` when set. Subsequent calls are
/// no-ops.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init fails only when a global subscriber already exists
    let _ = subscriber.try_init();
}
