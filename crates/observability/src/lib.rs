//! Process-wide tracing setup shared by the binaries and black-box tests.

pub mod tracing;

pub use crate::tracing::{DEFAULT_DIRECTIVE, LogFormat};

/// Initialize JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Human-readable logs routed through the test harness's capture.
pub fn init_for_tests() {
    tracing::init(LogFormat::Test);
}
