//! Tracing setup shared by the ledger binaries.

/// Initialize process-wide tracing with the defaults (`RUST_LOG`, else `info`; JSON output).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&tracing::TracingConfig::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, TracingConfig};
