//! Logging init: tracing to stderr with env-based filtering.

use tracing_subscriber::EnvFilter;

/// Initialize stderr logging. Safe to call more than once; later calls
/// are no-ops.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,conveyor=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
