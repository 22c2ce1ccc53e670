//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing. Embedding services can install their own subscriber;
/// this helper installs an env-filtered fmt subscriber (`RUST_LOG`) if none
/// is set yet, defaulting to `info` for this crate.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("prometheus_campaign=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
