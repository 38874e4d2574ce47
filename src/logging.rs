// ==========================================
// Logging initialisation
// ==========================================
// tracing + tracing-subscriber
// Level comes from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the human-readable subscriber
///
/// # Environment
/// - RUST_LOG: filter directive (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=fieldwork_costing::engine=trace
///
/// # Example
/// ```no_run
/// use fieldwork_costing::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Install a JSON-lines subscriber for headless batch runs
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_current_span(true)
        .init();
}

/// Test subscriber at debug level; safe to call repeatedly
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
