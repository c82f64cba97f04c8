use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// The level comes from `RUST_LOG` (default `info`), e.g.
/// `RUST_LOG=exam_seating=debug` to see every allocation attempt.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Debug-level subscriber for tests; safe to call repeatedly.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
