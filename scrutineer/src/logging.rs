//! Development-time tracing.
//!
//! Tracing is dev diagnostics only, controlled via `RUST_LOG` and written
//! to stderr. Product output stays separate: report lines go to stdout,
//! warnings to stderr via plain `eprintln!`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing for development logging.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset. Output: stderr, compact.
///
/// # Example
/// ```bash
/// RUST_LOG=scrutineer=debug scrutineer -d a.c out.o
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
