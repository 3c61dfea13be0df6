//! Logging setup using **tracing**.
//!
//! Logs go to stderr so stdout stays clean for reports. Filtering follows
//! `RUST_LOG` (e.g. `RUST_LOG=codelens=debug`) and defaults to warnings,
//! which surfaces every file that fell back to pattern extraction.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Initializes the global tracing subscriber.
///
/// Call this once at startup. `json` switches to machine-readable output.
/// A second call is a no-op.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_ansi(false)
            .with_level(true)
            .with_target(true)
            .with_current_span(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    // already installed, e.g. by a test harness
    let _ = result;
}
