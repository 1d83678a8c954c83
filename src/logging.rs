//! Tracing/logging initialization.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for command
//! output.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Initialize tracing for the process.
///
/// `RUST_LOG` wins over `[logging].filter`. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
