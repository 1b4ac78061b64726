//! Console logging setup for the oradump binary.
//!
//! Per-schema log files are product output and live in [`crate::output`];
//! this module only configures the `tracing` subscriber used for console
//! diagnostics.

use crate::Result;
use crate::error::DumpError;
use tracing_subscriber::EnvFilter;

/// Maps the CLI verbosity flags to a tracing level.
pub const fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Installs the console `tracing` subscriber.
///
/// `RUST_LOG`, when set and valid, takes precedence over the flags;
/// otherwise `verbose` selects INFO, DEBUG or TRACE and `quiet` limits
/// output to errors.
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set.
///
/// # Example
/// ```rust,no_run
/// use oradump_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet).as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| DumpError::configuration(format!("Failed to initialize logging: {e}")))
}
