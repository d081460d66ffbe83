//! Logging configuration and initialization
//!
//! Progress is reported through `tracing`; logs always go to stderr so that
//! `--json` output on stdout stays machine-readable.

use tracing::{debug, trace};

/// Filter directive for the given verbosity.
///
/// `RUST_LOG` wins when set. Otherwise `quiet` (JSON mode) starts at `warn`
/// and the default text mode at `info`; each `-v` goes one level further.
pub fn log_filter(verbose: u8, quiet: bool, rust_log: Option<&str>) -> String {
    if let Some(filter) = rust_log.filter(|f| !f.trim().is_empty()) {
        return filter.to_string();
    }
    let levels = ["warn", "info", "debug", "trace"];
    let base = if quiet { 0 } else { 1 };
    let level = levels[(base + verbose as usize).min(levels.len() - 1)];
    format!("liftoff={}", level)
}

/// Initialize tracing for the CLI
pub fn init_logging(verbose: u8, quiet: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(verbose, quiet, rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();

    debug!("liftoff started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
