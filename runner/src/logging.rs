//! Tracing setup for the `phase-runner` binary.
//!
//! The binary keeps two channels apart:
//!
//! - **stdout**: the final shared context as pretty JSON, or the phase list
//!   for `--list`. Nothing else is printed there, so it can be piped.
//! - **stderr**: `tracing` events from [`crate::runner`] (one span per run
//!   and per phase, hook outcomes, the end-of-run status summary) plus the
//!   terminal error chain when the run aborts.
//!
//! Library users install their own subscriber and never call [`init`].

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to `default_filter` when unset.
/// Output: stderr, compact format. Stdout stays reserved for results.
///
/// # Example
/// ```bash
/// RUST_LOG=phase_runner=debug phase-runner --exact double --set n=4
/// ```
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
