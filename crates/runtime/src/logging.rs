//! Diagnostic logging setup
//!
//! The runtime reports through `tracing`: task spawn/exit and pump
//! lifecycle at `debug`, unimplemented operations at `warn`, task failures at
//! `error`. Hosts that don't install their own subscriber can call `init`.

use tracing_subscriber::EnvFilter;

/// Env var holding the filter directives (same syntax as `RUST_LOG`)
pub const LOG_ENV: &str = "BLACKLIGHT_LOG";

const DEFAULT_DIRECTIVE: &str = "blacklight_runtime=info";

/// Install a stderr fmt subscriber filtered by `BLACKLIGHT_LOG`.
///
/// Safe to call more than once. The first subscriber installed in the
/// process wins; if one already exists this returns false.
pub fn init() -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
