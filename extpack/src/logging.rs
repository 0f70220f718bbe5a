//! Logging setup shared by binaries built on this library.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the caller. `init_logging` is the standard setup: a compact `fmt`
//! layer on stderr, filtered by `RUST_LOG` when set and by the given default
//! level otherwise.

use tracing_subscriber::EnvFilter;

/// Default filter used when neither `RUST_LOG` nor a verbosity flag is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed (for example by a
/// test harness), in which case the existing one is kept.
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Pick the default level for a verbosity flag.
pub fn level_for_verbosity(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        DEFAULT_LOG_LEVEL
    }
}
