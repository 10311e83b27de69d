//! Structured tracing initialization shared by every binary in the
//! workspace.

use tracing_subscriber::EnvFilter;

/// Initializes a `tracing_subscriber` fmt layer, honoring `RUST_LOG` and
/// falling back to `info` for everything when it is unset.
///
/// Call once, as early as possible in `main`. Calling it twice in the same
/// process panics, matching `tracing_subscriber`'s own global-subscriber
/// guarantee.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();
}
