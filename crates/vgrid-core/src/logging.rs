#![forbid(unsafe_code)]

//! Logging support.
//!
//! Every stage reports through `tracing`. Hosts that do not install their
//! own subscriber can enable the `subscriber` feature and call [`init`].

/// Install a fmt subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "subscriber")]
pub fn init() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
