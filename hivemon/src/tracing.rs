//! Tracing initialization and convenience re-exports.
//!
//! Modules import the level macros through [`prelude`] so call sites
//! stay uniform across the crate.

/// Level macros used throughout the crate.
pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Install the global subscriber.
///
/// Honors `RUST_LOG`; defaults to `info` when unset.
pub fn init() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
