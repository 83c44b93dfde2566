//! Logging infrastructure
//!
//! Re-exports the standard log macros and wires up `env_logger` as the
//! backend. Applications call one of the init functions once at startup.

pub use log::{debug, error, info, trace, warn};

/// Initialize logging from the `RUST_LOG` environment variable
pub fn init() {
    env_logger::init();
}

/// Initialize logging at an explicit level, overriding the environment
///
/// Unrecognized level names fall back to `info`.
pub fn init_with_level(level: &str) {
    let filter = level.parse().unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .init();
}
