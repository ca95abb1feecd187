//! Structured logging with run context.
//!
//! Provides the context prefix and the one-time logger initialisation used
//! by the binary.

pub mod structured;

pub use structured::*;

/// Initialize the process-wide logger.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(level: log::LevelFilter) {
    let _ = env_logger::builder()
        .filter_level(level)
        .format_timestamp_millis()
        .try_init();
}
