//! An interface to the engine's internal logging facilities. This module
//! (re)exports the five logging macros: `error!`, `warn!`, `info!`, `debug!`
//! and `trace!` where `error!` represents the highest-priority log messages
//! and `trace!` the lowest.
//!
//! Logging is _disabled_ by default. Log messages are enabled/disabled using
//! the functions:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with
//!    priority at least `level`

pub use log::{debug, error, info, trace, warn, LevelFilter};

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Enables the logger with no global level filter / full logging. Equivalent
/// to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to
/// `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A filter level of `LevelFilter::Off` disables
/// logging.
///
/// The global logger can only be installed once per process; subsequent calls
/// adjust the maximum level on the already-installed logger.
pub fn set_log_level(level: LevelFilter) {
    INIT_LOGGER.call_once(|| {
        // The installed logger passes everything; the max level set below is
        // the single knob that filters messages.
        let logger = env_logger::Builder::new()
            .filter_level(LevelFilter::Trace)
            .build();
        // Ignore the error if another logger beat us to installation; the
        // host application keeps control of its own logging in that case.
        let _ = log::set_boxed_logger(Box::new(logger));
    });
    log::set_max_level(level);
}
