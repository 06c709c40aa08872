//! Process-wide logger handle
//!
//! Nothing is installed until [`init`] is called, and [`shutdown`] removes
//! it again. Code that can take a [`Logger`] by reference should do so; this
//! module exists for call sites that cannot.
//!
//! # Example
//!
//! ```no_run
//! use rust_log_engine::{global, LogLevel, LoggerConfig};
//!
//! global::init(LoggerConfig::default()).unwrap();
//! global::log(LogLevel::Info, "service up", &[]);
//!
//! // Hot reload: the old logger drains before it is released
//! global::replace(LoggerConfig { level: LogLevel::Debug, ..LoggerConfig::default() }).unwrap();
//!
//! global::shutdown();
//! ```

use crate::core::{Field, LogLevel, Logger, LoggerConfig, LoggerError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL: RwLock<Option<Arc<Logger>>> = parking_lot::const_rwlock(None);

/// Install a logger built from `config`.
///
/// # Errors
///
/// Returns [`LoggerError::AlreadyInitialized`] if a logger is installed, or
/// any error from [`Logger::new`].
pub fn init(config: LoggerConfig) -> Result<()> {
    let mut slot = GLOBAL.write();
    if slot.is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    *slot = Some(Arc::new(Logger::new(config)?));
    Ok(())
}

/// Install an already built logger
pub fn install(logger: Logger) -> Result<()> {
    let mut slot = GLOBAL.write();
    if slot.is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    *slot = Some(Arc::new(logger));
    Ok(())
}

/// Build a logger from `config`, swap it in, then shut the previous one down.
///
/// The new logger is built before anything is swapped, so a bad
/// configuration leaves the current logger in place. Callers still holding
/// the previous logger through [`logger`] see their entries counted as
/// dropped once it has shut down.
pub fn replace(config: LoggerConfig) -> Result<()> {
    let next = Arc::new(Logger::new(config)?);
    let previous = GLOBAL.write().replace(next);
    if let Some(previous) = previous {
        previous.shutdown();
    }
    Ok(())
}

/// Remove the installed logger and shut it down. Does nothing if none is
/// installed.
pub fn shutdown() {
    let previous = GLOBAL.write().take();
    if let Some(previous) = previous {
        previous.shutdown();
    }
}

/// Handle to the installed logger, if any
pub fn logger() -> Option<Arc<Logger>> {
    GLOBAL.read().clone()
}

pub fn is_initialized() -> bool {
    GLOBAL.read().is_some()
}

/// Log through the installed logger. Does nothing if none is installed.
pub fn log(level: LogLevel, message: &str, fields: &[Field]) {
    if let Some(logger) = GLOBAL.read().as_ref() {
        logger.log(level, message, fields);
    }
}
