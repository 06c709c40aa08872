//! # Rust Log Engine
//!
//! A structured logging engine with level filtering, deterministic sampling
//! and three wire formats, writing to the console or to size-rotated files
//! either inline or through a background writer thread.
//!
//! ## Features
//!
//! - **Structured Fields**: ordered typed key/value pairs on every entry
//! - **Text, JSON and Binary Frames**: one encoder per format, chosen at runtime
//! - **Rotating Files**: numbered backups with optional gzip compression
//! - **Async Mode**: producers never touch the sink; nothing queued is lost on shutdown
//! - **Metrics**: lock-free counters with an optional push observer
//!
//! ## Example
//!
//! ```no_run
//! use rust_log_engine::prelude::*;
//!
//! let config = LoggerConfig {
//!     format: OutputFormat::Json,
//!     async_mode: true,
//!     ..LoggerConfig::file("/var/log/app.log")
//! };
//! let logger = Logger::new(config)?;
//! logger.info("listening", &[Field::new("port", 8080u32)]);
//! logger.shutdown();
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod encoders;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Capabilities, Field, FieldValue, LogEntry, LogLevel, LogTarget, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerMetrics, OutputFormat, Result, Sink,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, RotationPolicy};
}

pub use core::{
    Capabilities, Field, FieldValue, LogEntry, LogLevel, LogSampler, LogTarget, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, MetricEvent, MetricsObserver,
    OutputFormat, Result, Sink,
};
pub use sinks::{ConsoleSink, ConsoleStream, FileSink, RotationPolicy};
