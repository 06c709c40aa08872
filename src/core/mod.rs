//! Core logger types and traits

mod async_dispatch;
pub mod config;
pub mod error;
pub mod field;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod sampling;
pub mod sink;
mod sync_dispatch;

pub use config::{
    LogTarget, LoggerConfig, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BACKUP_FILES, DEFAULT_MAX_FILE_SIZE,
};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::{LoggerMetrics, MetricEvent, MetricsObserver};
pub use output_format::{Capabilities, OutputFormat};
pub use sampling::LogSampler;
pub use sink::Sink;
