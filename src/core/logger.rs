//! Main logger implementation

use super::{
    async_dispatch::AsyncDispatcher,
    config::{LogTarget, LoggerConfig},
    error::{LoggerError, Result},
    field::Field,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::{LoggerMetrics, MetricEvent, MetricsObserver},
    output_format::OutputFormat,
    sampling::LogSampler,
    sink::Sink,
    sync_dispatch::SyncDispatcher,
};
use crate::sinks::{ConsoleSink, FileSink, RotationPolicy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

enum Dispatcher {
    Sync(SyncDispatcher),
    Async(AsyncDispatcher),
}

/// Structured logger bound to one sink.
///
/// Every call runs the same pipeline: level filter, sampler, encoder, sink.
/// In async mode the last two happen on a background writer thread.
///
/// # Example
///
/// ```no_run
/// use rust_log_engine::{Field, LogLevel, Logger, LoggerConfig};
///
/// let logger = Logger::new(LoggerConfig::file("/tmp/app.log")).unwrap();
/// logger.info("request served", &[Field::new("status", 200u32), Field::new("path", "/")]);
/// logger.log(LogLevel::Debug, "filtered out at the default level", &[]);
/// logger.shutdown();
/// ```
pub struct Logger {
    level: LogLevel,
    format: OutputFormat,
    sampler: LogSampler,
    metrics: Arc<LoggerMetrics>,
    dispatcher: Dispatcher,
    closed: AtomicBool,
}

impl Logger {
    /// Build a logger writing to the sink named by `config.target`.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the log file cannot be opened,
    /// or the async writer thread cannot be spawned.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Build a logger writing to a caller-supplied sink. `config.target` and
    /// the file settings are ignored.
    pub fn with_sink(config: LoggerConfig, sink: impl Sink + 'static) -> Result<Self> {
        Self::builder().config(config).sink(sink).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn start(
        config: &LoggerConfig,
        sink: Box<dyn Sink>,
        metrics: Arc<LoggerMetrics>,
    ) -> Result<Self> {
        let format = config.format.resolve(&config.capabilities);
        if format != config.format {
            eprintln!(
                "[LOGGER WARNING] Output format '{}' is disabled, falling back to '{}'",
                config.format, format
            );
        }

        let dispatcher = if config.async_mode {
            Dispatcher::Async(AsyncDispatcher::start(
                sink,
                Arc::clone(&metrics),
                config.queue_capacity,
            )?)
        } else {
            Dispatcher::Sync(SyncDispatcher::new(sink, config.buffer_size))
        };

        Ok(Self {
            level: config.level,
            format,
            sampler: LogSampler::new(config.sampling_rate),
            metrics,
            dispatcher,
            closed: AtomicBool::new(false),
        })
    }

    /// Log `message` with `fields` at `level`.
    ///
    /// Never fails: sink and encoder errors are counted in
    /// [`metrics`](Self::metrics) and reported once on stderr.
    pub fn log(&self, level: LogLevel, message: &str, fields: &[Field]) {
        if self.admit(level) {
            self.dispatch(&LogEntry::new(level, message, fields));
        }
    }

    /// Log a prebuilt entry, keeping its timestamp
    pub fn log_entry(&self, entry: &LogEntry<'_>) {
        if self.admit(entry.level) {
            self.dispatch(entry);
        }
    }

    /// Whether `level` passes the level filter. Sampling is not consulted.
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn admit(&self, level: LogLevel) -> bool {
        if !self.is_enabled(level) {
            return false;
        }
        if !self.sampler.should_sample() {
            self.metrics.record(MetricEvent::SampledOut(level));
            return false;
        }
        self.metrics.record(MetricEvent::Accepted(level));
        true
    }

    fn dispatch(&self, entry: &LogEntry<'_>) {
        match &self.dispatcher {
            Dispatcher::Sync(d) => d.dispatch(entry, self.format, &self.metrics),
            Dispatcher::Async(d) => d.dispatch(entry, self.format, &self.metrics),
        }
    }

    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.log(LogLevel::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: &[Field]) {
        self.log(LogLevel::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.log(LogLevel::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: &[Field]) {
        self.log(LogLevel::Error, message, fields);
    }

    pub fn fatal(&self, message: &str, fields: &[Field]) {
        self.log(LogLevel::Fatal, message, fields);
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Format in effect after capability fallback
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_async(&self) -> bool {
        matches!(self.dispatcher, Dispatcher::Async(_))
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Shared handle to the metrics, usable after the logger is gone
    pub fn metrics_handle(&self) -> Arc<LoggerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Get the number of dropped frames
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Push everything logged so far to the sink.
    ///
    /// In async mode this waits for the writer thread to catch up; the
    /// writer flushes the sink itself when it stops.
    pub fn flush(&self) -> Result<()> {
        match &self.dispatcher {
            Dispatcher::Sync(d) => d.flush(),
            Dispatcher::Async(d) => {
                d.wait_idle();
                Ok(())
            }
        }
    }

    /// Write out everything queued, flush and release the sink.
    ///
    /// Entries logged afterwards are counted as dropped. Calling this more
    /// than once is harmless; [`Drop`] calls it too.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        match &self.dispatcher {
            Dispatcher::Sync(d) => d.shutdown(),
            Dispatcher::Async(d) => {
                d.shutdown();
            }
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use rust_log_engine::{LogLevel, Logger, OutputFormat};
///
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .format(OutputFormat::Json)
///     .sampling_rate(0.5)
///     .build()
///     .unwrap();
/// assert_eq!(logger.format(), OutputFormat::Json);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    sink: Option<Box<dyn Sink>>,
    observer: Option<Arc<dyn MetricsObserver>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            sink: None,
            observer: None,
        }
    }

    /// Replace the whole configuration snapshot
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sampling_rate(mut self, rate: f64) -> Self {
        self.config.sampling_rate = rate;
        self
    }

    /// Enable the background writer thread
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, queue_capacity: Option<usize>) -> Self {
        self.config.async_mode = true;
        self.config.queue_capacity = queue_capacity;
        self
    }

    /// Write to `sink` instead of the configured target
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Push every metric event to `observer`
    #[must_use = "builder methods return a new value"]
    pub fn observer(mut self, observer: Arc<dyn MetricsObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate the configuration and start the logger
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            config,
            sink,
            observer,
        } = self;

        if sink.is_none() {
            config.validate()?;
        } else {
            // Target settings do not apply to a supplied sink
            LoggerConfig {
                target: LogTarget::Stdout,
                ..config.clone()
            }
            .validate()?;
        }

        let metrics = Arc::new(match observer {
            Some(observer) => LoggerMetrics::with_observer(observer),
            None => LoggerMetrics::new(),
        });

        let sink = match sink {
            Some(sink) => sink,
            None => target_sink(&config, &metrics)?,
        };

        Logger::start(&config, sink, metrics)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn target_sink(config: &LoggerConfig, metrics: &Arc<LoggerMetrics>) -> Result<Box<dyn Sink>> {
    match config.target {
        LogTarget::Stdout => Ok(Box::new(ConsoleSink::stdout())),
        LogTarget::Stderr => Ok(Box::new(ConsoleSink::stderr())),
        LogTarget::File => {
            let path = config
                .file_path
                .as_ref()
                .ok_or_else(|| LoggerError::config("LoggerConfig", "file target requires file_path"))?;
            let policy = RotationPolicy::new()
                .with_max_size(config.max_file_size)
                .with_max_backups(config.max_backup_files)
                .with_compression(config.compress_backups);
            let sink = FileSink::open(path, policy)?.with_metrics(Arc::clone(metrics));
            Ok(Box::new(sink))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output_format::Capabilities;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct MemorySink(Arc<Mutex<Vec<u8>>>);

    impl MemorySink {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Sink for MemorySink {
        fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
            self.0.lock().extend_from_slice(frame);
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    struct FailingSink;

    impl Sink for FailingSink {
        fn write_frame(&mut self, _frame: &[u8]) -> Result<()> {
            Err(LoggerError::other("device unavailable"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_level_filter() {
        let sink = MemorySink::default();
        let config = LoggerConfig {
            level: LogLevel::Warn,
            ..LoggerConfig::default()
        };
        let logger = Logger::with_sink(config, sink.clone()).unwrap();

        logger.debug("d", &[]);
        logger.info("i", &[]);
        logger.warn("w", &[]);
        logger.error("e", &[]);
        logger.fatal("f", &[]);

        let text = sink.text();
        assert_eq!(text.lines().count(), 3);
        assert!(!text.contains("[INFO]"));
        assert_eq!(logger.metrics().samples_accepted(), 3);
        assert_eq!(logger.metrics().samples_dropped(), 0);
    }

    #[test]
    fn test_log_entry_keeps_timestamp() {
        let sink = MemorySink::default();
        let logger = Logger::with_sink(LoggerConfig::default(), sink.clone()).unwrap();

        let fields = [Field::new("id", 7u64)];
        logger.log_entry(&LogEntry::new(LogLevel::Error, "boom", &fields).with_timestamp(42));

        assert_eq!(sink.text(), "[42] [ERROR] boom id=7\n");
        assert_eq!(logger.metrics().level_count(LogLevel::Error), 1);
    }

    #[test]
    fn test_sampling_counts() {
        let sink = MemorySink::default();
        let logger = Logger::builder()
            .sink(sink.clone())
            .sampling_rate(0.1)
            .build()
            .unwrap();

        for i in 0..1000 {
            logger.info(&format!("n{}", i), &[]);
        }

        assert_eq!(sink.text().lines().count(), 100);
        assert_eq!(logger.metrics().samples_accepted(), 100);
        assert_eq!(logger.metrics().samples_dropped(), 900);
    }

    #[test]
    fn test_disabled_format_falls_back_to_text() {
        let sink = MemorySink::default();
        let config = LoggerConfig {
            format: OutputFormat::Binary,
            capabilities: Capabilities {
                json: true,
                binary: false,
            },
            ..LoggerConfig::default()
        };
        let logger = Logger::with_sink(config, sink.clone()).unwrap();
        assert_eq!(logger.format(), OutputFormat::Text);

        logger.info("plain", &[]);
        assert!(sink.text().ends_with("[INFO] plain\n"));
    }

    #[test]
    fn test_scratch_buffer_keeps_configured_capacity() {
        let config = LoggerConfig {
            buffer_size: 256,
            ..LoggerConfig::default()
        };
        let logger = Logger::with_sink(config, MemorySink::default()).unwrap();
        logger.info(&"x".repeat(1000), &[]);
        logger.info("short", &[]);

        match &logger.dispatcher {
            Dispatcher::Sync(d) => assert!(d.scratch_capacity() >= 256),
            Dispatcher::Async(_) => unreachable!(),
        }
    }

    #[test]
    fn test_write_errors_are_counted() {
        let logger = Logger::with_sink(LoggerConfig::default(), FailingSink).unwrap();
        logger.info("a", &[]);
        logger.info("b", &[]);

        assert_eq!(logger.metrics().write_errors(), 2);
        assert_eq!(logger.metrics().messages_written(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent_and_drops_later_entries() {
        let sink = MemorySink::default();
        let logger = Logger::with_sink(LoggerConfig::default(), sink.clone()).unwrap();

        logger.info("before", &[]);
        logger.shutdown();
        logger.shutdown();
        logger.info("after", &[]);

        assert!(sink.text().contains("before"));
        assert!(!sink.text().contains("after"));
        assert_eq!(logger.dropped_count(), 1);
    }

    #[test]
    fn test_async_flush_waits_for_writer() {
        let sink = MemorySink::default();
        let logger = Logger::builder()
            .sink(sink.clone())
            .async_mode(None)
            .build()
            .unwrap();
        assert!(logger.is_async());

        for i in 0..500 {
            logger.info("queued", &[Field::new("i", i as u64)]);
        }
        logger.flush().unwrap();

        assert_eq!(sink.text().lines().count(), 500);
        assert_eq!(logger.metrics().messages_written(), 500);
    }

    #[test]
    fn test_supplied_sink_ignores_file_target() {
        let config = LoggerConfig {
            target: LogTarget::File,
            ..LoggerConfig::default()
        };
        assert!(Logger::new(config.clone()).is_err());
        assert!(Logger::with_sink(config, MemorySink::default()).is_ok());
    }

    #[test]
    fn test_invalid_sampling_rate_rejected() {
        let result = Logger::builder().sampling_rate(0.0).build();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }
}
