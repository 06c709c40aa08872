//! Logger metrics for observability
//!
//! The engine keeps lock-free counters for everything a health-reporting
//! layer wants to see and pushes each event to an optional
//! [`MetricsObserver`]. Nothing here is polled from the logging hot path.

use super::log_level::LogLevel;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One counter update pushed to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricEvent {
    /// An entry passed the level filter and the sampler
    Accepted(LogLevel),
    /// An entry passed the level filter but was sampled out
    SampledOut(LogLevel),
    /// A frame reached the sink
    Written { bytes: usize },
    /// The sink rejected a frame
    WriteError,
    /// The encoder failed to produce a frame
    FormatError,
    /// A frame was dropped before reaching the sink (queue full, allocation
    /// failure, logger already shut down)
    Dropped,
    /// The file sink rotated
    Rotated,
    /// A rotation attempt failed and the sink kept its current file
    RotationFailed,
}

/// Receiver for pushed metric events.
///
/// Called inline on the thread that produced the event, so implementations
/// should only update counters or hand off to their own queue.
pub trait MetricsObserver: Send + Sync {
    fn on_event(&self, event: MetricEvent);
}

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_log_engine::{LoggerMetrics, MetricEvent};
///
/// let metrics = LoggerMetrics::new();
/// metrics.record(MetricEvent::Written { bytes: 12 });
/// metrics.record(MetricEvent::Dropped);
///
/// assert_eq!(metrics.messages_written(), 1);
/// assert_eq!(metrics.bytes_written(), 12);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
pub struct LoggerMetrics {
    messages_written: AtomicU64,
    bytes_written: AtomicU64,
    /// Accepted entries per level, indexed by ordinal
    level_counts: [AtomicU64; 5],
    write_errors: AtomicU64,
    format_errors: AtomicU64,
    samples_accepted: AtomicU64,
    samples_dropped: AtomicU64,
    dropped_count: AtomicU64,
    rotations: AtomicU64,
    rotation_failures: AtomicU64,
    observer: Option<Arc<dyn MetricsObserver>>,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            messages_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            level_counts: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
            write_errors: AtomicU64::new(0),
            format_errors: AtomicU64::new(0),
            samples_accepted: AtomicU64::new(0),
            samples_dropped: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            observer: None,
        }
    }

    /// Create metrics that forward every event to `observer`
    pub fn with_observer(observer: Arc<dyn MetricsObserver>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new()
        }
    }

    /// Apply an event and push it to the observer.
    ///
    /// Returns the counter value before the update, which callers use to
    /// report the first occurrence of an error class.
    pub fn record(&self, event: MetricEvent) -> u64 {
        let previous = match event {
            MetricEvent::Accepted(level) => {
                self.level_counts[usize::from(level.ordinal())].fetch_add(1, Ordering::Relaxed);
                self.samples_accepted.fetch_add(1, Ordering::Relaxed)
            }
            MetricEvent::SampledOut(_) => self.samples_dropped.fetch_add(1, Ordering::Relaxed),
            MetricEvent::Written { bytes } => {
                self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
                self.messages_written.fetch_add(1, Ordering::Relaxed)
            }
            MetricEvent::WriteError => self.write_errors.fetch_add(1, Ordering::Relaxed),
            MetricEvent::FormatError => self.format_errors.fetch_add(1, Ordering::Relaxed),
            MetricEvent::Dropped => self.dropped_count.fetch_add(1, Ordering::Relaxed),
            MetricEvent::Rotated => self.rotations.fetch_add(1, Ordering::Relaxed),
            MetricEvent::RotationFailed => self.rotation_failures.fetch_add(1, Ordering::Relaxed),
        };

        if let Some(ref observer) = self.observer {
            observer.on_event(event);
        }

        previous
    }

    /// Count an error event, printing it to stderr only the first time its
    /// counter moves off zero.
    pub(crate) fn record_error(&self, event: MetricEvent, context: &str, error: &dyn fmt::Display) {
        if self.record(event) == 0 {
            eprintln!(
                "[LOGGER ERROR] {}: {}. Further occurrences are only counted.",
                context, error
            );
        }
    }

    #[inline]
    pub fn messages_written(&self) -> u64 {
        self.messages_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Entries of `level` that passed filtering and sampling
    #[inline]
    pub fn level_count(&self, level: LogLevel) -> u64 {
        self.level_counts[usize::from(level.ordinal())].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn format_errors(&self) -> u64 {
        self.format_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn samples_accepted(&self) -> u64 {
        self.samples_accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn samples_dropped(&self) -> u64 {
        self.samples_dropped.load(Ordering::Relaxed)
    }

    /// Frames dropped before reaching the sink
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Counts queue drops and write errors against everything that made it
    /// past the sampler. Returns 0.0 if nothing has been processed.
    pub fn drop_rate(&self) -> f64 {
        let lost = (self.dropped_count() + self.write_errors()) as f64;
        let total = self.messages_written() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerMetrics")
            .field("messages_written", &self.messages_written())
            .field("bytes_written", &self.bytes_written())
            .field("write_errors", &self.write_errors())
            .field("format_errors", &self.format_errors())
            .field("samples_accepted", &self.samples_accepted())
            .field("samples_dropped", &self.samples_dropped())
            .field("dropped_count", &self.dropped_count())
            .field("rotations", &self.rotations())
            .field("rotation_failures", &self.rotation_failures())
            .finish()
    }
}
