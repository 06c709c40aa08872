//! Synchronous dispatch path
//!
//! Encoding, writing and any rotation happen on the calling thread while the
//! state mutex is held. The mutex is what orders frames from concurrent
//! callers, so no frame is ever interleaved with another.

use super::error::Result;
use super::log_entry::LogEntry;
use super::metrics::{LoggerMetrics, MetricEvent};
use super::output_format::OutputFormat;
use super::sink::{flush_isolated, write_isolated, Sink};
use parking_lot::Mutex;

pub(crate) struct SyncDispatcher {
    state: Mutex<SyncState>,
}

struct SyncState {
    /// Reused for every frame; `clear()` keeps the capacity
    scratch: Vec<u8>,
    /// Released on shutdown
    sink: Option<Box<dyn Sink>>,
}

impl SyncDispatcher {
    pub(crate) fn new(sink: Box<dyn Sink>, buffer_size: usize) -> Self {
        Self {
            state: Mutex::new(SyncState {
                scratch: Vec::with_capacity(buffer_size),
                sink: Some(sink),
            }),
        }
    }

    pub(crate) fn dispatch(&self, entry: &LogEntry<'_>, format: OutputFormat, metrics: &LoggerMetrics) {
        let mut state = self.state.lock();
        let SyncState { scratch, sink } = &mut *state;

        let Some(sink) = sink.as_mut() else {
            metrics.record(MetricEvent::Dropped);
            return;
        };

        scratch.clear();
        if let Err(e) = format.encode(entry, scratch) {
            metrics.record_error(MetricEvent::FormatError, "Failed to encode log entry", &e);
            return;
        }

        match write_isolated(&mut **sink, scratch) {
            Ok(()) => {
                metrics.record(MetricEvent::Written {
                    bytes: scratch.len(),
                });
            }
            Err(e) => {
                metrics.record_error(MetricEvent::WriteError, "Failed to write log frame", &e);
            }
        }
    }

    pub(crate) fn flush(&self) -> Result<()> {
        match self.state.lock().sink.as_mut() {
            Some(sink) => flush_isolated(&mut **sink),
            None => Ok(()),
        }
    }

    /// Flush and release the sink. Later dispatches are counted as drops.
    pub(crate) fn shutdown(&self) {
        let sink = self.state.lock().sink.take();
        if let Some(mut sink) = sink {
            if let Err(e) = flush_isolated(&mut *sink) {
                eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scratch_capacity(&self) -> usize {
        self.state.lock().scratch.capacity()
    }
}
