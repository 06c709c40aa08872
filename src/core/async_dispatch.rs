//! Asynchronous dispatch path
//!
//! Producers encode on their own thread into a thread-local scratch buffer,
//! copy the frame into an owned allocation and push it onto a shared queue.
//! A single writer thread swaps the whole queue out under the lock and
//! writes the batch to the sink, so the sink is only ever touched from one
//! thread and frames from one producer keep their order.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::metrics::{LoggerMetrics, MetricEvent};
use super::output_format::OutputFormat;
use super::sink::{flush_isolated, write_isolated, Sink};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long the writer sleeps on an empty queue before polling again
const IDLE_WAIT: Duration = Duration::from_millis(1);

thread_local! {
    static ENCODE_BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

struct Shared {
    queue: Mutex<Vec<Vec<u8>>>,
    /// Set once teardown begins. Producers read it while holding the queue
    /// lock, so nothing is enqueued after the writer's final drain.
    shutdown: AtomicBool,
    /// Frames enqueued but not yet handed to the sink
    pending: AtomicUsize,
}

struct Worker {
    /// Never sent on; dropping it wakes the writer immediately
    wake: Sender<()>,
    handle: thread::JoinHandle<()>,
}

pub(crate) struct AsyncDispatcher {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
    queue_capacity: Option<usize>,
}

impl AsyncDispatcher {
    /// Spawn the writer thread. The sink moves onto that thread and is
    /// flushed and dropped there once the queue has been drained.
    pub(crate) fn start(
        sink: Box<dyn Sink>,
        metrics: Arc<LoggerMetrics>,
        queue_capacity: Option<usize>,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Vec::new()),
            shutdown: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        });
        let (wake, wake_rx) = bounded::<()>(1);

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("log-dispatch".into())
            .spawn(move || run_writer(worker_shared, wake_rx, sink, metrics))
            .map_err(|e| {
                LoggerError::io_operation("starting async dispatch", "Failed to spawn writer thread", e)
            })?;

        Ok(Self {
            shared,
            worker: Mutex::new(Some(Worker { wake, handle })),
            queue_capacity,
        })
    }

    pub(crate) fn dispatch(&self, entry: &LogEntry<'_>, format: OutputFormat, metrics: &LoggerMetrics) {
        // try_with fails only while this thread's locals are being torn down
        let encoded = ENCODE_BUFFER
            .try_with(|cell| encode_owned(&mut cell.borrow_mut(), entry, format))
            .unwrap_or_else(|_| encode_owned(&mut Vec::new(), entry, format));

        match encoded {
            Ok(Some(frame)) => self.enqueue(frame, metrics),
            Ok(None) => {
                metrics.record_error(
                    MetricEvent::Dropped,
                    "Dropping log frame",
                    &"allocation for the queued copy failed",
                );
            }
            Err(e) => {
                metrics.record_error(MetricEvent::FormatError, "Failed to encode log entry", &e);
            }
        }
    }

    fn enqueue(&self, frame: Vec<u8>, metrics: &LoggerMetrics) {
        let mut queue = self.shared.queue.lock();

        if self.shared.shutdown.load(Ordering::Acquire) {
            drop(queue);
            metrics.record(MetricEvent::Dropped);
            return;
        }

        if let Some(capacity) = self.queue_capacity {
            if queue.len() >= capacity {
                drop(queue);
                metrics.record_error(
                    MetricEvent::Dropped,
                    "Dropping log frame",
                    &format_args!("async queue is full ({} frames)", capacity),
                );
                return;
            }
        }

        queue.push(frame);
        // Incremented under the lock so the writer can never subtract first
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Block until every frame enqueued so far has reached the sink, or the
    /// writer thread is gone.
    pub(crate) fn wait_idle(&self) {
        while self.shared.pending.load(Ordering::Acquire) > 0 {
            let running = self
                .worker
                .lock()
                .as_ref()
                .is_some_and(|worker| !worker.handle.is_finished());
            if !running {
                break;
            }
            thread::sleep(IDLE_WAIT);
        }
    }

    /// Stop accepting frames, let the writer drain the queue, and join it.
    ///
    /// Returns `false` if the writer thread panicked. Safe to call more than
    /// once; later calls return `true` without doing anything.
    pub(crate) fn shutdown(&self) -> bool {
        self.shared.shutdown.store(true, Ordering::Release);

        let worker = self.worker.lock().take();
        let Some(Worker { wake, handle }) = worker else {
            return true;
        };

        drop(wake);
        if let Err(e) = handle.join() {
            eprintln!("[LOGGER ERROR] Async writer thread panicked during shutdown: {:?}", e);
            return false;
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        self.shared.queue.lock().len()
    }
}

/// Encode into `scratch`, then copy the frame into an exactly sized owned
/// buffer. `Ok(None)` means the copy could not be allocated.
fn encode_owned(
    scratch: &mut Vec<u8>,
    entry: &LogEntry<'_>,
    format: OutputFormat,
) -> Result<Option<Vec<u8>>> {
    scratch.clear();
    format.encode(entry, scratch)?;

    let mut frame = Vec::new();
    if frame.try_reserve_exact(scratch.len()).is_err() {
        return Ok(None);
    }
    frame.extend_from_slice(scratch);
    Ok(Some(frame))
}

fn run_writer(
    shared: Arc<Shared>,
    wake: Receiver<()>,
    mut sink: Box<dyn Sink>,
    metrics: Arc<LoggerMetrics>,
) {
    // The drained queue is handed back as the next empty queue, so the
    // steady state allocates nothing for the batch itself.
    let mut batch: Vec<Vec<u8>> = Vec::new();

    loop {
        // Read the flag before draining: if it was already set, this drain
        // sees everything any producer will ever enqueue.
        let stopping = shared.shutdown.load(Ordering::Acquire);
        std::mem::swap(&mut *shared.queue.lock(), &mut batch);

        if batch.is_empty() {
            if stopping {
                break;
            }
            // Times out while idle, returns at once after teardown drops the sender
            let _ = wake.recv_timeout(IDLE_WAIT);
            continue;
        }

        let taken = batch.len();
        for frame in batch.drain(..) {
            match write_isolated(&mut *sink, &frame) {
                Ok(()) => {
                    metrics.record(MetricEvent::Written { bytes: frame.len() });
                }
                Err(e) => {
                    metrics.record_error(MetricEvent::WriteError, "Failed to write log frame", &e);
                }
            }
        }
        shared.pending.fetch_sub(taken, Ordering::AcqRel);
    }

    if let Err(e) = flush_isolated(&mut *sink) {
        eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
    }
}
