//! Sink trait for frame destinations
//!
//! A sink accepts complete encoded frames. Console and file sinks ship with
//! the crate; network transports or test doubles implement the same trait
//! and plug into [`Logger::with_sink`](crate::Logger::with_sink).

use super::error::{LoggerError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub trait Sink: Send {
    /// Write one complete frame. Implementations may retry internally but
    /// must never write part of a frame and report success.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Write a frame, turning a panic inside the sink into an error so that a
/// misbehaving sink cannot take down the caller or the writer thread.
pub(crate) fn write_isolated(sink: &mut dyn Sink, frame: &[u8]) -> Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.write_frame(frame))) {
        Ok(result) => result,
        Err(panic_info) => Err(LoggerError::other(format!(
            "sink '{}' panicked: {}",
            sink.name(),
            panic_message(&*panic_info)
        ))),
    }
}

/// Flush with the same panic isolation as [`write_isolated`]
pub(crate) fn flush_isolated(sink: &mut dyn Sink) -> Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.flush())) {
        Ok(result) => result,
        Err(panic_info) => Err(LoggerError::other(format!(
            "sink '{}' panicked during flush: {}",
            sink.name(),
            panic_message(&*panic_info)
        ))),
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
