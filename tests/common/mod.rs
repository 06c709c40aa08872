//! Shared helpers for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use rust_log_engine::{Result, Sink};
use std::sync::Arc;

/// In-memory sink whose buffer stays readable after the logger takes it
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.bytes()).expect("sink output is not UTF-8")
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
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

/// Sink that panics on every write
pub struct PanickingSink;

impl Sink for PanickingSink {
    fn write_frame(&mut self, _frame: &[u8]) -> Result<()> {
        panic!("sink exploded");
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "panicking"
    }
}
