//! Sink implementations

pub mod console;
pub mod file;

pub use console::{ConsoleSink, ConsoleStream};
pub use file::{FileSink, RotationPolicy};

pub use crate::core::Sink;
