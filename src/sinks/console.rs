//! Console sink implementation

use crate::core::{Result, Sink};
use std::io::Write;

/// Which standard stream a [`ConsoleSink`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Writes frames to stdout or stderr. Console sinks never rotate.
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleStream::Stderr)
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Sink for ConsoleSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        // Locking the stream keeps the frame contiguous even when other code
        // prints concurrently.
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().lock().write_all(frame)?,
            ConsoleStream::Stderr => std::io::stderr().lock().write_all(frame)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_sink_writes() {
        let mut sink = ConsoleSink::stderr();
        assert_eq!(sink.name(), "stderr");
        assert!(sink.write_frame(b"[0] [INFO] console sink test\n").is_ok());
        assert!(sink.flush().is_ok());
    }
}
