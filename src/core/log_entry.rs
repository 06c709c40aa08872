//! Log entry structure

use super::field::Field;
use super::log_level::LogLevel;
use std::borrow::Cow;

/// One structured log record.
///
/// Entries are built per call and borrow the caller's message and fields;
/// only decoded entries own their data.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry<'a> {
    pub level: LogLevel,
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub message: Cow<'a, str>,
    pub fields: Cow<'a, [Field]>,
}

impl<'a> LogEntry<'a> {
    /// Create an entry stamped with the current time
    pub fn new(level: LogLevel, message: &'a str, fields: &'a [Field]) -> Self {
        Self {
            level,
            timestamp: chrono::Utc::now().timestamp(),
            message: Cow::Borrowed(message),
            fields: Cow::Borrowed(fields),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Detach the entry from any borrowed data
    pub fn into_owned(self) -> LogEntry<'static> {
        LogEntry {
            level: self.level,
            timestamp: self.timestamp,
            message: Cow::Owned(self.message.into_owned()),
            fields: Cow::Owned(self.fields.into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_borrows_caller_data() {
        let fields = vec![Field::new("user", "alice")];
        let entry = LogEntry::new(LogLevel::Info, "login", &fields).with_timestamp(42);

        assert!(matches!(entry.message, Cow::Borrowed(_)));
        assert_eq!(entry.timestamp, 42);
        assert_eq!(entry.fields.len(), 1);
    }

    #[test]
    fn test_timestamp_is_current() {
        let entry = LogEntry::new(LogLevel::Debug, "now", &[]);
        let now = chrono::Utc::now().timestamp();
        assert!((now - entry.timestamp).abs() <= 1);
    }

    #[test]
    fn test_into_owned() {
        let owned = {
            let message = String::from("scoped");
            let fields = vec![Field::new("n", 1_i64)];
            LogEntry::new(LogLevel::Warn, &message, &fields).into_owned()
        };
        assert_eq!(owned.message, "scoped");
        assert_eq!(owned.fields[0], Field::new("n", 1_i64));
    }
}
