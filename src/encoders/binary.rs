//! Compact binary encoder and decoder
//!
//! This layout is the one byte-exact contract of the engine. Multi-byte
//! integers are little-endian.
//!
//! ```text
//! [timestamp:8][level:1][message_len:2][message][field_count:1][field...]
//! field = [key_len:1][key][tag:1][payload]
//! ```
//!
//! | tag | value  | payload                     |
//! |-----|--------|-----------------------------|
//! | 0   | string | `len:2` followed by bytes   |
//! | 1   | int64  | 8 bytes                     |
//! | 2   | uint64 | 8 bytes                     |
//! | 3   | float64| 8 bytes (IEEE 754 bits)     |
//! | 4   | bool   | 1 byte, 0 or 1              |
//!
//! Messages and string values longer than 65535 bytes and keys longer than
//! 255 bytes are truncated; fields past the 255th are dropped.

use crate::core::{Field, FieldValue, LogEntry, LogLevel, LoggerError, Result};
use std::borrow::Cow;

pub const MAX_MESSAGE_LEN: usize = u16::MAX as usize;
pub const MAX_STRING_LEN: usize = u16::MAX as usize;
pub const MAX_KEY_LEN: usize = u8::MAX as usize;
pub const MAX_FIELDS: usize = u8::MAX as usize;

const TAG_STRING: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_UINT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_BOOL: u8 = 4;

pub fn encode(entry: &LogEntry<'_>, out: &mut Vec<u8>) -> Result<()> {
    out.extend_from_slice(&entry.timestamp.to_le_bytes());
    out.push(entry.level.ordinal());
    put_u16_prefixed(out, truncate(entry.message.as_bytes(), MAX_MESSAGE_LEN));

    let count = entry.fields.len().min(MAX_FIELDS);
    out.push(count as u8);

    for field in entry.fields.iter().take(count) {
        let key = truncate(field.key.as_bytes(), MAX_KEY_LEN);
        out.push(key.len() as u8);
        out.extend_from_slice(key);
        out.push(field.value.tag());

        match &field.value {
            FieldValue::String(s) => put_u16_prefixed(out, truncate(s.as_bytes(), MAX_STRING_LEN)),
            FieldValue::Int(i) => out.extend_from_slice(&i.to_le_bytes()),
            FieldValue::Uint(u) => out.extend_from_slice(&u.to_le_bytes()),
            FieldValue::Float(f) => out.extend_from_slice(&f.to_le_bytes()),
            FieldValue::Bool(b) => out.push(u8::from(*b)),
        }
    }

    Ok(())
}

#[inline]
fn truncate(bytes: &[u8], max: usize) -> &[u8] {
    &bytes[..bytes.len().min(max)]
}

fn put_u16_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(bytes);
}

/// Decode one frame from the start of `bytes`.
///
/// Returns the entry and the number of bytes the frame occupied. Strings cut
/// mid-character by truncation are decoded lossily.
pub fn decode(bytes: &[u8]) -> Result<(LogEntry<'static>, usize)> {
    let mut cursor = Cursor { buf: bytes, pos: 0 };

    let timestamp = i64::from_le_bytes(cursor.array8("timestamp")?);

    let level_pos = cursor.pos;
    let level_byte = cursor.u8("level")?;
    let level = LogLevel::from_ordinal(level_byte)
        .ok_or_else(|| LoggerError::decode(level_pos, format!("unknown level {}", level_byte)))?;

    let message = cursor.u16_prefixed_string("message")?;

    let count = cursor.u8("field count")?;
    let mut fields = Vec::with_capacity(usize::from(count));

    for _ in 0..count {
        let key_len = cursor.u8("key length")?;
        let key = lossy(cursor.take(usize::from(key_len), "key")?);

        let tag_pos = cursor.pos;
        let value = match cursor.u8("value tag")? {
            TAG_STRING => FieldValue::String(cursor.u16_prefixed_string("string value")?),
            TAG_INT => FieldValue::Int(i64::from_le_bytes(cursor.array8("int value")?)),
            TAG_UINT => FieldValue::Uint(u64::from_le_bytes(cursor.array8("uint value")?)),
            TAG_FLOAT => FieldValue::Float(f64::from_le_bytes(cursor.array8("float value")?)),
            TAG_BOOL => FieldValue::Bool(cursor.u8("bool value")? != 0),
            other => {
                return Err(LoggerError::decode(
                    tag_pos,
                    format!("unknown value tag {}", other),
                ))
            }
        };

        fields.push(Field { key, value });
    }

    let entry = LogEntry {
        level,
        timestamp,
        message: Cow::Owned(message),
        fields: Cow::Owned(fields),
    };
    Ok((entry, cursor.pos))
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let available = self.buf.len() - self.pos;
        if available < len {
            return Err(LoggerError::decode(
                self.pos,
                format!("truncated {}: need {} bytes, {} available", what, len, available),
            ));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn array8(&mut self, what: &str) -> Result<[u8; 8]> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8, what)?);
        Ok(bytes)
    }

    fn u16_prefixed_string(&mut self, what: &str) -> Result<String> {
        let mut len = [0u8; 2];
        len.copy_from_slice(self.take(2, what)?);
        let len = usize::from(u16::from_le_bytes(len));
        Ok(lossy(self.take(len, what)?))
    }
}

/// Iterator over the frames of a binary log stream, such as the contents of
/// a log file written in [`OutputFormat::Binary`](crate::OutputFormat::Binary).
///
/// Iteration stops after the first malformed frame.
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Byte offset of the next frame
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for FrameReader<'_> {
    type Item = Result<LogEntry<'static>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }

        match decode(&self.buf[self.pos..]) {
            Ok((entry, consumed)) => {
                self.pos += consumed;
                Some(Ok(entry))
            }
            Err(LoggerError::DecodeError { offset, message }) => {
                let absolute = self.pos + offset;
                self.pos = self.buf.len();
                Some(Err(LoggerError::decode(absolute, message)))
            }
            Err(e) => {
                self.pos = self.buf.len();
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(entry: &LogEntry<'_>) -> Vec<u8> {
        let mut out = Vec::new();
        encode(entry, &mut out).unwrap();
        out
    }

    #[test]
    fn test_exact_bytes() {
        let fields = vec![Field::new("k", true)];
        let entry = LogEntry::new(LogLevel::Warn, "hi", &fields).with_timestamp(1);

        assert_eq!(
            encoded(&entry),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 2, 2, 0, b'h', b'i', 1, 1, b'k', 4, 1]
        );
    }

    #[test]
    fn test_round_trip_all_value_kinds() {
        let fields = vec![
            Field::new("s", "text"),
            Field::new("i", -42_i64),
            Field::new("u", u64::MAX),
            Field::new("f", -0.125),
            Field::new("b", true),
            Field::new("s", "duplicate"),
        ];
        let entry = LogEntry::new(LogLevel::Fatal, "round trip", &fields).with_timestamp(-7);
        let bytes = encoded(&entry);

        let (decoded, consumed) = decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, entry.into_owned());
    }

    #[test]
    fn test_message_truncated_to_u16() {
        let message = "x".repeat(70_000);
        let entry = LogEntry::new(LogLevel::Info, &message, &[]).with_timestamp(0);
        let bytes = encoded(&entry);

        assert_eq!(u16::from_le_bytes([bytes[9], bytes[10]]), 65_535);
        assert_eq!(&bytes[11..11 + 65_535], &message.as_bytes()[..65_535]);
        assert_eq!(bytes[11 + 65_535], 0);
        assert_eq!(bytes.len(), 8 + 1 + 2 + 65_535 + 1);
    }

    #[test]
    fn test_key_and_field_count_limits() {
        let long_key = "k".repeat(300);
        let mut fields = vec![Field::new(long_key, 1_i64)];
        for i in 0..299 {
            fields.push(Field::new(format!("f{}", i), i as u64));
        }
        let entry = LogEntry::new(LogLevel::Debug, "", &fields).with_timestamp(0);
        let bytes = encoded(&entry);

        // timestamp + level + empty message
        assert_eq!(bytes[11], 255);
        assert_eq!(bytes[12], 255);

        let (decoded, _) = decode(&bytes).unwrap();
        assert_eq!(decoded.fields.len(), MAX_FIELDS);
        assert_eq!(decoded.fields[0].key.len(), MAX_KEY_LEN);
        assert_eq!(decoded.fields[254].key, "f253");
    }

    #[test]
    fn test_decode_truncated_frame() {
        let entry = LogEntry::new(LogLevel::Info, "cut short", &[]).with_timestamp(3);
        let bytes = encoded(&entry);

        let err = decode(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, LoggerError::DecodeError { offset: 11, .. }));
    }

    #[test]
    fn test_decode_rejects_unknown_tag_and_level() {
        let mut bytes = vec![0u8; 8];
        bytes.push(9);
        assert!(matches!(
            decode(&bytes),
            Err(LoggerError::DecodeError { offset: 8, .. })
        ));

        let fields = vec![Field::new("k", false)];
        let entry = LogEntry::new(LogLevel::Info, "", &fields).with_timestamp(0);
        let mut bytes = encoded(&entry);
        let tag_index = bytes.len() - 2;
        bytes[tag_index] = 7;
        assert!(matches!(
            decode(&bytes),
            Err(LoggerError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_frame_reader_walks_stream() {
        let mut stream = Vec::new();
        for i in 0..3_i64 {
            let fields = vec![Field::new("seq", i)];
            let message = format!("frame {}", i);
            let entry = LogEntry::new(LogLevel::Info, &message, &fields).with_timestamp(i);
            encode(&entry, &mut stream).unwrap();
        }

        let entries: Vec<_> = FrameReader::new(&stream).collect::<Result<_>>().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].message, "frame 2");
        assert_eq!(entries[1].fields[0].value, FieldValue::Int(1));
    }

    #[test]
    fn test_frame_reader_reports_absolute_offset() {
        let mut stream = Vec::new();
        let entry = LogEntry::new(LogLevel::Info, "ok", &[]).with_timestamp(0);
        encode(&entry, &mut stream).unwrap();
        let first_len = stream.len();
        stream.extend_from_slice(&[0, 0, 0]);

        let mut reader = FrameReader::new(&stream);
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(LoggerError::DecodeError { offset, .. })) => assert_eq!(offset, first_len),
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(reader.next().is_none());
    }
}
