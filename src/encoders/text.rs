//! Human-readable text encoder
//!
//! Frame layout: `[<unix_ts>] [<LEVEL>] <message>` followed by one
//! ` key=value` per field and a trailing newline. String values are
//! double-quoted; numbers and booleans are written literally.

use crate::core::{FieldValue, LogEntry, Result};
use std::io::Write;

pub fn encode(entry: &LogEntry<'_>, out: &mut Vec<u8>) -> Result<()> {
    write!(out, "[{}] [{}] ", entry.timestamp, entry.level)?;
    push_sanitized(out, &entry.message, false);

    for field in entry.fields.iter() {
        out.push(b' ');
        push_sanitized(out, &field.key, false);
        out.push(b'=');
        match &field.value {
            FieldValue::String(s) => {
                out.push(b'"');
                push_sanitized(out, s, true);
                out.push(b'"');
            }
            other => write!(out, "{}", other)?,
        }
    }

    out.push(b'\n');
    Ok(())
}

/// Escape line breaks and tabs so a frame always occupies exactly one line.
/// Inside quoted values quotes and backslashes are escaped as well.
fn push_sanitized(out: &mut Vec<u8>, s: &str, quoted: bool) {
    // Every escaped byte is ASCII, so UTF-8 continuation bytes pass through.
    for &byte in s.as_bytes() {
        match byte {
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            b'"' if quoted => out.extend_from_slice(b"\\\""),
            b'\\' if quoted => out.extend_from_slice(b"\\\\"),
            _ => out.push(byte),
        }
    }
}
