//! Single-line JSON encoder
//!
//! Frame layout:
//! `{"timestamp":<int>,"level":"<LEVEL>","message":"<msg>"[,"<key>":<value>...]}\n`
//!
//! Fields are written in entry order and duplicate keys are kept, so the
//! object is assembled by hand instead of through a map. Strings and keys
//! are escaped with `serde_json`; non-finite floats become `null`.

use crate::core::{FieldValue, LogEntry, Result};
use std::io::Write;

pub fn encode(entry: &LogEntry<'_>, out: &mut Vec<u8>) -> Result<()> {
    write!(
        out,
        "{{\"timestamp\":{},\"level\":\"{}\",\"message\":",
        entry.timestamp, entry.level
    )?;
    serde_json::to_writer(&mut *out, &*entry.message)?;

    for field in entry.fields.iter() {
        out.push(b',');
        serde_json::to_writer(&mut *out, field.key.as_str())?;
        out.push(b':');
        write_value(out, &field.value)?;
    }

    out.extend_from_slice(b"}\n");
    Ok(())
}

fn write_value(out: &mut Vec<u8>, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::String(s) => serde_json::to_writer(&mut *out, s.as_str())?,
        FieldValue::Int(i) => write!(out, "{}", i)?,
        FieldValue::Uint(u) => write!(out, "{}", u)?,
        FieldValue::Float(f) => serde_json::to_writer(&mut *out, f)?,
        FieldValue::Bool(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
    }
    Ok(())
}
