//! Output format selection
//!
//! Provides the three wire formats for log frames:
//! - Text: Human-readable single-line format (always available)
//! - Json: One JSON object per line
//! - Binary: Compact length-prefixed frames
//!
//! Which formats may be used is negotiated at runtime through
//! [`Capabilities`]; a format that is not enabled falls back to Text.

use super::error::Result;
use super::log_entry::LogEntry;
use crate::encoders;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format for log frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Example: `[1736332245] [INFO] Request processed status=200`
    #[default]
    Text,

    /// Example: `{"timestamp":1736332245,"level":"INFO","message":"Request processed","status":200}`
    Json,

    /// Length-prefixed binary frames, see [`encoders::binary`]
    Binary,
}

impl OutputFormat {
    /// Append the frame for `entry` to `out`
    pub fn encode(&self, entry: &LogEntry<'_>, out: &mut Vec<u8>) -> Result<()> {
        match self {
            OutputFormat::Text => encoders::text::encode(entry, out),
            OutputFormat::Json => encoders::json::encode(entry, out),
            OutputFormat::Binary => encoders::binary::encode(entry, out),
        }
    }

    /// The format actually used under `capabilities`
    #[must_use]
    pub fn resolve(self, capabilities: &Capabilities) -> OutputFormat {
        if capabilities.supports(self) {
            self
        } else {
            OutputFormat::Text
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Binary => "binary",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime feature profile supplied with the configuration.
///
/// Text output is always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub json: bool,
    pub binary: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            json: true,
            binary: true,
        }
    }
}

impl Capabilities {
    /// Profile with only the text format enabled
    pub const fn text_only() -> Self {
        Self {
            json: false,
            binary: false,
        }
    }

    pub fn supports(&self, format: OutputFormat) -> bool {
        match format {
            OutputFormat::Text => true,
            OutputFormat::Json => self.json,
            OutputFormat::Binary => self.binary,
        }
    }
}
