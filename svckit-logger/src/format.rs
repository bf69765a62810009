//! Record formatters.
//!
//! Two interchangeable renderings are provided:
//!
//! - [`AlignedTextFormatter`]: one column-aligned line per record
//! - [`JsonFormatter`]: one JSON object per line

use std::fmt::Write as _;

use serde_json::{Map, Value};
use svckit_common::LogRecord;

use crate::context::execution_context_tag;

/// Default timestamp pattern, e.g. `2024-05-01 13:37:00`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LEVEL_WIDTH: usize = 8;
const CALLER_WIDTH: usize = 25;
const CONTEXT_WIDTH: usize = 20;

/// Renders one record to bytes. Rendering cannot fail.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Vec<u8>;
}

/// Settings shared by the formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    /// `strftime` pattern for the timestamp.
    pub timestamp_format: String,
    /// Maximum message length in bytes (0 = unlimited).
    pub max_msg_length: usize,
    /// Prefix each line with the execution-context tag.
    pub add_context_id: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            max_msg_length: 0,
            add_context_id: false,
        }
    }
}

fn format_timestamp(record: &LogRecord, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", record.time().format(pattern)).is_err() {
        out.clear();
        let _ = write!(out, "{}", record.time().format(DEFAULT_TIMESTAMP_FORMAT));
    }
    out
}

/// Human-readable formatter producing lines like:
///
/// ```text
/// 2024-05-01 13:37:00 INFO    main.rs:42               :: server started
/// ```
#[derive(Debug, Clone, Default)]
pub struct AlignedTextFormatter {
    config: FormatterConfig,
}

impl AlignedTextFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Formatter for AlignedTextFormatter {
    fn format(&self, record: &LogRecord) -> Vec<u8> {
        let timestamp = format_timestamp(record, &self.config.timestamp_format);
        let level = format!(
            "{:<width$}",
            record.level().as_str().to_uppercase(),
            width = LEVEL_WIDTH
        );
        let msg = record.display_message(self.config.max_msg_length);

        let caller = record
            .caller()
            .map(|caller| format!("{:<width$}", caller.short_location(), width = CALLER_WIDTH))
            .unwrap_or_default();

        let context = if self.config.add_context_id {
            let tag = record
                .context()
                .map(str::to_string)
                .unwrap_or_else(execution_context_tag);
            format!("{:<width$}", tag, width = CONTEXT_WIDTH)
        } else {
            String::new()
        };

        format!("{timestamp} {context}{level}{caller}:: {msg}\n").into_bytes()
    }
}

/// Output key names used by [`JsonFormatter`].
pub mod keys {
    pub const TIME: &str = "time";
    pub const LEVEL: &str = "level";
    pub const MESSAGE: &str = "msg";
    pub const FILE: &str = "filename";
    pub const FUNC: &str = "func";

    pub const RESERVED: [&str; 5] = [TIME, LEVEL, MESSAGE, FILE, FUNC];
}

/// Structured formatter emitting one JSON object per line.
///
/// Record attributes become top-level keys. An attribute whose name clashes
/// with a record key is kept as `fields.<name>`.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    timestamp_format: String,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl JsonFormatter {
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        Self {
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Build the JSON object for a record.
    pub fn to_value(&self, record: &LogRecord) -> Value {
        let mut map = Map::with_capacity(record.fields().len() + keys::RESERVED.len());

        for (key, value) in record.fields() {
            let key = if keys::RESERVED.contains(&key.as_str()) {
                format!("fields.{key}")
            } else {
                key.clone()
            };
            map.insert(key, value.clone());
        }

        map.insert(
            keys::TIME.to_string(),
            Value::String(format_timestamp(record, &self.timestamp_format)),
        );
        map.insert(
            keys::LEVEL.to_string(),
            Value::String(record.level().as_str().to_string()),
        );
        map.insert(
            keys::MESSAGE.to_string(),
            Value::String(record.message().to_string()),
        );

        if let Some(caller) = record.caller() {
            map.insert(keys::FILE.to_string(), Value::String(caller.location()));
            if let Some(function) = &caller.function {
                map.insert(keys::FUNC.to_string(), Value::String(function.clone()));
            }
        }

        Value::Object(map)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Vec<u8> {
        let mut out = serde_json::to_vec(&self.to_value(record))
            .unwrap_or_else(|_| record.message().as_bytes().to_vec());
        out.push(b'\n');
        out
    }
}
