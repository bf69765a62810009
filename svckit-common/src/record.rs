//! The log record passed from the logger to formatters and hooks.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::level::Level;

/// Source location of the log call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Source file as reported by the compiler.
    pub file: String,
    /// Line number within `file`.
    pub line: u32,
    /// Module path of the call site, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            function: None,
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Caller from `#[track_caller]` location data.
    pub fn from_location(location: &std::panic::Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }

    /// Final path component of `file`.
    pub fn basename(&self) -> &str {
        Path::new(&self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file)
    }

    /// `file:line` using the full file path.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    /// `basename:line`.
    pub fn short_location(&self) -> String {
        format!("{}:{}", self.basename(), self.line)
    }
}

/// One structured log event. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    time: DateTime<Local>,
    level: Level,
    message: String,
    caller: Option<Caller>,
    fields: BTreeMap<String, Value>,
    context: Option<String>,
}

impl LogRecord {
    /// Start building a record stamped with the current local time.
    pub fn builder(level: Level, message: impl Into<String>) -> LogRecordBuilder {
        LogRecordBuilder {
            record: LogRecord {
                time: Local::now(),
                level,
                message: message.into(),
                caller: None,
                fields: BTreeMap::new(),
                context: None,
            },
        }
    }

    pub fn time(&self) -> DateTime<Local> {
        self.time
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Execution-context tag captured when the record was created.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Message cut to at most `max_len` bytes (0 = unlimited).
    ///
    /// Never splits a UTF-8 sequence, so the result may be slightly shorter
    /// than `max_len`. The stored message is left untouched.
    pub fn display_message(&self, max_len: usize) -> &str {
        truncate_str(&self.message, max_len)
    }
}

/// Builder for [`LogRecord`].
#[derive(Debug, Clone)]
pub struct LogRecordBuilder {
    record: LogRecord,
}

impl LogRecordBuilder {
    pub fn time(mut self, time: DateTime<Local>) -> Self {
        self.record.time = time;
        self
    }

    pub fn caller(mut self, caller: Caller) -> Self {
        self.record.caller = Some(caller);
        self
    }

    pub fn maybe_caller(mut self, caller: Option<Caller>) -> Self {
        self.record.caller = caller;
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.fields.insert(key.into(), value.into());
        self
    }

    pub fn fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.record
            .fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn context(mut self, tag: impl Into<String>) -> Self {
        self.record.context = Some(tag.into());
        self
    }

    pub fn build(self) -> LogRecord {
        self.record
    }
}

fn truncate_str(s: &str, max_len: usize) -> &str {
    if max_len == 0 || s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
