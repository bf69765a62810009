//! Logger hook that mirrors records into an OpenTelemetry log pipeline.

use std::time::SystemTime;

use opentelemetry::logs::{LogRecord as _, Logger};
use opentelemetry_sdk::logs::SdkLogger;
use serde_json::Value;
use svckit_common::{Hook, HookError, LogRecord};
use tracing::trace;

use crate::severity::map_severity;

/// Forwards every record it sees to an OTLP batch processor.
///
/// Emission only enqueues; network I/O happens on the processor's own
/// thread. Export failures never surface here.
pub struct OtelHook {
    logger: SdkLogger,
}

impl OtelHook {
    pub fn new(logger: SdkLogger) -> Self {
        Self { logger }
    }
}

impl Hook for OtelHook {
    fn fire(&self, record: &LogRecord) -> Result<(), HookError> {
        let severity = map_severity(record.level());

        let mut log_record = self.logger.create_log_record();
        log_record.set_timestamp(SystemTime::from(record.time()));
        log_record.set_severity_number(severity);
        log_record.set_severity_text(record.level().as_str());
        log_record.set_body(record.message().to_string().into());

        for (key, value) in build_log_attributes(record) {
            log_record.add_attribute(key, value);
        }

        self.logger.emit(log_record);

        trace!(severity = ?severity, "Mirrored log record");
        Ok(())
    }
}

/// Stringify record attributes for export.
///
/// String values are passed through unquoted; anything else uses its JSON
/// text, so nested values are flattened into a single string.
pub fn build_log_attributes(record: &LogRecord) -> Vec<(String, String)> {
    record
        .fields()
        .iter()
        .map(|(key, value)| (key.clone(), value_to_string(value)))
        .collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
