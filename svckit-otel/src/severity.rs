//! Mapping from local log levels to OpenTelemetry severities.

use opentelemetry::logs::Severity;
use svckit_common::Level;

/// Translate a local level into the OpenTelemetry severity it is exported as.
pub fn map_severity(level: Level) -> Severity {
    match level {
        Level::Panic | Level::Fatal => Severity::Fatal,
        Level::Error => Severity::Error,
        Level::Warn => Severity::Warn,
        Level::Info => Severity::Info,
        Level::Debug | Level::Trace => Severity::Debug,
    }
}

/// Map a textual level name. Unknown names map to [`Severity::Info`].
pub fn severity_for_name(name: &str) -> Severity {
    name.parse::<Level>()
        .map(map_severity)
        .unwrap_or(Severity::Info)
}
