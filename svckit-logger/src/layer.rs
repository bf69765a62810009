//! Bridge from `tracing` events into the process-wide [`Logger`](crate::Logger).

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use svckit_common::{Caller, Level, LogRecord};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::logger::{in_hook_chain, logger};

/// Targets whose events are written locally but never handed to hooks.
///
/// The export pipeline itself logs through these crates; forwarding them
/// would feed the exporter its own diagnostics.
const LOCAL_ONLY_TARGETS: [&str; 5] = ["opentelemetry", "tonic", "h2", "hyper", "tower"];

/// Routes every `tracing` event through the global logger.
///
/// The `message` field becomes the record message; other fields become
/// attributes. Events emitted while a hook is running on the same thread
/// are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerLayer;

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if in_hook_chain() {
            return;
        }

        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        let logger = logger();
        if !logger.is_enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let caller = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => {
                let caller = Caller::new(file, line);
                Some(match metadata.module_path() {
                    Some(module) => caller.with_function(module),
                    None => caller,
                })
            }
            _ => None,
        };

        let mut builder = LogRecord::builder(level, visitor.message)
            .maybe_caller(caller)
            .fields(visitor.fields);
        if let Some(tag) = logger.context_tag() {
            builder = builder.context(tag);
        }
        let record = builder.build();

        if is_local_only(metadata.target()) {
            logger.write_record(record);
        } else {
            logger.log_record(record);
        }
    }
}

fn is_local_only(target: &str) -> bool {
    LOCAL_ONLY_TARGETS.iter().any(|prefix| {
        target == *prefix
            || target
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::") || rest.starts_with('_'))
    })
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_only_targets() {
        assert!(is_local_only("opentelemetry"));
        assert!(is_local_only("opentelemetry_sdk"));
        assert!(is_local_only("opentelemetry_otlp::exporter"));
        assert!(is_local_only("h2::codec"));
        assert!(is_local_only("hyper_util::client"));
        assert!(!is_local_only("hyperdrive"));
        assert!(!is_local_only("svckit_logger"));
        assert!(!is_local_only("my_app::handlers"));
    }
}
