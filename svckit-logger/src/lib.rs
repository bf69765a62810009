//! Process-wide structured logging for svckit services.
//!
//! [`init`] builds the [`Logger`] described by a
//! [`LoggerConfig`], installs it as the global logger and bridges `tracing`
//! events into it. When telemetry export is enabled, records are also
//! mirrored to an OTLP collector through [`svckit_otel`].
//!
//! # Output formats
//!
//! Aligned text (default):
//!
//! ```text
//! 2024-05-01 13:37:00 INFO    main.rs:42               :: server started
//! ```
//!
//! JSON (`json_format: true`):
//!
//! ```text
//! {"filename":"src/main.rs:42","level":"info","msg":"server started","time":"2024-05-01 13:37:00"}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use svckit_common::LoggerConfig;
//!
//! let log = svckit_logger::init(&LoggerConfig::from_env());
//! log.with_field("port", 8080).info("listening");
//! tracing::warn!(retries = 3, "upstream slow");
//! ```

pub mod context;
pub mod format;
pub mod layer;
pub mod logger;

use std::sync::Arc;
use std::time::Duration;

use svckit_common::LoggerConfig;
use tracing_subscriber::prelude::*;

pub use context::execution_context_tag;
pub use format::{
    AlignedTextFormatter, DEFAULT_TIMESTAMP_FORMAT, Formatter, FormatterConfig, JsonFormatter,
};
pub use layer::LoggerLayer;
pub use logger::{Entry, Logger, SharedBuffer, logger};

/// Initialize the global logger from `config`. Never fails.
///
/// Telemetry export problems are reported as a warning and logging carries
/// on locally.
pub fn init(config: &LoggerConfig) -> Arc<Logger> {
    install(Arc::new(Logger::new(config)), config)
}

/// Like [`init`], but with a caller-supplied logger (e.g. a custom writer).
pub fn install(logger: Arc<Logger>, config: &LoggerConfig) -> Arc<Logger> {
    if config.otel_enabled {
        let result = config
            .validate()
            .map_err(|e| e.to_string())
            .and_then(|()| {
                svckit_otel::setup_otel_logger(
                    &config.otel_endpoint,
                    &config.service_name,
                    logger.as_ref(),
                )
                .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            logger.warn(format!("Failed to setup OpenTelemetry logger: {e}"));
        }
    }

    logger::set_global(logger.clone());

    // Another subscriber may already own the global slot (tests, embedding
    // applications); the facade still works without the bridge.
    let _ = tracing_subscriber::registry().with(LoggerLayer).try_init();

    logger
}

/// Flush and close both telemetry pipelines, each within `timeout`.
///
/// Both pipelines are always attempted; the first error is returned.
pub async fn shutdown(timeout: Duration) -> svckit_otel::Result<()> {
    let logs = svckit_otel::shutdown_otel_logger(timeout).await;
    let metrics = svckit_otel::shutdown_otel_metrics(timeout).await;
    logs.and(metrics)
}
