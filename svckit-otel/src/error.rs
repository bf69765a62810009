//! Error types for the telemetry pipelines.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`TelemetryError`].
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while setting up or tearing down export pipelines.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The OTLP exporter needs a Tokio runtime to drive its gRPC channel.
    #[error("OTLP export requires a running Tokio runtime")]
    NoRuntime,

    /// Endpoint was empty.
    #[error("OTLP endpoint cannot be empty")]
    EmptyEndpoint,

    /// Log exporter construction failed.
    #[error("Failed to create OTLP log exporter: {0}")]
    LogExporter(String),

    /// Metric exporter construction failed.
    #[error("Failed to create OTLP metric exporter: {0}")]
    MetricExporter(String),

    /// Provider flush or close failed.
    #[error("Failed to shut down {pipeline} provider: {message}")]
    Shutdown {
        pipeline: &'static str,
        message: String,
    },

    /// Flush did not finish before the deadline.
    #[error("Shutdown of {pipeline} provider timed out after {timeout:?}")]
    ShutdownTimeout {
        pipeline: &'static str,
        timeout: Duration,
    },

    /// The blocking shutdown task panicked or was cancelled.
    #[error("Shutdown task for {pipeline} provider failed: {message}")]
    ShutdownJoin {
        pipeline: &'static str,
        message: String,
    },
}
