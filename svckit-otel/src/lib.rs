//! OpenTelemetry integration for svckit logging.
//!
//! This crate mirrors log records and metrics to an OTLP collector over gRPC.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  Logger facade  │────>│    OtelHook     │────>│ Batch processor │────>│  OTLP Endpoint  │
//! │  (svckit-logger)│     │ (severity map)  │     │  (SDK thread)   │     │  (Collector)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Pipelines
//!
//! - **Logs**: [`setup_otel_logger`] builds a batching log provider and
//!   attaches an [`OtelHook`] to the logger.
//! - **Metrics**: [`setup_otel_metrics`] builds a periodic-reader meter
//!   provider, installs it globally and returns a [`Meter`](opentelemetry::metrics::Meter).
//!
//! Both have matching `shutdown_*` functions that take a deadline.

pub mod config;
pub mod error;
pub mod hook;
pub mod providers;
pub mod severity;

pub use config::{ExportSettings, normalize_endpoint};
pub use error::{Result, TelemetryError};
pub use hook::OtelHook;
pub use providers::{
    FALLBACK_METER_NAME, INSTRUMENTATION_NAME, TelemetryProviders, meter, setup_otel_logger,
    setup_otel_metrics, shutdown_otel_logger, shutdown_otel_metrics,
};
pub use severity::{map_severity, severity_for_name};
