//! OTLP provider setup and management.
//!
//! [`TelemetryProviders`] owns at most one active log pipeline and at most
//! one active metric pipeline. Each pipeline moves between two states:
//!
//! ```text
//!   Uninitialized --setup--> Active --shutdown--> Uninitialized
//! ```
//!
//! Both pipelines are guarded by their own `RwLock`. State transitions take
//! the write lock; meter lookups share the read lock. Slow work (flushing a
//! provider on shutdown) runs after the provider has been detached, so no
//! lock is held while waiting on the network.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use opentelemetry::InstrumentationScope;
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::logs::LoggerProvider as _;
use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry_otlp::{LogExporter, MetricExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::{BatchConfigBuilder, BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use parking_lot::RwLock;
use svckit_common::{Hook, HookRegistry};
use tracing::{debug, info, warn};

use crate::config::{ExportSettings, normalize_endpoint};
use crate::error::{Result, TelemetryError};
use crate::hook::OtelHook;

/// Instrumentation scope name used for mirrored log records.
pub const INSTRUMENTATION_NAME: &str = "svckit/logger";

/// Meter name handed out before metrics are configured.
pub const FALLBACK_METER_NAME: &str = "unknown";

static GLOBAL: LazyLock<TelemetryProviders> = LazyLock::new(TelemetryProviders::default);

#[derive(Default)]
struct LogsState {
    provider: Option<SdkLoggerProvider>,
    hook: Option<Arc<dyn Hook>>,
}

#[derive(Default)]
struct MetricsState {
    provider: Option<SdkMeterProvider>,
    meter: Option<Meter>,
}

/// Holder for the process's log and metric export pipelines.
pub struct TelemetryProviders {
    settings: ExportSettings,
    logs: RwLock<LogsState>,
    metrics: RwLock<MetricsState>,
}

impl Default for TelemetryProviders {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}

impl TelemetryProviders {
    /// Create an empty registry with the given pipeline settings.
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            logs: RwLock::new(LogsState::default()),
            metrics: RwLock::new(MetricsState::default()),
        }
    }

    /// The process-wide registry used by the free functions in this crate.
    pub fn global() -> &'static TelemetryProviders {
        &GLOBAL
    }

    /// Whether a log pipeline is currently active.
    pub fn has_logger(&self) -> bool {
        self.logs.read().provider.is_some()
    }

    /// Whether a metric pipeline is currently active.
    pub fn has_meter_provider(&self) -> bool {
        self.metrics.read().provider.is_some()
    }

    /// Build a log pipeline and attach an [`OtelHook`] to `registry`.
    ///
    /// The gRPC channel connects lazily, so an unreachable endpoint does not
    /// fail here. A pipeline that was already active is replaced and flushed
    /// in the background, and the hook from the previous setup is detached
    /// from `registry`.
    pub fn setup_logger<R>(&self, endpoint: &str, service_name: &str, registry: &R) -> Result<()>
    where
        R: HookRegistry + ?Sized,
    {
        let provider = build_logger_provider(endpoint, service_name, &self.settings)?;
        let hook: Arc<dyn Hook> = Arc::new(OtelHook::new(provider.logger(INSTRUMENTATION_NAME)));

        let (previous, stale_hook) = {
            let mut state = self.logs.write();
            (
                state.provider.replace(provider),
                state.hook.replace(hook.clone()),
            )
        };
        if let Some(stale_hook) = stale_hook {
            registry.remove_hook(&stale_hook);
        }
        registry.add_hook(hook);

        if let Some(previous) = previous {
            warn!("Replacing active OpenTelemetry log pipeline");
            retire_in_background("log", move || {
                previous.shutdown().map_err(|e| e.to_string())
            });
        }

        info!(endpoint = %endpoint, service = %service_name, "Logger provider initialized");
        Ok(())
    }

    /// Flush and close the active log pipeline, if any.
    pub async fn shutdown_logger(&self, timeout: Duration) -> Result<()> {
        let Some(provider) = self.logs.write().provider.take() else {
            debug!("No log pipeline to shut down");
            return Ok(());
        };

        shutdown_with_deadline("log", timeout, move || {
            provider.shutdown().map_err(|e| e.to_string())
        })
        .await
    }

    /// Build a metric pipeline, install it globally and return a meter.
    ///
    /// On failure the previous state is left untouched so the call can be
    /// retried.
    pub fn setup_metrics(&self, endpoint: &str, service_name: &str) -> Result<Meter> {
        let mut state = self.metrics.write();

        let provider = build_meter_provider(endpoint, service_name, &self.settings)?;
        global::set_meter_provider(provider.clone());

        let scope = InstrumentationScope::builder(service_name.to_string()).build();
        let meter = provider.meter_with_scope(scope);

        let previous = state.provider.replace(provider);
        state.meter = Some(meter.clone());
        drop(state);

        if let Some(previous) = previous {
            warn!("Replacing active OpenTelemetry metric pipeline");
            retire_in_background("metric", move || {
                previous.shutdown().map_err(|e| e.to_string())
            });
        }

        info!(endpoint = %endpoint, service = %service_name, "Meter provider initialized");
        Ok(meter)
    }

    /// Flush and close the active metric pipeline, if any.
    pub async fn shutdown_metrics(&self, timeout: Duration) -> Result<()> {
        let provider = {
            let mut state = self.metrics.write();
            state.meter = None;
            state.provider.take()
        };
        let Some(provider) = provider else {
            debug!("No metric pipeline to shut down");
            return Ok(());
        };

        shutdown_with_deadline("metric", timeout, move || {
            provider.shutdown().map_err(|e| e.to_string())
        })
        .await
    }

    /// The configured meter, or a fallback from the global provider.
    ///
    /// Never fails: before [`setup_metrics`](Self::setup_metrics) the
    /// fallback records into whatever global provider is installed, which
    /// is a no-op by default.
    pub fn meter(&self) -> Meter {
        if let Some(meter) = &self.metrics.read().meter {
            return meter.clone();
        }

        self.metrics
            .write()
            .meter
            .get_or_insert_with(|| global::meter(FALLBACK_METER_NAME))
            .clone()
    }
}

fn service_resource(service_name: &str) -> Resource {
    Resource::builder()
        .with_attributes([KeyValue::new("service.name", service_name.to_string())])
        .build()
}

fn ensure_runtime(endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(TelemetryError::EmptyEndpoint);
    }
    tokio::runtime::Handle::try_current().map_err(|_| TelemetryError::NoRuntime)?;
    Ok(())
}

/// Construct a batching OTLP log provider for `service_name`.
pub fn build_logger_provider(
    endpoint: &str,
    service_name: &str,
    settings: &ExportSettings,
) -> Result<SdkLoggerProvider> {
    ensure_runtime(endpoint)?;

    let exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(normalize_endpoint(endpoint))
        .with_timeout(settings.export_timeout())
        .build()
        .map_err(|e| TelemetryError::LogExporter(e.to_string()))?;

    let batch_config = BatchConfigBuilder::default()
        .with_max_export_batch_size(settings.max_export_batch_size)
        .with_max_queue_size(settings.max_queue_size)
        .with_scheduled_delay(settings.scheduled_delay())
        .build();
    let processor = BatchLogProcessor::builder(exporter)
        .with_batch_config(batch_config)
        .build();

    Ok(SdkLoggerProvider::builder()
        .with_resource(service_resource(service_name))
        .with_log_processor(processor)
        .build())
}

/// Construct a periodic-reader OTLP meter provider for `service_name`.
pub fn build_meter_provider(
    endpoint: &str,
    service_name: &str,
    settings: &ExportSettings,
) -> Result<SdkMeterProvider> {
    ensure_runtime(endpoint)?;

    let exporter = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(normalize_endpoint(endpoint))
        .with_timeout(settings.export_timeout())
        .build()
        .map_err(|e| TelemetryError::MetricExporter(e.to_string()))?;

    let reader = PeriodicReader::builder(exporter)
        .with_interval(settings.metric_interval())
        .build();

    Ok(SdkMeterProvider::builder()
        .with_resource(service_resource(service_name))
        .with_reader(reader)
        .build())
}

async fn shutdown_with_deadline<F>(
    pipeline: &'static str,
    timeout: Duration,
    shutdown: F,
) -> Result<()>
where
    F: FnOnce() -> std::result::Result<(), String> + Send + 'static,
{
    info!(pipeline, "Shutting down OpenTelemetry provider");

    let task = tokio::task::spawn_blocking(shutdown);
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(()))) => {
            info!(pipeline, "OpenTelemetry provider shutdown complete");
            Ok(())
        }
        Ok(Ok(Err(message))) => Err(TelemetryError::Shutdown { pipeline, message }),
        Ok(Err(join_error)) => Err(TelemetryError::ShutdownJoin {
            pipeline,
            message: join_error.to_string(),
        }),
        Err(_) => Err(TelemetryError::ShutdownTimeout { pipeline, timeout }),
    }
}

fn retire_in_background<F>(pipeline: &'static str, shutdown: F)
where
    F: FnOnce() -> std::result::Result<(), String> + Send + 'static,
{
    std::thread::spawn(move || {
        if let Err(e) = shutdown() {
            warn!(pipeline, error = %e, "Error shutting down replaced provider");
        }
    });
}

/// Build a log pipeline on the global registry and hook it into `registry`.
pub fn setup_otel_logger<R>(endpoint: &str, service_name: &str, registry: &R) -> Result<()>
where
    R: HookRegistry + ?Sized,
{
    GLOBAL.setup_logger(endpoint, service_name, registry)
}

/// Shut down the global log pipeline within `timeout`.
pub async fn shutdown_otel_logger(timeout: Duration) -> Result<()> {
    GLOBAL.shutdown_logger(timeout).await
}

/// Build the global metric pipeline and return its meter.
pub fn setup_otel_metrics(endpoint: &str, service_name: &str) -> Result<Meter> {
    GLOBAL.setup_metrics(endpoint, service_name)
}

/// Shut down the global metric pipeline within `timeout`.
pub async fn shutdown_otel_metrics(timeout: Duration) -> Result<()> {
    GLOBAL.shutdown_metrics(timeout).await
}

/// The global meter; usable even if metrics were never set up.
pub fn meter() -> Meter {
    GLOBAL.meter()
}
