//! Export pipeline tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batching and flush knobs for the log and metric pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Records per export request.
    #[serde(default = "default_max_export_batch_size")]
    pub max_export_batch_size: usize,

    /// Records buffered before new ones are dropped.
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Delay between scheduled log exports, in milliseconds.
    #[serde(default = "default_scheduled_delay_ms")]
    pub scheduled_delay_ms: u64,

    /// Per-request export timeout, in seconds.
    #[serde(default = "default_export_timeout_secs")]
    pub export_timeout_secs: u64,

    /// Metric collection interval, in milliseconds.
    #[serde(default = "default_metric_interval_ms")]
    pub metric_interval_ms: u64,
}

fn default_max_export_batch_size() -> usize {
    512
}

fn default_max_queue_size() -> usize {
    2048
}

fn default_scheduled_delay_ms() -> u64 {
    5_000
}

fn default_export_timeout_secs() -> u64 {
    30
}

fn default_metric_interval_ms() -> u64 {
    5_000
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            max_export_batch_size: default_max_export_batch_size(),
            max_queue_size: default_max_queue_size(),
            scheduled_delay_ms: default_scheduled_delay_ms(),
            export_timeout_secs: default_export_timeout_secs(),
            metric_interval_ms: default_metric_interval_ms(),
        }
    }
}

impl ExportSettings {
    /// Get scheduled delay as Duration.
    pub fn scheduled_delay(&self) -> Duration {
        Duration::from_millis(self.scheduled_delay_ms)
    }

    /// Get export timeout as Duration.
    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }

    /// Get metric interval as Duration.
    pub fn metric_interval(&self) -> Duration {
        Duration::from_millis(self.metric_interval_ms)
    }
}

/// Turn a bare `host:port` into a plaintext gRPC URL.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    }
}
