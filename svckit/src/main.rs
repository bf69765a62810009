//! Demo service for the svckit observability stack.

use std::time::Duration;

use clap::Parser;
use opentelemetry::KeyValue;
use tracing::{error, info, warn};

use svckit_common::LoggerConfig;

/// Demo service for the svckit observability stack.
#[derive(Parser, Debug)]
#[command(name = "svckit")]
#[command(about = "Emit sample logs and metrics through the svckit logger")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format). Environment is used otherwise.
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (overrides config).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON lines instead of aligned text.
    #[arg(long)]
    json: bool,

    /// OTLP endpoint; enables telemetry export (overrides config).
    #[arg(long)]
    otel_endpoint: Option<String>,

    /// Seconds between heartbeat records.
    #[arg(long, default_value_t = 5)]
    interval: u64,

    /// Emit one heartbeat and exit.
    #[arg(long)]
    once: bool,

    /// Seconds allowed for flushing telemetry on exit.
    #[arg(long, default_value_t = 10)]
    shutdown_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        LoggerConfig::load_from_file(config_path)?
    } else {
        LoggerConfig::from_env()
    };

    // Apply CLI overrides
    if let Some(level) = args.log_level {
        config.level = level;
    }
    if args.json {
        config.json_format = true;
    }
    if let Some(endpoint) = args.otel_endpoint {
        config.otel_endpoint = endpoint;
        config.otel_enabled = true;
    }

    let log = svckit_logger::init(&config);
    log.with_field("service", config.service_name.clone())
        .with_field("otel", config.otel_enabled)
        .info("Starting svckit demo");

    let meter = if config.otel_enabled {
        match svckit_otel::setup_otel_metrics(&config.otel_endpoint, &config.service_name) {
            Ok(meter) => meter,
            Err(e) => {
                warn!(error = %e, "Metrics export unavailable");
                svckit_otel::meter()
            }
        }
    } else {
        svckit_otel::meter()
    };
    let heartbeats = meter.u64_counter("svckit.heartbeats").build();

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    let mut beat: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                beat += 1;
                heartbeats.add(1, &[KeyValue::new("service", config.service_name.clone())]);
                info!(beat, "Heartbeat");
                if args.once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    if let Err(e) = svckit_logger::shutdown(Duration::from_secs(args.shutdown_timeout)).await {
        error!(error = %e, "Telemetry shutdown incomplete");
    }

    log.info("Stopped");
    Ok(())
}
