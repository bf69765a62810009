use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::level::Level;

/// Environment variable names read by [`LoggerConfig::from_env`].
pub mod env {
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_JSON: &str = "LOG_JSON";
    pub const LOG_MAX_MSG_LENGTH: &str = "LOG_MAX_MSG_LENGTH";
    pub const LOG_GOROUTINE_ID: &str = "LOG_GOROUTINE_ID";
    pub const OTEL_ENABLED: &str = "OTEL_ENABLED";
    pub const OTEL_ENDPOINT: &str = "OTEL_ENDPOINT";
    pub const SERVICE_NAME: &str = "SERVICE_NAME";
}

/// Logger and telemetry-export configuration.
///
/// Supplied once at process start and treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum level: "trace", "debug", "info", "warn", "error", "fatal", "panic".
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit structured JSON instead of aligned text.
    #[serde(default)]
    pub json_format: bool,

    /// Maximum rendered message length in bytes (0 = unlimited).
    #[serde(default)]
    pub max_msg_length: usize,

    /// Include the execution-context tag in aligned-text output.
    #[serde(default, alias = "add_goroutine_id")]
    pub add_context_id: bool,

    /// Mirror records to an OTLP endpoint.
    #[serde(default)]
    pub otel_enabled: bool,

    /// OTLP gRPC endpoint, e.g. "localhost:4317" or "http://collector:4317".
    #[serde(default)]
    pub otel_endpoint: String,

    /// Service name attached to all exported telemetry.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "svckit".to_string()
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json_format: false,
            max_msg_length: 0,
            add_context_id: false,
            otel_enabled: false,
            otel_endpoint: String::new(),
            service_name: default_service_name(),
        }
    }
}

impl LoggerConfig {
    /// Read the configuration from process environment variables.
    ///
    /// Unset or malformed values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .unwrap_or(default)
        };
        let boolean = |key: &str, default: bool| {
            lookup(key)
                .and_then(|value| parse_bool(&value))
                .unwrap_or(default)
        };

        Self {
            level: string(env::LOG_LEVEL, defaults.level),
            json_format: boolean(env::LOG_JSON, defaults.json_format),
            max_msg_length: lookup(env::LOG_MAX_MSG_LENGTH)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.max_msg_length),
            add_context_id: boolean(env::LOG_GOROUTINE_ID, defaults.add_context_id),
            otel_enabled: boolean(env::OTEL_ENABLED, defaults.otel_enabled),
            otel_endpoint: string(env::OTEL_ENDPOINT, defaults.otel_endpoint),
            service_name: string(env::SERVICE_NAME, defaults.service_name),
        }
    }

    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: LoggerConfig = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: LoggerConfig = parse_config(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.otel_enabled && self.otel_endpoint.trim().is_empty() {
            return Err(Error::Config(
                "otel_endpoint cannot be empty when otel_enabled is set".to_string(),
            ));
        }

        if self.service_name.trim().is_empty() {
            return Err(Error::Config("service_name cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Configured minimum level, or `info` when the string is not a level.
    pub fn min_level(&self) -> Level {
        Level::parse_or_info(&self.level)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let config = LoggerConfig::from_lookup(|_| None);

        assert_eq!(config, LoggerConfig::default());
        assert_eq!(config.level, "info");
        assert!(!config.json_format);
        assert_eq!(config.max_msg_length, 0);
        assert!(!config.add_context_id);
        assert!(!config.otel_enabled);
        assert!(config.otel_endpoint.is_empty());
        assert_eq!(config.service_name, "svckit");
    }

    #[test]
    fn test_env_overrides() {
        let config = LoggerConfig::from_lookup(lookup_from(&[
            (env::LOG_LEVEL, "debug"),
            (env::LOG_JSON, "true"),
            (env::LOG_MAX_MSG_LENGTH, "120"),
            (env::LOG_GOROUTINE_ID, "1"),
            (env::OTEL_ENABLED, "T"),
            (env::OTEL_ENDPOINT, "collector:4317"),
            (env::SERVICE_NAME, "billing"),
        ]));

        assert_eq!(config.level, "debug");
        assert!(config.json_format);
        assert_eq!(config.max_msg_length, 120);
        assert!(config.add_context_id);
        assert!(config.otel_enabled);
        assert_eq!(config.otel_endpoint, "collector:4317");
        assert_eq!(config.service_name, "billing");
    }

    #[test]
    fn test_env_malformed_values_fall_back() {
        let config = LoggerConfig::from_lookup(lookup_from(&[
            (env::LOG_JSON, "yes please"),
            (env::LOG_MAX_MSG_LENGTH, "-5"),
            (env::SERVICE_NAME, ""),
        ]));

        assert!(!config.json_format);
        assert_eq!(config.max_msg_length, 0);
        assert_eq!(config.service_name, "svckit");
    }

    #[test]
    fn test_min_level_fallback() {
        let config = LoggerConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(config.min_level(), Level::Info);

        let config = LoggerConfig {
            level: "WARN".to_string(),
            ..Default::default()
        };
        assert_eq!(config.min_level(), Level::Warn);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = LoggerConfig::parse("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            level: "debug",
            json_format: true,
            max_msg_length: 256,
            add_goroutine_id: true,
            otel_enabled: true,
            otel_endpoint: "http://otel-collector:4317",
            service_name: "orders",
        }"#;

        let config = LoggerConfig::parse(json).unwrap();

        assert_eq!(config.level, "debug");
        assert!(config.json_format);
        assert_eq!(config.max_msg_length, 256);
        assert!(config.add_context_id);
        assert!(config.otel_enabled);
        assert_eq!(config.otel_endpoint, "http://otel-collector:4317");
        assert_eq!(config.service_name, "orders");
    }

    #[test]
    fn test_validate_missing_endpoint() {
        let result = LoggerConfig::parse("{ otel_enabled: true }");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("otel_endpoint"));
    }

    #[test]
    fn test_validate_empty_service_name() {
        let result = LoggerConfig::parse(r#"{ service_name: "  " }"#);
        assert!(result.is_err());
    }
}
