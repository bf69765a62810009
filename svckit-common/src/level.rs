//! Local log level taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "warning", alias = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "fatal")]
    Fatal,
    #[serde(rename = "panic")]
    Panic,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    /// Lower-case level name as it appears in rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Panic => "panic",
        }
    }

    /// Whether a record at `self` passes a `minimum` threshold.
    pub fn is_enabled_for(&self, minimum: Level) -> bool {
        *self >= minimum
    }

    /// Parse a level, falling back to [`Level::Info`] on anything unrecognised.
    pub fn parse_or_info(s: &str) -> Self {
        s.parse().unwrap_or(Level::Info)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "panic" => Ok(Self::Panic),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
        assert!(Level::Fatal < Level::Panic);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("trace".parse::<Level>(), Ok(Level::Trace));
        assert_eq!("DEBUG".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("warn".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("Warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" panic ".parse::<Level>(), Ok(Level::Panic));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_parse_or_info_fallback() {
        assert_eq!(Level::parse_or_info("error"), Level::Error);
        assert_eq!(Level::parse_or_info(""), Level::Info);
        assert_eq!(Level::parse_or_info("loud"), Level::Info);
    }

    #[test]
    fn test_is_enabled_for() {
        assert!(Level::Info.is_enabled_for(Level::Info));
        assert!(Level::Error.is_enabled_for(Level::Info));
        assert!(!Level::Debug.is_enabled_for(Level::Info));
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Level::Warn.to_string(), "warning");
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"warning\"");
        let parsed: Level = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(parsed, Level::Warn);
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warn);
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Trace);
    }
}
