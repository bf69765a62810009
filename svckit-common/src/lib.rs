//! svckit common library
//!
//! Shared types for the svckit logging and telemetry crates:
//!
//! - [`level`] - Local log level taxonomy (`Level`)
//! - [`record`] - The immutable `LogRecord` handed to formatters and hooks
//! - [`hook`] - The `Hook` observer capability
//! - [`config`] - `LoggerConfig` loading (environment or JSON5)
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod hook;
pub mod level;
pub mod record;

// Re-export commonly used types at the crate root
pub use config::{LoggerConfig, load_config, parse_config};
pub use error::{Error, Result};
pub use hook::{Hook, HookError, HookRegistry};
pub use level::{Level, ParseLevelError};
pub use record::{Caller, LogRecord, LogRecordBuilder};
