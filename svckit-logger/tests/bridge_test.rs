//! The `tracing` bridge installs a global subscriber, so this file holds a
//! single test.

use std::sync::Arc;

use svckit_common::LoggerConfig;
use svckit_logger::{Logger, SharedBuffer, install, logger};

#[test]
fn test_tracing_events_reach_global_logger() {
    let buffer = SharedBuffer::new();
    let config = LoggerConfig {
        level: "debug".to_string(),
        ..Default::default()
    };
    let installed = install(Arc::new(Logger::with_writer(&config, buffer.clone())), &config);
    assert!(Arc::ptr_eq(&installed, &logger()));

    tracing::trace!("too quiet");
    tracing::debug!(user = "ada", attempts = 3, "login attempt");
    tracing::warn!("disk at {}%", 91);

    let out = buffer.contents();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2, "unexpected output: {out}");
    assert!(lines[0].contains("DEBUG   bridge_test.rs:"));
    assert!(lines[0].ends_with(":: login attempt"));
    assert!(lines[1].contains("WARNING "));
    assert!(lines[1].ends_with(":: disk at 91%"));

    // Facade calls and tracing calls share one output.
    logger().info("direct");
    assert!(buffer.contents().ends_with(":: direct\n"));
}
