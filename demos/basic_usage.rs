//! Basic logger usage example
//!
//! Demonstrates synchronous logging to stdout with levels, fields and macros.
//!
//! Run with: cargo run --example basic_usage

use rust_log_engine::prelude::*;
use rust_log_engine::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Log Engine - Basic Usage Example ===\n");

    // Create a synchronous logger writing text frames to stdout
    let logger = Logger::new(LoggerConfig {
        level: LogLevel::Debug,
        ..LoggerConfig::default()
    })?;

    // Log messages at different levels
    println!("1. Logging at different levels:");
    logger.debug("This is a debug message", &[]);
    logger.info("This is an info message", &[]);
    logger.warn("This is a warning message", &[]);
    logger.error("This is an error message", &[]);
    logger.fatal("This is a fatal message", &[]);

    println!("\n2. Structured fields:");
    logger.info(
        "Request served",
        &[
            Field::new("method", "GET"),
            Field::new("status", 200u32),
            Field::new("latency_ms", 12.5),
            Field::new("cached", false),
        ],
    );
    let user = "alice";
    info!(logger, { "user" => user, "attempt" => 2i64 }, "Login for {}", user);

    println!("\n3. JSON output with a higher minimum level:");
    let json_logger = Logger::new(LoggerConfig {
        level: LogLevel::Warn,
        format: OutputFormat::Json,
        ..LoggerConfig::default()
    })?;
    json_logger.info("Info message (hidden)", &[]);
    warn!(json_logger, { "disk_free_pct" => 7u32 }, "Low disk space");

    logger.shutdown();
    json_logger.shutdown();

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
