//! File logging example
//!
//! Demonstrates size-based rotation with numbered, compressed backups.
//!
//! Run with: cargo run --example file_logging

use rust_log_engine::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Log Engine - File Logging Example ===\n");

    // Small threshold so the example rotates a few times
    let config = LoggerConfig {
        level: LogLevel::Debug,
        max_file_size: 4 * 1024,
        max_backup_files: 3,
        compress_backups: true,
        ..LoggerConfig::file("logs/application.log")
    };
    let logger = Logger::new(config)?;

    println!("1. Logging to logs/application.log:");
    logger.info("Application started", &[]);
    logger.debug("Loading configuration...", &[]);
    logger.warn("Using default settings for some options", &[]);

    println!("\n2. Performing some operations:");
    for i in 1..=200u64 {
        logger.info(
            "Processing item",
            &[Field::new("item", i), Field::new("total", 200u64)],
        );
        if i % 50 == 0 {
            logger.warn("Checkpoint reached", &[Field::new("item", i)]);
        }
    }

    logger.info("All operations completed", &[]);
    logger.flush()?;

    let metrics = logger.metrics();
    println!(
        "   Wrote {} frames ({} bytes), rotated {} times",
        metrics.messages_written(),
        metrics.bytes_written(),
        metrics.rotations()
    );

    logger.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/application.log' and its .N.gz backups");

    Ok(())
}
