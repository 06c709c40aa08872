//! Async logging example
//!
//! Demonstrates the background writer with binary frames from several threads,
//! then reads the file back.
//!
//! Run with: cargo run --example async_logging

use rust_log_engine::encoders::FrameReader;
use rust_log_engine::prelude::*;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Log Engine - Async Logging Example ===\n");

    let config = LoggerConfig {
        format: OutputFormat::Binary,
        async_mode: true,
        queue_capacity: Some(10_000),
        ..LoggerConfig::file("async_test.bin")
    };
    let logger = Arc::new(Logger::new(config)?);

    println!("1. Multi-threaded logging:");
    let handles: Vec<_> = (0..5u64)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20u64 {
                    logger.info("Worker message", &[Field::new("thread", thread_id), Field::new("seq", i)]);
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("worker thread panicked");
        }
    }
    println!("   5 threads logged 20 messages each");

    // Drains the queue and closes the file
    logger.shutdown();
    println!("   Dropped frames: {}", logger.dropped_count());

    println!("\n2. Reading the binary frames back:");
    let bytes = std::fs::read("async_test.bin")?;
    let mut count = 0;
    for entry in FrameReader::new(&bytes) {
        let entry = entry?;
        if count < 3 {
            let fields: Vec<String> = entry.fields.iter().map(ToString::to_string).collect();
            println!("   [{}] {} {}", entry.level, entry.message, fields.join(" "));
        }
        count += 1;
    }
    println!("   {} frames decoded", count);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
