//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources of a
//! collection cycle:
//! - Logger
//! - HTTP client
//! - Concurrency semaphore

mod client;
mod logger;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Initializes a semaphore for controlling concurrency.
///
/// The semaphore caps the number of probes in flight. It is a concurrency
/// ceiling, not a rate limit.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}
