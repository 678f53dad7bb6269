//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions and categorization
//! - Processing statistics tracking (errors and info metrics)
//! - Retry strategy configuration
//!
//! Nothing here is fatal to a collection cycle: fetch errors are categorized,
//! counted and then degrade to "no content" for the affected source.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_fetch_error, categorize_reqwest_error, get_retry_strategy, is_retriable,
};
pub use stats::ProcessingStats;
pub use types::{ErrorType, FetchError, InfoType, InitializationError, StorageError};
