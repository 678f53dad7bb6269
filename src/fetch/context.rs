//! Shared resources for fetch probes.

use std::sync::Arc;

use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::error_handling::ProcessingStats;

/// Context containing the shared resources every probe needs.
///
/// Cheap to clone; each spawned probe gets its own copy.
#[derive(Clone)]
pub struct FetchContext {
    /// HTTP client (timeout, user agent and certificate policy preconfigured)
    pub client: Arc<reqwest::Client>,
    /// Error and info counters for the cycle
    pub stats: Arc<ProcessingStats>,
    /// Extra attempts after a transient failure
    pub max_retries: usize,
    /// Bodies larger than this are rejected
    pub max_body_bytes: usize,
}

impl FetchContext {
    pub fn new(
        client: Arc<reqwest::Client>,
        stats: Arc<ProcessingStats>,
        max_retries: usize,
    ) -> Self {
        Self {
            client,
            stats,
            max_retries,
            max_body_bytes: MAX_RESPONSE_BODY_SIZE,
        }
    }

    /// Overrides the response byte ceiling.
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
