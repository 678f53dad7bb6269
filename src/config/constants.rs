//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including timeouts, size limits, file names and collection quotas.

use std::time::Duration;

/// Path suffix appended to a source URL when probing the structured API shape.
pub const API_SUFFIX: &str = "/clash/proxies";

/// Default User-Agent string for subscription requests.
///
/// Subscription endpoints frequently switch response format on the client
/// identity, so every request sends the same value.
pub const DEFAULT_USER_AGENT: &str = "clash";

/// Seconds between progress log lines while a collection is running.
pub const LOGGING_INTERVAL: u64 = 5;

/// Extra time a single probe gets on top of its request budget before the
/// scheduler gives up on it.
pub const PROBE_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

// Default file layout
pub const DEFAULT_LEDGER_PATH: &str = "link_database.csv";
pub const DEFAULT_REPORT_PATH: &str = "quality_report.csv";
pub const DEFAULT_CACHE_DIR: &str = "cached_subs";
pub const DEFAULT_PACKAGE_PATH: &str = "clash.yaml";
pub const DEFAULT_MANIFEST_PATH: &str = "sub_list_for_testing.txt";
pub const DEFAULT_SOURCE_LIST_PATH: &str = "final_source_list.txt";

// Collection defaults
/// Unique nodes to gather before the scheduler stops dispatching new probes.
pub const DEFAULT_NODE_QUOTA: usize = 50_000;
/// Hard cap on the number of nodes written to the package.
pub const DEFAULT_OUTPUT_CAP: usize = 20_500;
/// Consecutive bad cycles after which a source is considered dead.
pub const DEFAULT_DEAD_THRESHOLD: u32 = 10;
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_MAX_RETRIES: usize = 1;

// Response and body size limits
/// Maximum response body size in bytes (16MB)
/// Larger subscription bodies are dropped to keep memory bounded
pub const MAX_RESPONSE_BODY_SIZE: usize = 16 * 1024 * 1024;

// Source identifiers
pub const SOURCE_ID_PREFIX: &str = "sub_";
/// Number of hex digits of the URL hash kept in a source id.
pub const SOURCE_ID_HASH_LEN: usize = 10;

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 250;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 2;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
