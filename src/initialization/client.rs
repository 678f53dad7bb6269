//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use reqwest::ClientBuilder;

/// Initializes the HTTP client shared by every fetch probe.
///
/// Creates a `reqwest::Client` configured with:
/// - The fixed User-Agent from the configuration
/// - The per-request timeout from the configuration
/// - Certificate validation disabled
///
/// Subscription endpoints are consumer-run and routinely serve self-signed or
/// expired certificates. The relaxed validation applies to this client only;
/// nothing else in the crate builds a client.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(true)
        .build()?;
    Ok(Arc::new(client))
}
