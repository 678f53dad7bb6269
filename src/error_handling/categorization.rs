//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize fetch errors and configure
//! the retry strategy used by the fetch probe.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{ErrorType, FetchError};
use crate::config::HTTP_STATUS_TOO_MANY_REQUESTS;

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - At most `max_retries` delays, i.e. `max_retries + 1` attempts in total
pub fn get_retry_strategy(max_retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(max_retries)
}

/// Categorizes a status code into an `ErrorType`.
fn categorize_status(code: u16) -> ErrorType {
    match code {
        404 => ErrorType::HttpRequestNotFound,
        HTTP_STATUS_TOO_MANY_REQUESTS => ErrorType::HttpRequestTooManyRequests,
        400..=499 => ErrorType::HttpRequestClientError,
        500..=599 => ErrorType::HttpRequestServerError,
        _ => ErrorType::HttpRequestOtherError,
    }
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if let Some(status) = error.status() {
        return categorize_status(status.as_u16());
    }

    if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_body() || error.is_decode() {
        ErrorType::HttpRequestBodyError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Categorizes a `FetchError` into an `ErrorType`.
pub fn categorize_fetch_error(error: &FetchError) -> ErrorType {
    match error {
        FetchError::Request(e) => categorize_reqwest_error(e),
        FetchError::Status(code) => categorize_status(*code),
        FetchError::BodyTooLarge { .. } => ErrorType::ResponseTooLarge,
        FetchError::EmptyBody => ErrorType::EmptyResponse,
    }
}

/// Determines if a fetch error is worth another attempt.
///
/// Timeouts, connection failures, 5xx and 429 are transient; other client
/// errors, oversized and empty bodies are not.
pub fn is_retriable(error: &FetchError) -> bool {
    match error {
        FetchError::Request(e) => {
            if let Some(status) = e.status() {
                return is_retriable_status(status.as_u16());
            }
            e.is_timeout() || e.is_connect() || e.is_request()
        }
        FetchError::Status(code) => is_retriable_status(*code),
        FetchError::BodyTooLarge { .. } | FetchError::EmptyBody => false,
    }
}

fn is_retriable_status(code: u16) -> bool {
    code == HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(&code)
}
