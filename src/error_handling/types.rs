//! Error type definitions.
//!
//! This module defines the error types and the counted error/info categories
//! used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for reading and writing the ledger and the cycle's output files.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unwritable CSV.
    #[error("Storage CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Package serialization failure.
    #[error("Storage YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure of a single HTTP attempt against a source.
///
/// These never leave the fetch probe; they are logged, counted and then
/// folded into "no content".
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (timeout, connection, TLS, body read).
    #[error("request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The server answered with a non-2xx status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The body exceeded the configured byte ceiling.
    #[error("response body larger than {limit} bytes")]
    BodyTooLarge {
        /// Configured ceiling in bytes
        limit: usize,
    },

    /// The server answered 2xx with nothing usable in the body.
    #[error("empty response body")]
    EmptyBody,
}

/// Types of errors that can occur while probing a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // HTTP/Network errors
    HttpRequestTimeoutError,
    HttpRequestConnectError,
    HttpRequestBodyError,
    HttpRequestOtherError,
    HttpRequestTooManyRequests,
    HttpRequestNotFound,
    HttpRequestClientError,
    HttpRequestServerError,
    // Content errors
    ResponseTooLarge,
    EmptyResponse,
    NoNodesParsed,
    // Scheduler-level errors
    ProbeTimeout,
    ProbeTaskPanicked,
}

/// Informational metrics recorded during a collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// Source answered on the structured API shape
    ApiShapeHit,
    /// Source answered on the raw blob shape
    RawShapeHit,
    /// Parsed node had no usable identity and was dropped
    UnfingerprintableNode,
    /// Parsed node collapsed into an existing fingerprint
    DuplicateNode,
    /// Source finished after the quota was met; its nodes were discarded
    LateSourceDiscarded,
    /// Retry of a transient HTTP failure
    HttpRetry,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
            ErrorType::HttpRequestTooManyRequests => "Too many requests (429)",
            ErrorType::HttpRequestNotFound => "Not Found (404)",
            ErrorType::HttpRequestClientError => "Other client error (4xx)",
            ErrorType::HttpRequestServerError => "Server error (5xx)",
            ErrorType::ResponseTooLarge => "Response body too large",
            ErrorType::EmptyResponse => "Empty response body",
            ErrorType::NoNodesParsed => "No nodes parsed from response",
            ErrorType::ProbeTimeout => "Probe timeout",
            ErrorType::ProbeTaskPanicked => "Probe task panicked",
        }
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::ApiShapeHit => "Structured API shape",
            InfoType::RawShapeHit => "Raw blob shape",
            InfoType::UnfingerprintableNode => "Unfingerprintable node dropped",
            InfoType::DuplicateNode => "Duplicate node dropped",
            InfoType::LateSourceDiscarded => "Source finished after quota",
            InfoType::HttpRetry => "HTTP retry",
        }
    }
}
