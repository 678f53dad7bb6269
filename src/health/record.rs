//! Source records and their enums.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::config::{SOURCE_ID_HASH_LEN, SOURCE_ID_PREFIX};

/// Derives the stable id of a source from its URL.
///
/// Content-addressed: the same URL always yields the same id.
pub fn source_id_for(url: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(url.trim().as_bytes()));
    format!("{SOURCE_ID_PREFIX}{}", &digest[..SOURCE_ID_HASH_LEN])
}

/// Health classification of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceStatus {
    #[default]
    New,
    Active,
    Unstable,
    Dead,
}

impl SourceStatus {
    /// Scheduling rank; lower is fetched first.
    pub fn rank(&self) -> u8 {
        match self {
            SourceStatus::Active => 0,
            SourceStatus::New => 1,
            SourceStatus::Unstable => 2,
            SourceStatus::Dead => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::New => "new",
            SourceStatus::Active => "active",
            SourceStatus::Unstable => "unstable",
            SourceStatus::Dead => "dead",
        }
    }
}

impl FromStr for SourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "new" => Ok(SourceStatus::New),
            "active" => Ok(SourceStatus::Active),
            "unstable" => Ok(SourceStatus::Unstable),
            "dead" => Ok(SourceStatus::Dead),
            other => Err(format!("unknown source status '{other}'")),
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which response shape(s) to probe for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Try the structured API suffix, then the bare URL
    #[default]
    Auto,
    /// Only the structured API suffix
    Api,
    /// Only the bare URL
    Raw,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Auto => "auto",
            FetchMode::Api => "api",
            FetchMode::Raw => "raw",
        }
    }

    /// Reads a ledger `type` value. Anything unrecognized is treated as auto.
    pub fn from_ledger(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "api" | "api-suffix" => FetchMode::Api,
            "raw" => FetchMode::Raw,
            _ => FetchMode::Auto,
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked subscription endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub id: String,
    pub url: String,
    pub fetch_mode: FetchMode,
    pub status: SourceStatus,
    /// Consecutive cycles without usable content
    pub failure_streak: u32,
    /// Last health evaluation
    pub last_report_time: Option<DateTime<Utc>>,
    /// Last network attempt
    pub last_check_time: Option<DateTime<Utc>>,
    /// Node count of the last successful fetch
    pub estimated_node_count: u64,
}

impl SourceRecord {
    /// Creates a `new` record for `url` with a derived id.
    pub fn new(url: &str, fetch_mode: FetchMode) -> Self {
        Self {
            id: source_id_for(url),
            url: url.trim().to_string(),
            fetch_mode,
            status: SourceStatus::New,
            failure_streak: 0,
            last_report_time: None,
            last_check_time: None,
            estimated_node_count: 0,
        }
    }

    /// Sort key for scheduling: `(status rank, failure streak)`.
    pub fn priority(&self) -> (u8, u32) {
        (self.status.rank(), self.failure_streak)
    }
}
