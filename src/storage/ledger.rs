//! Source ledger (CSV).
//!
//! Header: `id,url,type,status,last_report_time,last_check_time,failure_streak,estimated_node_count`.
//! Older ledgers with an `estimated_raw_node_count` column, or with only a
//! `url` column, load as well; missing values take their defaults.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::write_atomically;
use crate::error_handling::StorageError;
use crate::health::{FetchMode, SourceRecord, SourceStatus};

const LEDGER_HEADER: [&str; 8] = [
    "id",
    "url",
    "type",
    "status",
    "last_report_time",
    "last_check_time",
    "failure_streak",
    "estimated_node_count",
];

/// One ledger row as stored. Every field is text so that hand-edited rows
/// with blanks or typos degrade per field instead of failing the row.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "type", default)]
    fetch_mode: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    last_report_time: String,
    #[serde(default)]
    last_check_time: String,
    #[serde(default)]
    failure_streak: String,
    #[serde(default, alias = "estimated_raw_node_count")]
    estimated_node_count: String,
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

fn format_time(value: Option<DateTime<Utc>>) -> String {
    value.map(|t| t.to_rfc3339()).unwrap_or_default()
}

impl LedgerRow {
    fn into_record(self) -> SourceRecord {
        let status = self.status.parse().unwrap_or_else(|e| {
            warn!("Row {}: {e}, treating as new", self.url);
            SourceStatus::New
        });
        SourceRecord {
            id: self.id.trim().to_string(),
            url: self.url.trim().to_string(),
            fetch_mode: FetchMode::from_ledger(&self.fetch_mode),
            status,
            failure_streak: self.failure_streak.trim().parse().unwrap_or(0),
            last_report_time: parse_time(&self.last_report_time),
            last_check_time: parse_time(&self.last_check_time),
            estimated_node_count: self.estimated_node_count.trim().parse().unwrap_or(0),
        }
    }

    fn from_record(record: &SourceRecord) -> Self {
        Self {
            id: record.id.clone(),
            url: record.url.clone(),
            fetch_mode: record.fetch_mode.as_str().to_string(),
            status: record.status.as_str().to_string(),
            last_report_time: format_time(record.last_report_time),
            last_check_time: format_time(record.last_check_time),
            failure_streak: record.failure_streak.to_string(),
            estimated_node_count: record.estimated_node_count.to_string(),
        }
    }
}

/// Loads the ledger. A missing file is an empty ledger.
///
/// Lines starting with `#` are comments. Rows that cannot be decoded are
/// skipped with a warning.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be opened or its header
/// cannot be read.
pub fn load_ledger(path: &Path) -> Result<Vec<SourceRecord>, StorageError> {
    if !path.exists() {
        info!("No ledger at {}, starting empty", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    reader.headers()?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<LedgerRow>().enumerate() {
        match row {
            Ok(row) => records.push(row.into_record()),
            Err(e) => warn!("Skipping ledger row {}: {e}", line + 1),
        }
    }
    info!("Loaded {} sources from {}", records.len(), path.display());
    Ok(records)
}

/// Rewrites the ledger in full.
///
/// The rows go to a temporary sibling first and replace the ledger with a
/// rename, so a crash mid-write leaves the previous ledger intact.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn save_ledger(path: &Path, records: &[SourceRecord]) -> Result<(), StorageError> {
    write_atomically(path, |file| {
        // header written by hand so an empty ledger still has one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(LEDGER_HEADER)?;
        for record in records {
            writer.serialize(LedgerRow::from_record(record))?;
        }
        writer.flush()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_ledger_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_ledger(&dir.path().join("none.csv")).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.csv");
        let now = DateTime::parse_from_rfc3339("2024-05-01T10:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        let records = vec![
            SourceRecord {
                status: SourceStatus::Unstable,
                failure_streak: 3,
                last_report_time: Some(now),
                last_check_time: Some(now),
                estimated_node_count: 120,
                ..SourceRecord::new("https://a.example/sub?token=x,y", FetchMode::Api)
            },
            SourceRecord::new("https://b.example", FetchMode::Auto),
        ];
        save_ledger(&path, &records).unwrap();
        assert_eq!(load_ledger(&path).unwrap(), records);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(
            "id,url,type,status,last_report_time,last_check_time,failure_streak,estimated_node_count"
        ));
        assert!(!dir.path().join("ledger.csv.tmp").exists());
    }

    #[test]
    fn test_legacy_and_sparse_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(
            &path,
            "id,url,type,status,last_report_time,failure_streak,estimated_raw_node_count\n\
             # disabled for now\n\
             sub_1,https://a.example,raw,active,2024-01-01T00:00:00.123456+00:00,0,77\n\
             ,https://b.example,,,,,\n\
             sub_3,https://c.example,api,bogus,not-a-date,x,\n",
        )
        .unwrap();

        let records = load_ledger(&path).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].id, "sub_1");
        assert_eq!(records[0].fetch_mode, FetchMode::Raw);
        assert_eq!(records[0].status, SourceStatus::Active);
        assert_eq!(records[0].estimated_node_count, 77);
        assert!(records[0].last_report_time.is_some());
        assert!(records[0].last_check_time.is_none());

        assert!(records[1].id.is_empty());
        assert_eq!(records[1].status, SourceStatus::New);
        assert_eq!(records[1].fetch_mode, FetchMode::Auto);

        assert_eq!(records[2].status, SourceStatus::New);
        assert_eq!(records[2].failure_streak, 0);
        assert!(records[2].last_report_time.is_none());
    }

    #[test]
    fn test_empty_ledger_keeps_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.csv");
        save_ledger(&path, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim(),
            LEDGER_HEADER.join(",")
        );
        assert!(load_ledger(&path).unwrap().is_empty());
    }

    #[test]
    fn test_url_only_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "url\nhttps://a.example\nhttps://b.example\n").unwrap();
        let records = load_ledger(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].url, "https://b.example");
    }
}
