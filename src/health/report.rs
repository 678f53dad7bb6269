//! Quality report produced by the external node checker.

use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;

/// Column holding the ids of sources whose nodes failed validation.
const FAILED_ID_COLUMN: &str = "failed_id";

/// Loads the set of reported-bad source ids.
///
/// A missing, unreadable or malformed report counts as "no reports": the
/// cycle continues with an empty set.
pub fn load_quality_report(path: &Path) -> HashSet<String> {
    if !path.exists() {
        info!("No quality report at {}, assuming no failures", path.display());
        return HashSet::new();
    }
    match read_failed_ids(path) {
        Ok(ids) => {
            info!("Quality report lists {} failing sources", ids.len());
            ids
        }
        Err(e) => {
            warn!(
                "Ignoring unreadable quality report {}: {e}",
                path.display()
            );
            HashSet::new()
        }
    }
}

fn read_failed_ids(path: &Path) -> Result<HashSet<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let column = reader
        .headers()?
        .iter()
        .position(|h| h == FAILED_ID_COLUMN);
    let Some(column) = column else {
        warn!(
            "Quality report {} has no '{FAILED_ID_COLUMN}' column",
            path.display()
        );
        return Ok(HashSet::new());
    };

    let mut ids = HashSet::new();
    for row in reader.records() {
        if let Some(id) = row?.get(column).filter(|id| !id.is_empty()) {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}
