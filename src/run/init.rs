//! Cycle start: ledger and quality report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;

use crate::config::Config;
use crate::health::{load_quality_report, HealthRegistry};
use crate::storage::load_ledger;

/// Loads the ledger and applies the quality report of the previous cycle.
///
/// The returned registry is evaluated and sorted into priority order, ready
/// for `fetch_plan`.
///
/// # Errors
///
/// Returns an error if the ledger exists but cannot be read. A missing or
/// broken quality report only logs a warning.
pub fn load_registry(config: &Config, now: DateTime<Utc>) -> Result<HealthRegistry> {
    let records = load_ledger(&config.ledger_path).with_context(|| {
        format!("Failed to load source ledger {}", config.ledger_path.display())
    })?;
    let mut registry = HealthRegistry::from_records(records, config.dead_threshold);

    let reported_bad = load_quality_report(&config.report_path);
    registry.evaluate(&reported_bad, now);
    registry.prioritize();

    info!(
        "{} sources in ledger, {} reported bad, {} dead",
        registry.len(),
        reported_bad.len(),
        registry.dead_count()
    );
    Ok(registry)
}
