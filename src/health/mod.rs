//! Per-source health tracking.
//!
//! Each cycle the registry consumes the external quality report, updates
//! failure streaks and statuses, and orders sources for fetching:
//! - reported bad: streak + 1, otherwise streak reset to 0
//! - streak >= dead threshold: `dead` (not fetched)
//! - `dead` sticks until `HealthRegistry::reactivate` or a ledger edit
//! - streak > 0: `unstable`
//! - otherwise `active` (or `new` until the first evaluation)

mod record;
mod registry;
mod report;

// Re-export public API
pub use record::{source_id_for, FetchMode, SourceRecord, SourceStatus};
pub use registry::HealthRegistry;
pub use report::load_quality_report;
