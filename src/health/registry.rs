//! In-memory health registry.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

use super::record::{source_id_for, FetchMode, SourceRecord, SourceStatus};

/// Owns every [`SourceRecord`] for the duration of a cycle.
///
/// The scheduler holds the registry by `&mut` and is the only writer; fetch
/// tasks never see it. Records keep ledger order until [`prioritize`] is
/// called.
///
/// [`prioritize`]: HealthRegistry::prioritize
#[derive(Debug)]
pub struct HealthRegistry {
    records: Vec<SourceRecord>,
    index: HashMap<String, usize>,
    dead_threshold: u32,
    /// Sources whose streak was already incremented this cycle
    penalized: HashSet<String>,
}

impl HealthRegistry {
    /// Builds a registry from ledger rows.
    ///
    /// Rows without an id get one derived from their URL. Rows with an
    /// empty URL are skipped, and of several rows sharing an id the first
    /// one wins.
    pub fn from_records(records: Vec<SourceRecord>, dead_threshold: u32) -> Self {
        let mut registry = Self {
            records: Vec::with_capacity(records.len()),
            index: HashMap::new(),
            dead_threshold,
            penalized: HashSet::new(),
        };
        for mut record in records {
            if record.url.trim().is_empty() {
                warn!("Skipping ledger row without URL (id '{}')", record.id);
                continue;
            }
            if record.id.trim().is_empty() {
                record.id = source_id_for(&record.url);
            }
            if registry.index.contains_key(&record.id) {
                warn!("Duplicate source id {} in ledger, keeping first row", record.id);
                continue;
            }
            registry.push(record);
        }
        registry
    }

    fn push(&mut self, record: SourceRecord) {
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }

    fn reindex(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
    }

    /// Adds a new source for `url`. Returns `false` if it is already tracked.
    pub fn add_url(&mut self, url: &str, fetch_mode: FetchMode) -> bool {
        let record = SourceRecord::new(url, fetch_mode);
        if record.url.is_empty() || self.index.contains_key(&record.id) {
            return false;
        }
        self.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&SourceRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn dead_threshold(&self) -> u32 {
        self.dead_threshold
    }

    fn status_for(&self, streak: u32, never_reported: bool) -> SourceStatus {
        if streak >= self.dead_threshold {
            SourceStatus::Dead
        } else if streak > 0 {
            SourceStatus::Unstable
        } else if never_reported {
            SourceStatus::New
        } else {
            SourceStatus::Active
        }
    }

    /// Applies the quality report for this cycle.
    ///
    /// Reported sources get their streak incremented, all others reset to
    /// zero. A source that has never been evaluated keeps `new` status for
    /// its first healthy cycle.
    ///
    /// `dead` is sticky: a dead source that drops out of the report keeps its
    /// streak and status until [`HealthRegistry::reactivate`] is called or the
    /// ledger entry is edited.
    pub fn evaluate(&mut self, reported_bad: &HashSet<String>, now: DateTime<Utc>) {
        self.penalized.clear();
        for i in 0..self.records.len() {
            let (streak, never_reported) = {
                let record = &mut self.records[i];
                if reported_bad.contains(&record.id) {
                    record.failure_streak = record.failure_streak.saturating_add(1);
                    self.penalized.insert(record.id.clone());
                } else if record.status == SourceStatus::Dead {
                    debug!("Source {} stays dead until reactivated", record.id);
                    record.last_report_time = Some(now);
                    continue;
                } else {
                    record.failure_streak = 0;
                }
                (record.failure_streak, record.last_report_time.is_none())
            };
            let status = self.status_for(streak, never_reported);
            let record = &mut self.records[i];
            record.status = status;
            record.last_report_time = Some(now);
        }
    }

    /// Clears the streak of `id` and returns it to `active` (or `new` if it
    /// was never evaluated). Returns `false` if the source is unknown.
    pub fn reactivate(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else {
            warn!("Cannot reactivate unknown source {id}");
            return false;
        };
        let never_reported = self.records[i].last_report_time.is_none();
        let status = self.status_for(0, never_reported);
        let record = &mut self.records[i];
        record.failure_streak = 0;
        record.status = status;
        info!("Source {id} reactivated as {status}");
        true
    }

    /// Stable-sorts the records by `(status rank, failure streak)`.
    pub fn prioritize(&mut self) {
        self.records.sort_by_key(SourceRecord::priority);
        self.reindex();
    }

    /// Sources to fetch this cycle, in priority order. Dead sources are
    /// excluded.
    pub fn fetch_plan(&self) -> Vec<SourceRecord> {
        self.records
            .iter()
            .filter(|r| r.status != SourceStatus::Dead)
            .cloned()
            .collect()
    }

    /// Number of sources currently classified dead.
    pub fn dead_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == SourceStatus::Dead)
            .count()
    }

    /// Records a fetch that produced `node_count` parsed nodes.
    pub fn record_fetch_success(&mut self, id: &str, node_count: usize, now: DateTime<Utc>) {
        let Some(&i) = self.index.get(id) else {
            warn!("Fetch result for unknown source {id}");
            return;
        };
        let record = &mut self.records[i];
        record.estimated_node_count = node_count as u64;
        record.last_check_time = Some(now);
    }

    /// Records a fetch that produced nothing usable.
    ///
    /// The streak is incremented at most once per cycle: a source already
    /// penalized by the quality report is not penalized again.
    pub fn record_fetch_failure(&mut self, id: &str, now: DateTime<Utc>) {
        let Some(&i) = self.index.get(id) else {
            warn!("Fetch result for unknown source {id}");
            return;
        };
        if self.penalized.insert(id.to_string()) {
            let record = &mut self.records[i];
            record.failure_streak = record.failure_streak.saturating_add(1);
        }
        let streak = self.records[i].failure_streak;
        let status = self.status_for(streak, false);
        let record = &mut self.records[i];
        record.estimated_node_count = 0;
        record.last_check_time = Some(now);
        if record.status != status {
            debug!("Source {id} is now {status} (streak {streak})");
        }
        record.status = status;
    }

    /// Consumes the registry, returning the records in their current order.
    pub fn into_records(self) -> Vec<SourceRecord> {
        self.records
    }
}
