//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters the coordinator updates as probes complete.
///
/// Read by the periodic progress logger; written only by the coordinator.
#[derive(Debug, Default)]
pub struct CycleProgress {
    pub dispatched: AtomicUsize,
    pub completed: AtomicUsize,
    pub failed: AtomicUsize,
    pub unique_nodes: AtomicUsize,
}

impl CycleProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Logs progress information about the collection cycle.
///
/// # Arguments
///
/// * `start_time` - The start time of the cycle
/// * `total_sources` - Number of sources in the fetch plan
/// * `progress` - Shared progress counters
pub fn log_progress(
    start_time: std::time::Instant,
    total_sources: usize,
    progress: &CycleProgress,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = progress.completed.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Probed {}/{} sources ({} failed, {} in flight), {} unique nodes in {:.2} seconds (~{:.2} sources/sec)",
        completed,
        total_sources,
        progress.failed.load(Ordering::SeqCst),
        progress
            .dispatched
            .load(Ordering::SeqCst)
            .saturating_sub(completed),
        progress.unique_nodes.load(Ordering::SeqCst),
        elapsed_secs,
        rate
    );
}
