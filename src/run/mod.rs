//! Collection cycle orchestration.
//!
//! One cycle: load the ledger and quality report, probe sources in priority
//! order until the node quota is met, package a capped sample of the unique
//! nodes and persist the updated ledger.

mod finalize;
mod init;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;

use crate::app::{print_cycle_summary, print_error_statistics};
use crate::collect::{collect, make_rng, select_output, CollectLimits, CollectionOutcome};
use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::fetch::FetchContext;
use crate::initialization::init_client;
use crate::storage::{prepare_cache_dir, save_ledger};

use finalize::{write_cache_and_manifest, write_package_and_sources};
use init::load_registry;

/// Results of one collection cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Sources in the ledger
    pub total_sources: usize,
    /// Sources probed this cycle
    pub dispatched: usize,
    /// Probes that yielded at least one node
    pub succeeded: usize,
    /// Probes that yielded nothing
    pub failed: usize,
    /// Sources excluded as dead
    pub dead: usize,
    /// Unique nodes collected before the output cap
    pub unique_nodes: usize,
    /// Nodes written to the package
    pub emitted_nodes: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Runs one collection cycle with the provided configuration.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the ledger cannot be
/// read, the HTTP client cannot be built, or any output file cannot be
/// written. Failures of individual sources are never errors; they are
/// recorded in the ledger.
///
/// # Example
///
/// ```no_run
/// use sub_curator::{run_cycle, Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let report = run_cycle(Config::default()).await?;
/// println!("{} nodes from {} sources", report.emitted_nodes, report.succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn run_cycle(config: Config) -> Result<CycleReport> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    let start_time = Instant::now();
    let mut registry = load_registry(&config, Utc::now())?;
    let mut report = CycleReport {
        total_sources: registry.len(),
        dead: registry.dead_count(),
        ..Default::default()
    };

    prepare_cache_dir(&config.cache_dir).with_context(|| {
        format!("Failed to prepare cache directory {}", config.cache_dir.display())
    })?;

    let plan = registry.fetch_plan();
    let stats = Arc::new(ProcessingStats::new());
    let outcome = if plan.is_empty() {
        info!("No live sources, writing an empty package");
        CollectionOutcome::default()
    } else {
        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let ctx = FetchContext::new(client, Arc::clone(&stats), config.max_retries);
        let limits = CollectLimits {
            node_quota: config.node_quota,
            max_concurrency: config.max_concurrency,
            probe_timeout: config.probe_timeout(),
        };
        info!(
            "Probing up to {} sources (quota {}, concurrency {})",
            plan.len(),
            limits.node_quota,
            limits.max_concurrency
        );
        collect(&ctx, plan, limits, &mut registry).await
    };

    report.dispatched = outcome.dispatched;
    report.succeeded = outcome.succeeded;
    report.failed = outcome.failed;
    report.unique_nodes = outcome.unique.len();

    write_cache_and_manifest(&config, &outcome)?;

    let mut rng = make_rng(config.seed);
    let CollectionOutcome {
        unique, consumed, ..
    } = outcome;
    let selected = select_output(unique.into_nodes(), config.output_cap, &mut rng);
    report.emitted_nodes = selected.len();
    write_package_and_sources(&config, &selected, &consumed)?;

    save_ledger(&config.ledger_path, &registry.into_records()).with_context(|| {
        format!("Failed to save source ledger {}", config.ledger_path.display())
    })?;

    report.elapsed_seconds = start_time.elapsed().as_secs_f64();
    print_error_statistics(&stats);
    print_cycle_summary(
        report.succeeded,
        report.failed,
        report.emitted_nodes,
        report.elapsed_seconds,
    );
    Ok(report)
}
