//! Collection scheduler.
//!
//! The coordinator dispatches probes in priority order under a concurrency
//! ceiling and merges each result as it completes. It is the single writer
//! for the unique node set and the health registry; probe tasks only read
//! their own source and return content.
//!
//! Once the unique set reaches the node quota no further probes are
//! dispatched. Probes already in flight run to completion: their sources
//! still get their health updated, but their nodes are discarded.

mod dedup;
mod select;

pub use dedup::{InsertOutcome, UniqueNodes};
pub use select::{make_rng, select_output};

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::app::{log_progress, shutdown_gracefully, CycleProgress};
use crate::config::LOGGING_INTERVAL;
use crate::error_handling::{ErrorType, InfoType};
use crate::fetch::{probe_source, FetchContext, FetchedContent};
use crate::health::{HealthRegistry, SourceRecord};
use crate::initialization::init_semaphore;

/// Bounds of one collection run.
#[derive(Debug, Clone, Copy)]
pub struct CollectLimits {
    /// Unique nodes after which no further sources are dispatched
    pub node_quota: usize,
    /// Maximum probes in flight
    pub max_concurrency: usize,
    /// Outer budget for a single probe, retries included
    pub probe_timeout: Duration,
}

/// A source whose nodes were merged into the unique set.
#[derive(Debug, Clone)]
pub struct ConsumedSource {
    pub id: String,
    pub url: String,
    /// Raw body the nodes were parsed from
    pub body: String,
    /// Nodes from this source that were new to the unique set
    pub new_nodes: usize,
}

/// Everything a collection run produced.
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    pub unique: UniqueNodes,
    /// Consumed sources in merge order
    pub consumed: Vec<ConsumedSource>,
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Successful sources that finished after the quota was met
    pub late_discarded: usize,
}

impl CollectionOutcome {
    /// Consumed sources that added at least one node.
    pub fn contributors(&self) -> impl Iterator<Item = &ConsumedSource> {
        self.consumed.iter().filter(|s| s.new_nodes > 0)
    }
}

type ProbeResult = Result<
    Result<Option<FetchedContent>, tokio::time::error::Elapsed>,
    tokio::task::JoinError,
>;

/// Runs the probes of `plan` and merges their nodes.
///
/// `plan` must already be in priority order; sources are dispatched front to
/// back. Every probe outcome is recorded in `registry`.
pub async fn collect(
    ctx: &FetchContext,
    plan: Vec<SourceRecord>,
    limits: CollectLimits,
    registry: &mut HealthRegistry,
) -> CollectionOutcome {
    let total_sources = plan.len();
    let mut pending: VecDeque<SourceRecord> = plan.into();
    let mut outcome = CollectionOutcome::default();

    let semaphore = init_semaphore(limits.max_concurrency.max(1));
    let mut tasks = FuturesUnordered::new();

    let start_time = Instant::now();
    let progress = Arc::new(CycleProgress::new());
    let cancel = CancellationToken::new();
    let cancel_logging = cancel.child_token();
    let progress_for_logging = Arc::clone(&progress);
    let logging_task = tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL));
        // the first tick fires immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    log_progress(start_time, total_sources, &progress_for_logging);
                }
                _ = cancel_logging.cancelled() => {
                    break;
                }
            }
        }
    });

    let mut quota_logged = false;
    loop {
        let quota_reached = outcome.unique.len() >= limits.node_quota;
        if quota_reached && !quota_logged && !pending.is_empty() {
            info!(
                "Node quota of {} reached, skipping {} undispatched sources",
                limits.node_quota,
                pending.len()
            );
            quota_logged = true;
        }
        let can_dispatch = !quota_reached && !pending.is_empty();
        if !can_dispatch && tasks.is_empty() {
            break;
        }

        tokio::select! {
            biased;

            Some((source, joined)) = tasks.next(), if !tasks.is_empty() => {
                merge_result(ctx, registry, &mut outcome, &limits, source, joined);
                progress.completed.fetch_add(1, Ordering::SeqCst);
                progress.failed.store(outcome.failed, Ordering::SeqCst);
                progress.unique_nodes.store(outcome.unique.len(), Ordering::SeqCst);
            }
            permit = Arc::clone(&semaphore).acquire_owned(), if can_dispatch => {
                let Ok(permit) = permit else {
                    warn!("Semaphore closed, no further sources dispatched");
                    pending.clear();
                    continue;
                };
                let Some(source) = pending.pop_front() else {
                    continue;
                };

                outcome.dispatched += 1;
                progress.dispatched.fetch_add(1, Ordering::SeqCst);
                debug!("Dispatching {} ({})", source.id, source.url);

                let task_ctx = ctx.clone();
                let url = source.url.clone();
                let mode = source.fetch_mode;
                let handle = tokio::spawn(async move {
                    let probe = probe_source(&task_ctx, &url, mode);
                    tokio::time::timeout(limits.probe_timeout, probe).await
                });
                // the permit is released only once the result is handed to the merge
                tasks.push(async move {
                    let joined = handle.await;
                    drop(permit);
                    (source, joined)
                });
            }
            else => break,
        }
    }

    shutdown_gracefully(cancel, Some(logging_task)).await;
    log_progress(start_time, total_sources, &progress);

    outcome
}

fn merge_result(
    ctx: &FetchContext,
    registry: &mut HealthRegistry,
    outcome: &mut CollectionOutcome,
    limits: &CollectLimits,
    source: SourceRecord,
    joined: ProbeResult,
) {
    let now = Utc::now();
    let content = match joined {
        Ok(Ok(Some(content))) => content,
        Ok(Ok(None)) => {
            debug!("No usable content from {}", source.url);
            registry.record_fetch_failure(&source.id, now);
            outcome.failed += 1;
            return;
        }
        Ok(Err(_)) => {
            warn!(
                "Probe of {} exceeded {:?}, treating as failed",
                source.url, limits.probe_timeout
            );
            ctx.stats.increment_error(ErrorType::ProbeTimeout);
            registry.record_fetch_failure(&source.id, now);
            outcome.failed += 1;
            return;
        }
        Err(join_error) => {
            warn!("Probe task for {} panicked: {join_error}", source.url);
            ctx.stats.increment_error(ErrorType::ProbeTaskPanicked);
            registry.record_fetch_failure(&source.id, now);
            outcome.failed += 1;
            return;
        }
    };

    registry.record_fetch_success(&source.id, content.nodes.len(), now);
    outcome.succeeded += 1;

    if outcome.unique.len() >= limits.node_quota {
        debug!(
            "Discarding {} nodes from {}, quota already met",
            content.nodes.len(),
            source.id
        );
        ctx.stats.increment_info(InfoType::LateSourceDiscarded);
        outcome.late_discarded += 1;
        return;
    }

    let mut new_nodes = 0;
    for node in content.nodes {
        match outcome.unique.insert(node.with_source(&source.id)) {
            InsertOutcome::Inserted => new_nodes += 1,
            InsertOutcome::Duplicate => ctx.stats.increment_info(InfoType::DuplicateNode),
            InsertOutcome::Unfingerprintable => {
                ctx.stats.increment_info(InfoType::UnfingerprintableNode)
            }
        }
    }
    debug!("{} new nodes from {}", new_nodes, source.id);
    outcome.consumed.push(ConsumedSource {
        id: source.id,
        url: source.url,
        body: content.body,
        new_nodes,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error_handling::ProcessingStats;
    use crate::health::{FetchMode, SourceStatus};
    use crate::initialization::init_client;
    use std::collections::HashSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_context() -> FetchContext {
        let config = Config {
            timeout_seconds: 2,
            ..Default::default()
        };
        FetchContext::new(
            init_client(&config).expect("client builds"),
            Arc::new(ProcessingStats::new()),
            0,
        )
    }

    fn limits(node_quota: usize, max_concurrency: usize) -> CollectLimits {
        CollectLimits {
            node_quota,
            max_concurrency,
            probe_timeout: Duration::from_secs(10),
        }
    }

    async fn serve(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn registry_for(urls: &[String]) -> HealthRegistry {
        let mut registry = HealthRegistry::from_records(Vec::new(), 5);
        for url in urls {
            registry.add_url(url, FetchMode::Raw);
        }
        registry.evaluate(&HashSet::new(), Utc::now());
        registry
    }

    #[tokio::test]
    async fn test_dedup_across_sources_and_failure_bookkeeping() {
        let server = MockServer::start().await;
        serve(&server, "/a", "trojan://pw@1.1.1.1:443#A1\ntrojan://pw@2.2.2.2:443#A2\n").await;
        serve(&server, "/b", "trojan://pw@2.2.2.2:443#B1\ntrojan://pw@3.3.3.3:443#B2\n").await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let urls: Vec<String> = ["/a", "/b", "/broken"]
            .iter()
            .map(|p| format!("{}{p}", server.uri()))
            .collect();
        let mut registry = registry_for(&urls);
        let plan = registry.fetch_plan();
        let ctx = test_context();

        // one at a time keeps the merge order equal to the plan order
        let outcome = collect(&ctx, plan, limits(100, 1), &mut registry).await;
        assert_eq!(outcome.dispatched, 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.unique.len(), 3);
        assert_eq!(ctx.stats.get_info_count(InfoType::DuplicateNode), 1);

        let names: Vec<&str> = outcome.unique.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A1", "A2", "B2"]);

        let broken = registry.get(&crate::health::source_id_for(&urls[2])).unwrap();
        assert_eq!(broken.status, SourceStatus::Unstable);
        assert_eq!(broken.failure_streak, 1);
        let a = registry.get(&crate::health::source_id_for(&urls[0])).unwrap();
        assert_eq!(a.estimated_node_count, 2);
    }

    #[tokio::test]
    async fn test_quota_stops_dispatch() {
        let server = MockServer::start().await;
        serve(&server, "/a", "trojan://pw@1.1.1.1:443#A1\ntrojan://pw@2.2.2.2:443#A2\n").await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_string("trojan://pw@3.3.3.3:443#B"))
            .expect(0)
            .mount(&server)
            .await;

        let urls: Vec<String> = ["/a", "/b"]
            .iter()
            .map(|p| format!("{}{p}", server.uri()))
            .collect();
        let mut registry = registry_for(&urls);
        let plan = registry.fetch_plan();
        let outcome = collect(&test_context(), plan, limits(2, 1), &mut registry).await;

        assert_eq!(outcome.dispatched, 1);
        assert_eq!(outcome.unique.len(), 2);
        assert_eq!(outcome.contributors().count(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_sources_finish_after_quota() {
        let server = MockServer::start().await;
        serve(&server, "/fast", "trojan://pw@1.1.1.1:443#F\n").await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("trojan://pw@2.2.2.2:443#S\n")
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let urls: Vec<String> = ["/slow", "/fast"]
            .iter()
            .map(|p| format!("{}{p}", server.uri()))
            .collect();
        let mut registry = registry_for(&urls);
        let plan = registry.fetch_plan();
        let ctx = test_context();
        let outcome = collect(&ctx, plan, limits(1, 2), &mut registry).await;

        // both were dispatched before either finished; the slow one lost the race
        assert_eq!(outcome.dispatched, 2);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.unique.len(), 1);
        assert_eq!(outcome.late_discarded, 1);
        assert_eq!(ctx.stats.get_info_count(InfoType::LateSourceDiscarded), 1);

        let slow = registry.get(&crate::health::source_id_for(&urls[0])).unwrap();
        assert_eq!(slow.estimated_node_count, 1);
        assert!(slow.last_check_time.is_some());
    }

    #[tokio::test]
    async fn test_probe_timeout_counts_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("trojan://pw@1.1.1.1:443#T\n")
                    .set_delay(Duration::from_secs(1)),
            )
            .mount(&server)
            .await;

        let urls = vec![format!("{}/sub", server.uri())];
        let mut registry = registry_for(&urls);
        let plan = registry.fetch_plan();
        let ctx = test_context();
        let limits = CollectLimits {
            probe_timeout: Duration::from_millis(100),
            ..limits(10, 1)
        };
        let outcome = collect(&ctx, plan, limits, &mut registry).await;
        assert_eq!(outcome.failed, 1);
        assert!(outcome.unique.is_empty());
        assert_eq!(ctx.stats.get_error_count(ErrorType::ProbeTimeout), 1);
    }

    #[tokio::test]
    async fn test_empty_plan() {
        let mut registry = HealthRegistry::from_records(Vec::new(), 5);
        let outcome = collect(&test_context(), Vec::new(), limits(10, 4), &mut registry).await;
        assert_eq!(outcome.dispatched, 0);
        assert!(outcome.unique.is_empty());
    }
}
