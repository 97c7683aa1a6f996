//! Crawl controller - main crawl orchestration logic
//!
//! This module contains the dispatch loop that coordinates a run:
//! - Seeding the frontier and the visited set
//! - Dispatching tasks under the concurrency ceiling
//! - Routing fetch failures through the retry policy
//! - Stopping once the item quota is filled
//! - Handing records to the sink and collecting statistics

use crate::config::Config;
use crate::crawler::scheduler::{ScheduledTask, Scheduler};
use crate::crawler::stages::{CrawlContext, TaskOutcome};
use crate::crawler::{Extractor, FetchError, Fetcher, RetryPolicy};
use crate::output::{CrawlStatistics, CrawlStats, Sink, SinkWriter};
use crate::state::{CrawlTask, RunState, VisitedSet};
use crate::url::{normalize_url, DomainScope};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};

/// Drives one crawl run over injected fetch and extraction capabilities
///
/// The visited set and run state live as long as the controller, so a
/// controller is meant to be used for a single run.
pub struct Controller {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    retry: RetryPolicy,
    visited: Arc<VisitedSet>,
    run_state: Arc<RunState>,
    stats: Arc<CrawlStats>,
    scope: DomainScope,
    max_concurrent: usize,
    settle_delay: Duration,
    min_content_length: usize,
}

impl Controller {
    /// Creates a controller from configuration and capabilities
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            fetcher,
            extractor,
            retry: RetryPolicy::from_config(&config.retry),
            visited: Arc::new(VisitedSet::new()),
            run_state: Arc::new(RunState::new(
                config.crawler.item_limit,
                config.crawler.max_depth,
            )),
            stats: Arc::new(CrawlStats::new()),
            scope: DomainScope::new(&config.seeds.allowed_domains),
            max_concurrent: config.crawler.max_concurrent_requests as usize,
            settle_delay: Duration::from_millis(config.crawler.settle_delay_ms),
            min_content_length: config.crawler.min_content_length,
        }
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    /// Crawls from `seeds` until the frontier drains or the quota is filled
    ///
    /// Records go to `sink` through a background writer. A sink failure
    /// fails the run; fetch and extraction failures never do.
    pub async fn run(&self, seeds: Vec<String>, sink: Box<dyn Sink>) -> Result<CrawlStatistics> {
        let started_at = Utc::now();
        let (records, writer) = SinkWriter::spawn(sink);

        let initial = self.seed_tasks(&seeds);
        tracing::info!(
            "Starting crawl with {} seeds (limit {} articles, depth {})",
            initial.len(),
            self.run_state.item_limit(),
            self.run_state.max_depth()
        );

        let ctx = Arc::new(CrawlContext {
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            visited: self.visited.clone(),
            run_state: self.run_state.clone(),
            stats: self.stats.clone(),
            scope: self.scope.clone(),
            records,
            settle_delay: self.settle_delay,
            min_content_length: self.min_content_length,
        });

        let mut scheduler = Scheduler::new(self.max_concurrent, initial);
        self.run_tasks(&ctx, &mut scheduler).await;

        // The writer finishes once the last sender is gone.
        drop(ctx);
        let records_written = writer.finish().await?;

        let stats = self.stats.snapshot(
            started_at,
            Utc::now(),
            self.visited.len(),
            records_written,
        );
        tracing::info!(
            "Crawl finished: {} articles written, {} URLs visited in {}s",
            stats.records_written,
            stats.urls_visited,
            stats.duration_seconds()
        );

        Ok(stats)
    }

    /// Normalizes seeds into discover tasks and marks them visited
    fn seed_tasks(&self, seeds: &[String]) -> Vec<CrawlTask> {
        let mut tasks = Vec::new();
        for seed in seeds {
            match normalize_url(seed) {
                Ok(url) => {
                    if self.visited.try_mark(url.as_str()) {
                        tasks.push(CrawlTask::seed(url));
                    } else {
                        tracing::debug!("Duplicate seed ignored: {}", url);
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed seed URL: {} ({})", seed, e);
                    CrawlStats::bump(&self.stats.malformed_urls);
                }
            }
        }
        tasks
    }

    /// Main dispatch loop
    ///
    /// Wakes whenever an in-flight task finishes or a parked retry becomes
    /// ready, dispatches whatever fits under the ceiling, and ends once
    /// nothing is in flight, queued or parked.
    async fn run_tasks(&self, ctx: &Arc<CrawlContext>, scheduler: &mut Scheduler) {
        let mut in_flight: JoinSet<TaskOutcome> = JoinSet::new();
        let mut processed: u64 = 0;

        loop {
            if self.run_state.is_stopped() {
                let discarded = scheduler.clear();
                if discarded > 0 {
                    tracing::info!("Quota reached, dropping {} queued tasks", discarded);
                }
            }

            while let Some(scheduled) = scheduler.try_next() {
                in_flight.spawn(dispatch(ctx.clone(), scheduled));
            }

            let wake_at = scheduler.next_ready_at();
            if in_flight.is_empty() && wake_at.is_none() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            tokio::select! {
                Some(joined) = in_flight.join_next() => {
                    processed += 1;
                    match joined {
                        Ok(outcome) => self.handle_outcome(outcome, scheduler),
                        Err(e) => {
                            tracing::error!("Crawl task aborted: {}", e);
                            CrawlStats::bump(&self.stats.terminal_failures);
                        }
                    }
                    if processed % 25 == 0 {
                        self.log_progress(processed, scheduler, in_flight.len());
                    }
                }
                _ = sleep_until(wake_at.unwrap_or_else(Instant::now)), if wake_at.is_some() => {
                    tracing::trace!("Backoff elapsed, releasing parked retries");
                }
            }
        }
    }

    fn log_progress(&self, processed: u64, scheduler: &Scheduler, in_flight: usize) {
        tracing::info!(
            "Progress: {} tasks done, {} queued, {} in flight, {} articles",
            processed,
            scheduler.frontier_size(),
            in_flight,
            self.run_state.items_emitted()
        );
    }

    fn handle_outcome(&self, outcome: TaskOutcome, scheduler: &mut Scheduler) {
        match outcome {
            TaskOutcome::Completed(children) => {
                if self.run_state.is_stopped() {
                    return;
                }
                for child in children {
                    scheduler.push(child);
                }
            }
            TaskOutcome::Failed(task, error) => self.handle_failure(task, error, scheduler),
            TaskOutcome::Skipped => {}
        }
    }

    fn handle_failure(&self, task: CrawlTask, error: FetchError, scheduler: &mut Scheduler) {
        if self.run_state.is_stopped() {
            tracing::debug!("Not retrying {} after stop: {}", task.url, error);
            return;
        }

        match self.retry.on_failure(&task, &error) {
            Some(decision) => {
                tracing::warn!(
                    "Retry {}/{}: {} due to {}",
                    decision.task.attempt,
                    self.retry.max_retries(),
                    task.url,
                    error
                );
                CrawlStats::bump(&self.stats.retries_scheduled);
                scheduler.push_delayed(decision.task, decision.backoff);
            }
            None => {
                tracing::error!(
                    "Failed after {} retries: {} - {}",
                    self.retry.max_retries(),
                    task.url,
                    error
                );
                CrawlStats::bump(&self.stats.terminal_failures);
            }
        }
    }
}

/// Runs one dispatched task, holding its concurrency slot until done
async fn dispatch(ctx: Arc<CrawlContext>, scheduled: ScheduledTask) -> TaskOutcome {
    let ScheduledTask { task, _permit } = scheduled;
    tracing::debug!(
        "Fetching {} [{} depth={} attempt={}]",
        task.url,
        task.stage,
        task.depth,
        task.attempt
    );
    ctx.execute(task).await
}
