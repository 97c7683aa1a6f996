//! Per-stage crawl decisions
//!
//! Everything here runs synchronously on a completed fetch. The only shared
//! mutable state touched is the visited set, the run state and the stats
//! counters, each of which synchronizes itself.

use crate::crawler::{Extractor, FetchError, FetchResponse, Fetcher};
use crate::output::{ArticleMetadata, ArticleRecord, CrawlStats, RecordSender};
use crate::state::{CrawlTask, RunState, Stage, VisitedSet};
use crate::url::{is_http, normalize_url, resolve_link, DomainScope};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Title used when a feed entry has none
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Title used when neither the page nor the feed provides one
pub const NO_TITLE: &str = "No Title";

/// Result of running one task
#[derive(Debug)]
pub enum TaskOutcome {
    /// Fetch succeeded; these tasks were newly scheduled from it
    Completed(Vec<CrawlTask>),

    /// Fetch failed; the controller decides whether to retry
    Failed(CrawlTask, FetchError),

    /// Not fetched because the quota was already full
    Skipped,
}

/// Everything a running task needs, shared across the run
pub struct CrawlContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn Extractor>,
    pub visited: Arc<VisitedSet>,
    pub run_state: Arc<RunState>,
    pub stats: Arc<CrawlStats>,
    pub scope: DomainScope,
    pub records: RecordSender,
    pub settle_delay: Duration,
    pub min_content_length: usize,
}

impl CrawlContext {
    /// Fetches the task's URL and routes the page to its stage
    pub async fn execute(&self, task: CrawlTask) -> TaskOutcome {
        if task.stage == Stage::ExtractArticle && self.run_state.quota_reached() {
            tracing::debug!("Quota full, not fetching {}", task.url);
            self.run_state.request_stop();
            return TaskOutcome::Skipped;
        }

        let options = task.fetch_options(self.settle_delay);
        match self.fetcher.fetch(&task.url, &options).await {
            Ok(response) => {
                CrawlStats::bump(&self.stats.pages_fetched);
                TaskOutcome::Completed(self.process(&task, &response))
            }
            Err(error) => {
                CrawlStats::bump(&self.stats.fetch_failures);
                TaskOutcome::Failed(task, error)
            }
        }
    }

    /// Applies the stage logic to a fetched page
    pub fn process(&self, task: &CrawlTask, response: &FetchResponse) -> Vec<CrawlTask> {
        match task.stage {
            Stage::Discover => self.discover(task, response),
            Stage::Canonicalize => self.canonicalize(task, response).into_iter().collect(),
            Stage::ExtractArticle => self.extract_article(task, response),
        }
    }

    /// Turns feed entries into canonicalize tasks
    fn discover(&self, task: &CrawlTask, response: &FetchResponse) -> Vec<CrawlTask> {
        let items = self.extractor.feed_items(&response.body);
        if items.is_empty() {
            tracing::info!("No feed entries found at {}", task.url);
            return Vec::new();
        }

        tracing::debug!("Found {} feed entries at {}", items.len(), task.url);

        let mut scheduled = Vec::new();
        for item in items {
            CrawlStats::bump(&self.stats.feed_entries);

            let Some(url) = self.admit(&item.link, &task.url) else {
                continue;
            };

            let title = item.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            scheduled.push(CrawlTask::entry(url, title));
        }

        scheduled
    }

    /// Resolves the canonical URL and schedules the article fetch
    fn canonicalize(&self, task: &CrawlTask, response: &FetchResponse) -> Option<CrawlTask> {
        let resolved = match self.extractor.canonical_href(&response.body) {
            Some(href) => match response.final_url.join(&href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping malformed URL: {} ({})", href, e);
                    CrawlStats::bump(&self.stats.malformed_urls);
                    return None;
                }
            },
            None => response.final_url.clone(),
        };

        if !is_http(&resolved) {
            tracing::warn!("Skipping malformed URL: {}", resolved);
            CrawlStats::bump(&self.stats.malformed_urls);
            return None;
        }

        let canonical = match normalize_url(resolved.as_str()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping malformed URL: {} ({})", resolved, e);
                CrawlStats::bump(&self.stats.malformed_urls);
                return None;
            }
        };

        if !self.scope.allows(&canonical) {
            tracing::debug!("Skipping off-site canonical URL: {}", canonical);
            CrawlStats::bump(&self.stats.offsite_urls);
            return None;
        }

        if !self.visited.try_mark(canonical.as_str()) {
            tracing::debug!("Canonical URL already visited: {}", canonical);
            return None;
        }

        tracing::debug!("Resolved {} -> {}", task.url, canonical);
        Some(task.canonical_article(canonical))
    }

    /// Emits the article record and expands its links
    fn extract_article(&self, task: &CrawlTask, response: &FetchResponse) -> Vec<CrawlTask> {
        let fields = self.extractor.article(&response.body);

        let title = fields
            .title
            .or_else(|| task.title.clone())
            .unwrap_or_else(|| NO_TITLE.to_string())
            .trim()
            .to_string();
        let content = fields.content.trim().to_string();

        if content.chars().count() < self.min_content_length {
            tracing::info!("Skipping article (too short): {} - {}", title, task.url);
            CrawlStats::bump(&self.stats.thin_articles);
            return Vec::new();
        }

        let Some(emitted) = self.run_state.try_claim_slot() else {
            tracing::debug!("Quota already full, discarding {}", task.url);
            CrawlStats::bump(&self.stats.discarded_after_quota);
            self.run_state.request_stop();
            return Vec::new();
        };

        let record = ArticleRecord {
            title,
            url: task.url.to_string(),
            content,
            metadata: ArticleMetadata::from_fields(
                fields.published_date,
                fields.author,
                fields.source,
            ),
        };

        if self.records.send(record).is_err() {
            tracing::error!("Output writer closed; record for {} lost", task.url);
        }
        CrawlStats::bump(&self.stats.articles_emitted);

        let limit = self.run_state.item_limit();
        tracing::info!("Scraped {}/{} articles", emitted, limit);

        if emitted >= limit {
            tracing::info!("Reached crawl limit, stopping...");
            self.run_state.request_stop();
            return Vec::new();
        }

        if task.depth >= self.run_state.max_depth() {
            return Vec::new();
        }

        let mut children = Vec::new();
        for href in &fields.links {
            let Some(link) = resolve_link(href, &response.final_url) else {
                continue;
            };
            if let Some(url) = self.admit(link.as_str(), &task.url) {
                children.push(task.linked_article(url));
            }
        }

        self.stats
            .links_scheduled
            .fetch_add(children.len() as u64, Ordering::Relaxed);
        tracing::debug!(
            "Scheduled {} links from {} at depth {}",
            children.len(),
            task.url,
            task.depth + 1
        );

        children
    }

    /// Normalizes a discovered URL and marks it if it may be scheduled
    fn admit(&self, raw: &str, found_on: &Url) -> Option<Url> {
        let url = match normalize_url(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping malformed URL: {} on {} ({})", raw, found_on, e);
                CrawlStats::bump(&self.stats.malformed_urls);
                return None;
            }
        };

        if !self.scope.allows(&url) {
            tracing::debug!("Skipping off-site URL: {}", url);
            CrawlStats::bump(&self.stats.offsite_urls);
            return None;
        }

        self.visited.try_mark(url.as_str()).then_some(url)
    }
}
