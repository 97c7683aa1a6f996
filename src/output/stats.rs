//! Run statistics
//!
//! Counters are updated concurrently by crawl tasks and read once as a
//! snapshot when the run ends.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all tasks of a run
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages_fetched: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub retries_scheduled: AtomicU64,
    pub terminal_failures: AtomicU64,
    pub feed_entries: AtomicU64,
    pub malformed_urls: AtomicU64,
    pub offsite_urls: AtomicU64,
    pub thin_articles: AtomicU64,
    pub articles_emitted: AtomicU64,
    pub discarded_after_quota: AtomicU64,
    pub links_scheduled: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments one counter
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of all counters
    pub fn snapshot(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        urls_visited: usize,
        records_written: u64,
    ) -> CrawlStatistics {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CrawlStatistics {
            started_at,
            finished_at,
            urls_visited: urls_visited as u64,
            pages_fetched: get(&self.pages_fetched),
            fetch_failures: get(&self.fetch_failures),
            retries_scheduled: get(&self.retries_scheduled),
            terminal_failures: get(&self.terminal_failures),
            feed_entries: get(&self.feed_entries),
            malformed_urls: get(&self.malformed_urls),
            offsite_urls: get(&self.offsite_urls),
            thin_articles: get(&self.thin_articles),
            articles_emitted: get(&self.articles_emitted),
            discarded_after_quota: get(&self.discarded_after_quota),
            links_scheduled: get(&self.links_scheduled),
            records_written,
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Distinct URLs marked in the visited set
    pub urls_visited: u64,

    /// Successful fetches, any stage
    pub pages_fetched: u64,

    /// Failed fetch attempts, including ones later retried
    pub fetch_failures: u64,
    pub retries_scheduled: u64,

    /// URLs given up on after the last retry
    pub terminal_failures: u64,

    /// Entries found in seed feeds
    pub feed_entries: u64,
    pub malformed_urls: u64,
    pub offsite_urls: u64,

    /// Articles dropped for having too little body text
    pub thin_articles: u64,
    pub articles_emitted: u64,

    /// Finished articles thrown away because the quota was already full
    pub discarded_after_quota: u64,

    /// Child article tasks produced by link expansion
    pub links_scheduled: u64,

    /// Records the sink confirmed as written
    pub records_written: u64,
}

impl CrawlStatistics {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Started:  {}", stats.started_at.to_rfc3339());
    println!("Finished: {}", stats.finished_at.to_rfc3339());
    println!("Duration: {}s", stats.duration_seconds());

    println!("\nTraversal:");
    println!("  URLs visited:       {}", stats.urls_visited);
    println!("  Feed entries:       {}", stats.feed_entries);
    println!("  Pages fetched:      {}", stats.pages_fetched);
    println!("  Links scheduled:    {}", stats.links_scheduled);

    println!("\nArticles:");
    println!("  Emitted:            {}", stats.articles_emitted);
    println!("  Written:            {}", stats.records_written);
    println!("  Too short:          {}", stats.thin_articles);
    println!("  Over quota:         {}", stats.discarded_after_quota);

    println!("\nProblems:");
    println!("  Fetch failures:     {}", stats.fetch_failures);
    println!("  Retries scheduled:  {}", stats.retries_scheduled);
    println!("  Gave up:            {}", stats.terminal_failures);
    println!("  Malformed URLs:     {}", stats.malformed_urls);
    println!("  Off-site URLs:      {}", stats.offsite_urls);
}
