//! Crawler module for news discovery and article extraction
//!
//! This module contains the core crawling logic, including:
//! - The fetch gateway and its HTTP implementation
//! - Feed and HTML extraction
//! - Retry policy and task scheduling
//! - The per-stage decisions and the controller that drives a run

mod coordinator;
mod feed;
mod fetcher;
mod parser;
mod retry;
mod scheduler;
mod seeds;
mod stages;

pub use coordinator::Controller;
pub use feed::{parse_feed, FeedItem};
pub use fetcher::{
    build_http_client, FetchError, FetchOptions, FetchResponse, Fetcher, HttpFetcher,
};
pub use parser::{ArticleFields, Extractor, HtmlExtractor};
pub use retry::{RetryDecision, RetryPolicy};
pub use scheduler::Scheduler;
pub use seeds::load_seeds;
pub use stages::{NO_TITLE, UNKNOWN_TITLE};

use crate::config::{validate, Config};
use crate::output::{open_sink, CrawlStatistics};
use std::sync::Arc;

/// Runs a complete crawl with the HTTP fetcher and HTML extractor
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and load seed URLs from the configured seed file
/// 2. Open the configured output sink
/// 3. Build the HTTP client
/// 4. Run the controller until the frontier drains or the quota is filled
pub async fn crawl(config: Config) -> crate::Result<CrawlStatistics> {
    validate(&config)?;

    let seeds = load_seeds(config.seeds.seed_file.as_deref());
    tracing::info!("Loaded {} seed URLs", seeds.len());

    let sink = open_sink(&config.output)?;
    tracing::info!("Writing articles to {}", config.output.output_path().display());

    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let controller = Controller::new(&config, fetcher, Arc::new(HtmlExtractor::new()));

    controller.run(seeds, sink).await
}
