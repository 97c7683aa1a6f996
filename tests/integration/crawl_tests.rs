//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! feed → canonical → article pipeline end-to-end through the HTTP fetcher.

use disaster_crawl::config::{Config, OutputFormat};
use disaster_crawl::crawler::crawl;
use disaster_crawl::output::ArticleRecord;
use disaster_crawl::CrawlError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY_TEXT: &str = "A magnitude 6.8 earthquake struck the coastal region early on Tuesday, \
     damaging roads and cutting power to thousands of homes.";

/// Creates a fast test configuration writing into `dir`
fn create_test_config(dir: &TempDir, seeds: &[String], item_limit: u64, hops: u32) -> Config {
    let seed_file = dir.path().join("seeds.txt");
    std::fs::write(&seed_file, seeds.join("\n")).expect("Failed to write seed file");

    let mut config = Config::default();
    config.crawler.item_limit = item_limit;
    config.crawler.max_depth = hops;
    config.crawler.max_concurrent_requests = 4;
    config.crawler.settle_delay_ms = 0;
    config.retry.initial_backoff_ms = 0;
    config.retry.max_backoff_ms = 0;
    config.fetch.download_delay_ms = 0;
    config.fetch.request_timeout_ms = 2000;
    config.output.output_dir = dir.path().join("output_dir");
    config.seeds.seed_file = Some(seed_file);
    config
}

fn rss(entries: &[(&str, String)]) -> String {
    let items: String = entries
        .iter()
        .map(|(title, link)| format!("<item><title>{}</title><link>{}</link></item>", title, link))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Disasters</title>{}</channel></rss>"#,
        items
    )
}

fn article_page(title: &str, canonical: &str, text: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">more</a>"#, l))
        .collect();
    format!(
        r#"<html><head>
            <title>{title}</title>
            <link rel="canonical" href="{canonical}">
            <meta name="author" content="Staff Writer">
            <meta property="og:site_name" content="Test News">
        </head><body><p>{text}</p>{anchors}</body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Serves a feed entry page that only points at its canonical article
async fn mount_entry(server: &MockServer, route: &str, canonical: &str) {
    let body = format!(
        r#"<html><head><link rel="canonical" href="{}"></head><body></body></html>"#,
        canonical
    );
    mount_html(server, route, body).await;
}

async fn mount_feed(server: &MockServer, entries: &[(&str, String)]) {
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss(entries))
                .insert_header("content-type", "application/rss+xml"),
        )
        .mount(server)
        .await;
}

fn read_jsonl(path: &Path) -> Vec<ArticleRecord> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect()
}

async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

#[tokio::test]
async fn test_full_crawl_feed_to_articles() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_feed(&server, &[("Quake hits coast", format!("{}/entry/1", base))]).await;

    // The feed entry redirects to the publisher's page
    Mock::given(method("GET"))
        .and(path("/entry/1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/story/1", base).as_str()),
        )
        .mount(&server)
        .await;

    mount_html(
        &server,
        "/story/1",
        article_page("Quake hits coast", "/story/1", BODY_TEXT, &["/story/2", "mailto:tips@test"]),
    )
    .await;
    mount_html(
        &server,
        "/story/2",
        article_page("Aftershocks continue", "/story/2", BODY_TEXT, &["/story/3"]),
    )
    .await;

    let config = create_test_config(&dir, &[format!("{}/rss", base)], 10, 1);
    let output_path = config.output.output_path();

    let stats = crawl(config).await.expect("Crawl failed");

    let mut records = read_jsonl(&output_path);
    records.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, format!("{}/story/1", base));
    assert_eq!(records[0].title, "Quake hits coast");
    assert_eq!(records[0].content, BODY_TEXT);
    assert_eq!(records[0].metadata.author, "Staff Writer");
    assert_eq!(records[0].metadata.source, "Test News");
    assert_eq!(records[0].metadata.published_date, "Unknown");
    assert_eq!(records[1].url, format!("{}/story/2", base));

    assert_eq!(stats.records_written, 2);
    // hops_away = 1 stops expansion at /story/2
    assert_eq!(requests_to(&server, "/story/3").await, 0);
}

#[tokio::test]
async fn test_failing_entry_retried_then_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_feed(&server, &[("Flood warning", format!("{}/broken", base))]).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&dir, &[format!("{}/rss", base)], 10, 0);
    let output_path = config.output.output_path();

    let stats = crawl(config).await.expect("Crawl failed");

    assert_eq!(requests_to(&server, "/broken").await, 4);
    assert_eq!(stats.terminal_failures, 1);
    assert!(read_jsonl(&output_path).is_empty());
}

#[tokio::test]
async fn test_thin_article_not_emitted() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_feed(&server, &[("Brief", format!("{}/entry/short", base))]).await;
    mount_entry(&server, "/entry/short", "/short").await;
    mount_html(
        &server,
        "/short",
        article_page("Brief", "/short", "Too short to keep.", &["/linked"]),
    )
    .await;

    let config = create_test_config(&dir, &[format!("{}/rss", base)], 10, 2);
    let output_path = config.output.output_path();

    let stats = crawl(config).await.expect("Crawl failed");

    assert!(read_jsonl(&output_path).is_empty());
    assert_eq!(stats.thin_articles, 1);
    assert_eq!(requests_to(&server, "/linked").await, 0);
}

#[tokio::test]
async fn test_item_limit_stops_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    let entries: Vec<(&str, String)> = (1..=4)
        .map(|i| ("Wildfire", format!("{}/entry/{}", base, i)))
        .collect();
    mount_feed(&server, &entries).await;
    for i in 1..=4 {
        let route = format!("/fire/{}", i);
        mount_entry(&server, &format!("/entry/{}", i), &route).await;
        mount_html(&server, &route, article_page("Wildfire", &route, BODY_TEXT, &[])).await;
    }

    let config = create_test_config(&dir, &[format!("{}/rss", base)], 1, 0);
    let output_path = config.output.output_path();

    let stats = crawl(config).await.expect("Crawl failed");

    assert_eq!(read_jsonl(&output_path).len(), 1);
    assert_eq!(stats.articles_emitted, 1);
}

#[tokio::test]
async fn test_json_array_output() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_feed(&server, &[("Cyclone", format!("{}/entry/cyclone", base))]).await;
    mount_entry(&server, "/entry/cyclone", "/cyclone").await;
    mount_html(
        &server,
        "/cyclone",
        article_page("Cyclone", "/cyclone", BODY_TEXT, &[]),
    )
    .await;

    let mut config = create_test_config(&dir, &[format!("{}/rss", base)], 10, 0);
    config.output.format = OutputFormat::Json;
    let output_path = config.output.output_path();
    assert!(output_path.ends_with("disaster_news.json"));

    crawl(config).await.expect("Crawl failed");

    let contents = std::fs::read_to_string(&output_path).unwrap();
    let records: Vec<ArticleRecord> = serde_json::from_str(&contents).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Cyclone");
    assert!(contents.starts_with("[\n"));
}

#[tokio::test]
async fn test_missing_seed_file_finishes_empty() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, &[], 10, 0);
    config.seeds.seed_file = Some(dir.path().join("does-not-exist.txt"));
    let output_path = config.output.output_path();

    let stats = crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 0);
    assert!(output_path.exists());
    assert!(read_jsonl(&output_path).is_empty());
}

#[tokio::test]
async fn test_unwritable_output_fails_run() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, &[], 10, 0);
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    config.output.output_dir = blocker;

    let result = crawl(config).await;

    assert!(matches!(result, Err(CrawlError::Output(_))));
}

#[tokio::test]
async fn test_self_canonical_entry_not_fetched_twice() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_feed(&server, &[("Landslide", format!("{}/landslide", base))]).await;
    mount_html(
        &server,
        "/landslide",
        article_page("Landslide", "/landslide", BODY_TEXT, &[]),
    )
    .await;

    let config = create_test_config(&dir, &[format!("{}/rss", base)], 10, 0);
    let output_path = config.output.output_path();

    crawl(config).await.expect("Crawl failed");

    assert_eq!(requests_to(&server, "/landslide").await, 1);
    assert!(read_jsonl(&output_path).is_empty());
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, &[], 10, 0);
    config.crawler.max_concurrent_requests = 0;

    let result = crawl(config).await;

    assert!(matches!(result, Err(CrawlError::Config(_))));
}
