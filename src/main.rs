//! Disaster-Crawl main entry point
//!
//! This is the command-line interface for the Disaster-Crawl news crawler.

use anyhow::Context;
use clap::Parser;
use disaster_crawl::config::{
    load_config_with_hash, validate, Config, OutputFormat, Overrides,
};
use disaster_crawl::crawler::{crawl, load_seeds};
use disaster_crawl::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Disaster-Crawl: a focused crawler for natural disaster news
///
/// Disaster-Crawl reads news feeds, resolves every entry to its canonical
/// article, extracts the article text and metadata, and follows in-page
/// links a bounded number of hops until the article quota is reached.
#[derive(Parser, Debug)]
#[command(name = "disaster-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A focused crawler for natural disaster news", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Plain-text file with one seed feed URL per line
    #[arg(long, value_name = "FILE")]
    seed_file: Option<PathBuf>,

    /// Stop after this many articles have been emitted
    #[arg(long, env = "NUM_PAGES")]
    num_pages: Option<u64>,

    /// Maximum link hops followed from a canonical article
    #[arg(long)]
    hops_away: Option<u32>,

    /// Directory the output file is written to
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Output file format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Maximum simultaneous fetches
    #[arg(long)]
    concurrency: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed_file: self.seed_file.clone(),
            item_limit: self.num_pages,
            max_depth: self.hops_away,
            output_dir: self.output_dir.clone(),
            format: self.format,
            max_concurrent_requests: self.concurrency,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("disaster_crawl=info,warn"),
            1 => EnvFilter::new("disaster_crawl=debug,info"),
            2 => EnvFilter::new("disaster_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies CLI and environment values, and validates
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    cli.overrides().apply(&mut config);
    validate(&config).context("Invalid configuration")?;

    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration and seeds
fn handle_dry_run(config: &Config) {
    println!("=== Disaster-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Item limit: {}", config.crawler.item_limit);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Settle delay: {}ms", config.crawler.settle_delay_ms);
    println!(
        "  Minimum content length: {} chars",
        config.crawler.min_content_length
    );

    println!("\nRetry:");
    println!("  Max retries: {}", config.retry.max_retries);
    println!(
        "  Backoff: {}ms doubling up to {}ms",
        config.retry.initial_backoff_ms, config.retry.max_backoff_ms
    );

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Request timeout: {}ms", config.fetch.request_timeout_ms);
    println!("  Download delay: {}ms", config.fetch.download_delay_ms);

    println!("\nOutput:");
    println!("  File: {}", config.output.output_path().display());
    println!("  Format: {:?}", config.output.format);

    println!(
        "\nAllowed Domains ({}):",
        config.seeds.allowed_domains.len()
    );
    if config.seeds.allowed_domains.is_empty() {
        println!("  (any)");
    }
    for domain in &config.seeds.allowed_domains {
        println!("  - {}", domain);
    }

    let seeds = load_seeds(config.seeds.seed_file.as_deref());
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling up to {} articles, {} hops deep",
        config.crawler.item_limit,
        config.crawler.max_depth
    );

    match crawl(config).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("Crawl failed")
        }
    }
}
