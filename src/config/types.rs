use serde::Deserialize;
use std::path::PathBuf;

/// Desktop browser user agent; several news sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Disaster-Crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
}

/// Crawl traversal and quota configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of articles after which the run stops
    #[serde(rename = "item-limit", default = "default_item_limit")]
    pub item_limit: u64,

    /// Maximum number of link hops followed from an accepted article
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of fetches in flight at once
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Wait after DOM-ready before article extraction (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Articles with fewer characters of body text are dropped
    #[serde(rename = "min-content-length", default = "default_min_content_length")]
    pub min_content_length: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            item_limit: default_item_limit(),
            max_depth: default_max_depth(),
            max_concurrent_requests: default_max_concurrent_requests(),
            settle_delay_ms: default_settle_delay_ms(),
            min_content_length: default_min_content_length(),
        }
    }
}

/// Retry policy configuration for fetch failures
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Retries allowed after the first failed attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry (milliseconds), doubled per attempt
    #[serde(rename = "initial-backoff-ms", default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound for the backoff (milliseconds)
    #[serde(rename = "max-backoff-ms", default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Minimum spacing between request starts (milliseconds)
    #[serde(rename = "download-delay-ms", default = "default_download_delay_ms")]
    pub download_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout_ms(),
            download_delay_ms: default_download_delay_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the output file is written into
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output file name inside `output_dir`; derived from `format` when unset
    #[serde(rename = "file-name", default)]
    pub file_name: Option<String>,

    #[serde(default)]
    pub format: OutputFormat,
}

impl OutputConfig {
    /// Full path of the output file
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name())
    }

    /// Configured file name, or the default one for the output format
    pub fn file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .unwrap_or_else(|| self.format.default_file_name())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_name: None,
            format: OutputFormat::default(),
        }
    }
}

/// Serialization format of the output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One compact JSON object per line
    #[default]
    Jsonl,
    /// A single pretty-printed JSON array
    Json,
}

impl OutputFormat {
    /// File name used when none is configured
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Jsonl => "disaster_news.jsonl",
            Self::Json => "disaster_news.json",
        }
    }
}

/// Seed input and domain scope configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Plain-text file with one feed URL per line
    #[serde(rename = "seed-file", default)]
    pub seed_file: Option<PathBuf>,

    /// Domain patterns (e.g., "cnn.com" or "*.bbc.com"); empty allows all
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,
}

/// Values supplied on the command line or environment, applied over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed_file: Option<PathBuf>,
    pub item_limit: Option<u64>,
    pub max_depth: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub max_concurrent_requests: Option<u32>,
}

impl Overrides {
    /// Applies every present override onto `config`
    pub fn apply(self, config: &mut Config) {
        if let Some(seed_file) = self.seed_file {
            config.seeds.seed_file = Some(seed_file);
        }
        if let Some(item_limit) = self.item_limit {
            config.crawler.item_limit = item_limit;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(output_dir) = self.output_dir {
            config.output.output_dir = output_dir;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(concurrency) = self.max_concurrent_requests {
            config.crawler.max_concurrent_requests = concurrency;
        }
    }
}

fn default_item_limit() -> u64 {
    1000
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_concurrent_requests() -> u32 {
    50
}

fn default_settle_delay_ms() -> u64 {
    5000
}

fn default_min_content_length() -> usize {
    50
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout_ms() -> u64 {
    7000
}

fn default_download_delay_ms() -> u64 {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_dir")
}

