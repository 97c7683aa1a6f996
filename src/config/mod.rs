//! Configuration module for Disaster-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so a run without any file is valid; command-line
//! values are merged over the file through [`Overrides`] before validation.
//!
//! # Example
//!
//! ```no_run
//! use disaster_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will follow links {} hops deep", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, OutputFormat, Overrides, RetryConfig,
    SeedConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
