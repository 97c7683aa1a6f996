use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Every key is optional; missing sections fall back to their defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use disaster_crawl::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Item limit: {}", config.crawler.item_limit);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from TOML text without validating it
///
/// Validation is deferred so that command-line overrides can be applied
/// before the merged result is checked.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at start-up so that output files can be traced back to the
/// configuration that produced them.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
item-limit = 25
max-depth = 1
max-concurrent-requests = 8

[retry]
max-retries = 2

[output]
output-dir = "./out"
format = "json"

[seeds]
seed-file = "seeds.txt"
allowed-domains = ["news.google.com", "*.bbc.com"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.item_limit, 25);
        assert_eq!(config.crawler.max_depth, 1);
        assert_eq!(config.crawler.max_concurrent_requests, 8);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.seeds.allowed_domains.len(), 2);
        assert_eq!(
            config.seeds.seed_file.as_deref(),
            Some(Path::new("seeds.txt"))
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.crawler.item_limit, 1000);
        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.min_content_length, 50);
        assert_eq!(config.crawler.settle_delay_ms, 5000);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.output.output_dir, Path::new("output_dir"));
        assert_eq!(config.output.format, OutputFormat::Jsonl);
        assert!(config.seeds.seed_file.is_none());
        assert_eq!(
            config.output.output_path(),
            Path::new("output_dir").join("disaster_news.jsonl")
        );
    }

    #[test]
    fn test_file_name_follows_format_when_unset() {
        let config = parse_config("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.output.file_name(), "disaster_news.json");

        let config =
            parse_config("[output]\nformat = \"json\"\nfile-name = \"quakes.txt\"\n").unwrap();
        assert_eq!(config.output.file_name(), "quakes.txt");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/crawl.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nitem-limit = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
