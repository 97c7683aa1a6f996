//! Output module for emitted article records
//!
//! This module handles:
//! - The article record format
//! - JSON lines and pretty JSON array sinks
//! - The background writer that owns the sink during a run
//! - Run statistics

mod json_array;
mod jsonl;
pub mod stats;
mod traits;
mod writer;

pub use json_array::JsonArraySink;
pub use jsonl::JsonLinesSink;
pub use stats::{print_statistics, CrawlStatistics, CrawlStats};
pub use traits::{MemorySink, OutputError, OutputResult, Sink};
pub use writer::{RecordSender, SinkWriter};

use crate::config::{OutputConfig, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One extracted news article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub content: String,
    pub metadata: ArticleMetadata,
}

/// Article metadata; absent fields hold [`ArticleMetadata::UNKNOWN`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub published_date: String,
    pub author: String,
    pub source: String,
}

impl ArticleMetadata {
    pub const UNKNOWN: &'static str = "Unknown";

    /// Builds metadata, substituting `Unknown` for missing fields
    pub fn from_fields(
        published_date: Option<String>,
        author: Option<String>,
        source: Option<String>,
    ) -> Self {
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| Self::UNKNOWN.to_string());
        Self {
            published_date: or_unknown(published_date),
            author: or_unknown(author),
            source: or_unknown(source),
        }
    }
}

impl Default for ArticleMetadata {
    fn default() -> Self {
        Self::from_fields(None, None, None)
    }
}

/// Opens the sink selected by the output configuration
///
/// The output directory is created if needed and the file is truncated.
pub fn open_sink(config: &OutputConfig) -> OutputResult<Box<dyn Sink>> {
    let path = config.output_path();
    Ok(match config.format {
        OutputFormat::Jsonl => Box::new(JsonLinesSink::create(&path)?),
        OutputFormat::Json => Box::new(JsonArraySink::create(&path)?),
    })
}

/// Creates the output file and any missing parent directories
fn create_output_file(path: &Path) -> OutputResult<File> {
    let open_error = |source| OutputError::Open {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(open_error)?;
    }

    File::create(path).map_err(open_error)
}
