//! Sink trait and output errors
//!
//! A sink receives every emitted article record in order and is finished
//! exactly once when the run ends.

use crate::output::ArticleRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open output {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink already finished")]
    Finished,

    #[error("Output writer stopped unexpectedly: {0}")]
    Writer(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for article records
pub trait Sink: Send {
    /// Writes one record
    fn emit(&mut self, record: &ArticleRecord) -> OutputResult<()>;

    /// Flushes and closes the output; later `emit` calls fail
    fn finish(&mut self) -> OutputResult<()>;
}

/// Sink that keeps records in memory, mainly for embedding and tests
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: std::sync::Arc<std::sync::Mutex<Vec<ArticleRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records written so far
    pub fn records(&self) -> Vec<ArticleRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Sink for MemorySink {
    fn emit(&mut self, record: &ArticleRecord) -> OutputResult<()> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
