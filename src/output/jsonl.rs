//! Newline-delimited JSON output

use crate::output::traits::{OutputError, OutputResult, Sink};
use crate::output::{create_output_file, ArticleRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one compact JSON object per line
pub struct JsonLinesSink {
    writer: Option<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Creates (or truncates) the output file, creating parent directories
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = create_output_file(path)?;
        tracing::info!("Writing JSON lines to {}", path.display());
        Ok(Self {
            writer: Some(BufWriter::new(file)),
        })
    }
}

impl Sink for JsonLinesSink {
    fn emit(&mut self, record: &ArticleRecord) -> OutputResult<()> {
        let writer = self.writer.as_mut().ok_or(OutputError::Finished)?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }
}
