//! Pretty-printed JSON array output
//!
//! The array is framed incrementally: `[` when the file is opened, `,`
//! before every record but the first, `]` on finish. A run that never
//! finishes leaves an unterminated array behind.

use crate::output::traits::{OutputError, OutputResult, Sink};
use crate::output::{create_output_file, ArticleRecord};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const INDENT: &[u8] = b"    ";

/// Writes all records as one pretty JSON array
pub struct JsonArraySink {
    writer: Option<BufWriter<File>>,
    first_item: bool,
}

impl JsonArraySink {
    /// Creates (or truncates) the output file and opens the array
    pub fn create(path: &Path) -> OutputResult<Self> {
        let mut writer = BufWriter::new(create_output_file(path)?);
        writer.write_all(b"[\n")?;
        tracing::info!("Writing JSON array to {}", path.display());
        Ok(Self {
            writer: Some(writer),
            first_item: true,
        })
    }
}

impl Sink for JsonArraySink {
    fn emit(&mut self, record: &ArticleRecord) -> OutputResult<()> {
        let writer = self.writer.as_mut().ok_or(OutputError::Finished)?;
        if !self.first_item {
            writer.write_all(b",\n")?;
        }
        self.first_item = false;

        let mut serializer =
            Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(INDENT));
        record.serialize(&mut serializer)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.write_all(b"\n]")?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }
}
