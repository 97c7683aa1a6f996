//! Background writer that owns the sink for the duration of a run

use crate::output::traits::{OutputError, OutputResult, Sink};
use crate::output::ArticleRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half handed to crawl tasks; emission never blocks them
pub type RecordSender = mpsc::UnboundedSender<ArticleRecord>;

/// Handle to the running writer
pub struct SinkWriter {
    task: JoinHandle<OutputResult<u64>>,
}

impl SinkWriter {
    /// Moves `sink` onto a blocking thread and returns the channel feeding it
    pub fn spawn(mut sink: Box<dyn Sink>) -> (RecordSender, Self) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ArticleRecord>();

        let task = tokio::task::spawn_blocking(move || {
            let mut written = 0u64;
            let mut first_error: Option<OutputError> = None;

            while let Some(record) = rx.blocking_recv() {
                if first_error.is_some() {
                    continue;
                }
                match sink.emit(&record) {
                    Ok(()) => written += 1,
                    Err(e) => {
                        tracing::error!("Failed to write record for {}: {}", record.url, e);
                        first_error = Some(e);
                    }
                }
            }

            let finished = sink.finish();
            match first_error {
                Some(e) => Err(e),
                None => finished.map(|()| written),
            }
        });

        (tx, Self { task })
    }

    /// Waits for every sender to drop, then finishes the sink
    ///
    /// Returns the number of records written, or the first write or flush
    /// error encountered.
    pub async fn finish(self) -> OutputResult<u64> {
        self.task
            .await
            .map_err(|e| OutputError::Writer(e.to_string()))?
    }
}
