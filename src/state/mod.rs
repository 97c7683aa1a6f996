//! State module for tracking crawl progress
//!
//! This module holds the state owned by a single crawl run.
//!
//! # Components
//!
//! - `VisitedSet`: Deduplication ledger of every URL scheduled in the run
//! - `RunState`: Item quota, hop limit and the run-wide stop signal
//! - `CrawlTask`: A unit of work together with its `Stage`

mod run_state;
mod task;
mod visited;

// Re-export main types
pub use run_state::RunState;
pub use task::{CrawlTask, Stage};
pub use visited::VisitedSet;
