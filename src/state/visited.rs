use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Process-wide ledger of URLs already scheduled in this run
///
/// Grows monotonically and is dropped with the run. There is no eviction:
/// memory is bounded by the item quota and hop limit, not by the set itself,
/// which is fine for bounded news crawls but not for open-ended ones.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` if it is new
    ///
    /// Returns true for exactly one caller per distinct URL, however many
    /// tasks race on it.
    pub fn try_mark(&self, url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string())
    }

    /// Returns true if `url` has been marked
    pub fn contains(&self, url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Number of URLs marked so far
    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
