use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Run-wide quota and stop signal shared by every in-flight task
#[derive(Debug)]
pub struct RunState {
    items_emitted: AtomicU64,
    item_limit: u64,
    max_depth: u32,
    stopped: AtomicBool,
}

impl RunState {
    pub fn new(item_limit: u64, max_depth: u32) -> Self {
        Self {
            items_emitted: AtomicU64::new(0),
            item_limit,
            max_depth,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn item_limit(&self) -> u64 {
        self.item_limit
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn items_emitted(&self) -> u64 {
        self.items_emitted.load(Ordering::SeqCst)
    }

    /// True once the quota has been filled
    pub fn quota_reached(&self) -> bool {
        self.items_emitted() >= self.item_limit
    }

    /// Claims one slot of the quota for a record about to be emitted
    ///
    /// Returns the new emitted count, or None if the quota was already full.
    /// The check and the increment are a single atomic step, so concurrent
    /// tasks can never push the count past the limit.
    pub fn try_claim_slot(&self) -> Option<u64> {
        self.items_emitted
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |emitted| {
                (emitted < self.item_limit).then_some(emitted + 1)
            })
            .ok()
            .map(|previous| previous + 1)
    }

    /// Signals that no new work should be dispatched
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
