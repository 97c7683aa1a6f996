//! Scheduler for the crawl frontier and the concurrency ceiling
//!
//! This module handles:
//! - FIFO queue of tasks ready to be dispatched
//! - Global concurrency limiting via a semaphore
//! - Retry tasks parked until their backoff has elapsed
//!
//! A parked task holds no concurrency slot; it only competes for one once
//! its ready time has passed.

use crate::state::CrawlTask;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// A task waiting out its backoff
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParkedTask {
    ready_at: Instant,
    task: CrawlTask,
}

/// A dispatched task holding one concurrency slot until dropped
pub struct ScheduledTask {
    pub task: CrawlTask,
    pub _permit: OwnedSemaphorePermit,
}

/// Scheduler owns the frontier and hands out tasks within the ceiling
///
/// No ordering between tasks is promised beyond FIFO dispatch of ready tasks.
pub struct Scheduler {
    semaphore: Arc<Semaphore>,
    frontier: VecDeque<CrawlTask>,
    parked: Vec<ParkedTask>,
}

impl Scheduler {
    /// Creates a scheduler with `max_in_flight` slots and an initial frontier
    pub fn new(max_in_flight: usize, initial: Vec<CrawlTask>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            frontier: initial.into_iter().collect(),
            parked: Vec::new(),
        }
    }

    /// Adds a task ready to fetch now
    pub fn push(&mut self, task: CrawlTask) {
        self.frontier.push_back(task);
    }

    /// Parks a task until `delay` has elapsed
    pub fn push_delayed(&mut self, task: CrawlTask, delay: Duration) {
        if delay.is_zero() {
            self.push(task);
            return;
        }
        self.parked.push(ParkedTask {
            ready_at: Instant::now() + delay,
            task,
        });
    }

    /// Takes the next ready task if a slot is free right now
    ///
    /// Returns None when nothing is ready or every slot is taken; slots come
    /// back as dispatched tasks finish.
    pub fn try_next(&mut self) -> Option<ScheduledTask> {
        self.promote_ready(Instant::now());
        if self.frontier.is_empty() {
            return None;
        }

        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        let task = self.frontier.pop_front()?;
        Some(ScheduledTask {
            task,
            _permit: permit,
        })
    }

    /// Earliest time a parked task becomes ready
    pub fn next_ready_at(&self) -> Option<Instant> {
        self.parked.iter().map(|p| p.ready_at).min()
    }

    /// Moves parked tasks whose backoff has elapsed onto the frontier
    fn promote_ready(&mut self, now: Instant) {
        if self.parked.is_empty() {
            return;
        }

        let (ready, waiting): (Vec<_>, Vec<_>) =
            self.parked.drain(..).partition(|p| p.ready_at <= now);
        self.parked = waiting;

        let mut ready = ready;
        ready.sort_by_key(|p| p.ready_at);
        self.frontier.extend(ready.into_iter().map(|p| p.task));
    }

    /// Drops every queued and parked task, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let discarded = self.frontier_size();
        self.frontier.clear();
        self.parked.clear();
        discarded
    }

    /// Number of tasks waiting, ready or parked
    pub fn frontier_size(&self) -> usize {
        self.frontier.len() + self.parked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty() && self.parked.is_empty()
    }

    /// Slots not currently held by a dispatched task
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn task(path: &str) -> CrawlTask {
        CrawlTask::seed(Url::parse(&format!("https://example.com{}", path)).unwrap())
    }

    #[test]
    fn test_new_scheduler() {
        let scheduler = Scheduler::new(4, vec![]);
        assert_eq!(scheduler.frontier_size(), 0);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.available_slots(), 4);
        assert_eq!(scheduler.next_ready_at(), None);
    }

    #[tokio::test]
    async fn test_fifo_dispatch() {
        let mut scheduler = Scheduler::new(4, vec![task("/a"), task("/b")]);
        scheduler.push(task("/c"));

        let order: Vec<String> = std::iter::from_fn(|| scheduler.try_next())
            .map(|s| s.task.url.path().to_string())
            .collect();

        assert_eq!(order, vec!["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn test_ceiling_limits_dispatch() {
        let mut scheduler = Scheduler::new(2, vec![task("/a"), task("/b"), task("/c")]);

        let first = scheduler.try_next().unwrap();
        let _second = scheduler.try_next().unwrap();
        assert!(scheduler.try_next().is_none());
        assert_eq!(scheduler.frontier_size(), 1);

        drop(first);
        assert!(scheduler.try_next().is_some());
    }

    #[tokio::test]
    async fn test_parked_task_holds_no_slot() {
        let mut scheduler = Scheduler::new(1, vec![]);
        scheduler.push_delayed(task("/retry"), Duration::from_secs(60));
        scheduler.push(task("/fresh"));

        assert_eq!(scheduler.available_slots(), 1);
        let scheduled = scheduler.try_next().unwrap();
        assert_eq!(scheduled.task.url.path(), "/fresh");
        assert_eq!(scheduler.frontier_size(), 1);
        assert!(scheduler.next_ready_at().is_some());
    }

    #[tokio::test]
    async fn test_parked_task_released_after_delay() {
        let mut scheduler = Scheduler::new(1, vec![]);
        scheduler.push_delayed(task("/retry"), Duration::from_millis(20));

        assert!(scheduler.try_next().is_none());

        let ready_at = scheduler.next_ready_at().unwrap();
        tokio::time::sleep_until(ready_at).await;

        let scheduled = scheduler.try_next().unwrap();
        assert_eq!(scheduled.task.url.path(), "/retry");
        assert!(scheduler.is_empty());
    }

    #[tokio::test]
    async fn test_zero_delay_is_ready_immediately() {
        let mut scheduler = Scheduler::new(1, vec![]);
        scheduler.push_delayed(task("/now"), Duration::ZERO);
        assert_eq!(scheduler.next_ready_at(), None);
        assert!(scheduler.try_next().is_some());
    }

    #[tokio::test]
    async fn test_clear() {
        let mut scheduler = Scheduler::new(1, vec![task("/a"), task("/b")]);
        scheduler.push_delayed(task("/c"), Duration::from_secs(60));
        assert_eq!(scheduler.clear(), 3);
        assert!(scheduler.is_empty());
        assert!(scheduler.try_next().is_none());
        assert_eq!(scheduler.next_ready_at(), None);
    }

    #[tokio::test]
    async fn test_zero_ceiling_treated_as_one() {
        let mut scheduler = Scheduler::new(0, vec![task("/a")]);
        assert!(scheduler.try_next().is_some());
    }
}
