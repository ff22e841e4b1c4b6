//! Queue Store - registry of named queues
//!
//! One async mutex per queue name. The registry map sits behind a short
//! synchronous lock that is only held to look up or create a queue slot, so
//! work on unrelated queues never contends.

use crate::domain::{Member, MemberId, Queue, QueueName};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive access to one queue for the duration of a read-modify-write
pub type QueueGuard = OwnedMutexGuard<Queue>;

type QueueSlot = Arc<AsyncMutex<Queue>>;

/// Registry of queues, created lazily and never removed
#[derive(Default)]
pub struct QueueStore {
    queues: Mutex<HashMap<QueueName, QueueSlot>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a queue, creating it (active, empty) if it does not exist yet
    pub async fn lock(&self, name: &str) -> QueueGuard {
        let slot = {
            let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
            queues
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(Queue::new(name))))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Lock a queue only if it already exists
    pub async fn lock_existing(&self, name: &str) -> Option<QueueGuard> {
        let slot = self.slot(name)?;
        Some(slot.lock_owned().await)
    }

    /// Read-only snapshot of a queue's order (empty if the queue is unknown)
    pub async fn current_order(&self, name: &str) -> Vec<Member> {
        match self.lock_existing(name).await {
            Some(queue) => queue.current_order(),
            None => Vec::new(),
        }
    }

    /// `(rank, total)` of a member, or `None` if it is not queued
    pub async fn rank_of(&self, name: &str, id: &MemberId) -> Option<(usize, usize)> {
        let queue = self.lock_existing(name).await?;
        queue.rank(id).map(|rank| (rank, queue.len()))
    }

    pub async fn is_paused(&self, name: &str) -> bool {
        match self.lock_existing(name).await {
            Some(queue) => queue.is_paused(),
            None => false,
        }
    }

    /// Names of every known queue, sorted
    pub fn names(&self) -> Vec<QueueName> {
        let queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<QueueName> = queues.keys().cloned().collect();
        names.sort();
        names
    }

    fn slot(&self, name: &str) -> Option<QueueSlot> {
        let queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        queues.get(name).cloned()
    }
}
