//! Queue Service - public coordinator of the admission queues
//!
//! Every mutating operation holds the target queue's lock for its whole
//! read-modify-write, including broadcasts and the trailing drain, so the
//! ordering and single-notifier invariants hold under concurrent callers.
//! Different queues are locked independently.

mod config;

pub use config::QueueServiceConfig;

use crate::application::constants::{MIN_NOTIFY_INTERVAL, NOTIFIER_SHUTDOWN_TIMEOUT};
use crate::application::notifier::{
    NotifierContext, NotifierHandle, NotifierRegistry, PositionNotifier,
};
use crate::application::priority::detect_overtaken;
use crate::application::store::QueueStore;
use crate::application::transfer::{DrainOutcome, TransferProcessor};
use crate::domain::{
    validate_member, validate_queue_name, Member, MemberId, Queue, QueueName, QueueState,
};
use crate::error::Result;
use crate::port::{
    IdentityResolver, LiveHandle, Notice, PresentationSink, QueueDisplay, TransferMechanism,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a join/leave toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinOutcome {
    /// Member entered the queue at `rank` (before any drain that followed)
    Joined { rank: usize, total: usize },
    /// Member left the queue
    Left,
    /// Removal requested for a member that was not queued
    NotQueued,
}

/// Diagnostic view of one queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub name: QueueName,
    pub size: usize,
    pub state: QueueState,
}

pub struct QueueService {
    store: Arc<QueueStore>,
    notifiers: NotifierRegistry,
    notifier_ctx: Arc<NotifierContext>,
    processor: TransferProcessor,
    resolver: Arc<dyn IdentityResolver>,
    sink: Arc<dyn PresentationSink>,
    display: Arc<dyn QueueDisplay>,
}

impl QueueService {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        sink: Arc<dyn PresentationSink>,
        display: Arc<dyn QueueDisplay>,
        transfer: Arc<dyn TransferMechanism>,
        config: QueueServiceConfig,
    ) -> Self {
        let interval = if config.notify_interval < MIN_NOTIFY_INTERVAL {
            warn!(
                requested = ?config.notify_interval,
                applied = ?MIN_NOTIFY_INTERVAL,
                "Notify interval too short, clamping"
            );
            MIN_NOTIFY_INTERVAL
        } else {
            config.notify_interval
        };

        let store = Arc::new(QueueStore::new());
        let notifier_ctx = Arc::new(NotifierContext {
            store: Arc::clone(&store),
            resolver: Arc::clone(&resolver),
            sink: Arc::clone(&sink),
            display: Arc::clone(&display),
            interval,
        });
        let processor = TransferProcessor::new(
            Arc::clone(&resolver),
            Arc::clone(&sink),
            transfer,
            config.stale_head_policy,
        );

        Self {
            store,
            notifiers: NotifierRegistry::new(),
            notifier_ctx,
            processor,
            resolver,
            sink,
            display,
        }
    }

    /// Toggle a member's presence in a queue.
    ///
    /// Joins if absent, leaves if present. Afterwards every other member's
    /// rank display is refreshed, overtaken members are told, and the queue
    /// is drained.
    pub async fn join(
        &self,
        queue_name: &str,
        member: Member,
        handle: &LiveHandle,
    ) -> Result<JoinOutcome> {
        validate_queue_name(queue_name)?;
        validate_member(&member)?;

        let mut queue = self.store.lock(queue_name).await;
        Ok(self.toggle_locked(&mut queue, member, handle))
    }

    /// Leave a queue; unlike `join` this never adds the member
    pub async fn leave(
        &self,
        queue_name: &str,
        member_id: &MemberId,
        handle: &LiveHandle,
    ) -> Result<JoinOutcome> {
        validate_queue_name(queue_name)?;

        let Some(mut queue) = self.store.lock_existing(queue_name).await else {
            return Ok(JoinOutcome::NotQueued);
        };
        let Some(member) = queue
            .members()
            .iter()
            .find(|m| &m.id == member_id)
            .cloned()
        else {
            return Ok(JoinOutcome::NotQueued);
        };

        Ok(self.toggle_locked(&mut queue, member, handle))
    }

    /// Stop transfers out of a queue. Returns false if it was already paused.
    ///
    /// The pause notice goes to every member on each call. An unknown queue
    /// is created paused. Position notifiers keep running.
    pub async fn pause(&self, queue_name: &str) -> Result<bool> {
        validate_queue_name(queue_name)?;

        let mut queue = self.store.lock(queue_name).await;
        let changed = !queue.is_paused();
        queue.set_paused(true);

        info!(queue = %queue_name, members = queue.len(), changed, "Queue paused");
        self.notify_all(
            &queue,
            Notice::Paused {
                queue: queue_name.to_string(),
            },
        );
        Ok(changed)
    }

    /// Re-enable transfers and drain immediately. Returns false if the queue
    /// was not paused.
    pub async fn resume(&self, queue_name: &str) -> Result<bool> {
        validate_queue_name(queue_name)?;

        let Some(mut queue) = self.store.lock_existing(queue_name).await else {
            return Ok(false);
        };
        if !queue.is_paused() {
            return Ok(false);
        }
        queue.set_paused(false);

        info!(queue = %queue_name, members = queue.len(), "Queue resumed");
        self.notify_all(
            &queue,
            Notice::Resumed {
                queue: queue_name.to_string(),
            },
        );
        self.processor.drain(&mut queue, &self.notifiers);
        Ok(true)
    }

    /// Attempt one transfer out of a queue
    pub async fn drain(&self, queue_name: &str) -> DrainOutcome {
        match self.store.lock_existing(queue_name).await {
            Some(mut queue) => self.processor.drain(&mut queue, &self.notifiers),
            None => DrainOutcome::Idle,
        }
    }

    /// Render the current order as `"1 - name"` lines
    pub async fn describe(&self, queue_name: &str) -> String {
        let order = self.store.current_order(queue_name).await;
        if order.is_empty() {
            return format!("Queue '{}' is empty.", queue_name);
        }

        order
            .iter()
            .enumerate()
            .map(|(index, member)| format!("{} - {}", index + 1, member.display_name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Current order of a queue (empty if unknown)
    pub async fn snapshot(&self, queue_name: &str) -> Vec<Member> {
        self.store.current_order(queue_name).await
    }

    /// Summary of every known queue, sorted by name
    pub async fn list(&self) -> Vec<QueueSummary> {
        let mut summaries = Vec::new();
        for name in self.store.names() {
            if let Some(queue) = self.store.lock_existing(&name).await {
                summaries.push(QueueSummary {
                    name,
                    size: queue.len(),
                    state: queue.state(),
                });
            }
        }
        summaries
    }

    pub fn has_notifier(&self, queue_name: &str, member_id: &MemberId) -> bool {
        self.notifiers.contains(queue_name, member_id)
    }

    /// Number of live position notifiers for a queue
    pub fn notifier_count(&self, queue_name: &str) -> usize {
        self.notifiers.count(queue_name)
    }

    /// Cancel every position notifier and wait for the tasks to exit
    pub async fn shutdown(&self) {
        let handles = self.notifiers.cancel_all();
        let count = handles.len();

        let stopped = tokio::time::timeout(
            NOTIFIER_SHUTDOWN_TIMEOUT,
            join_all(handles.into_iter().map(NotifierHandle::join)),
        )
        .await;

        match stopped {
            Ok(_) => info!(notifiers = count, "Position notifiers stopped"),
            Err(_) => warn!(
                notifiers = count,
                "Timed out waiting for position notifiers to stop"
            ),
        }
    }

    fn toggle_locked(&self, queue: &mut Queue, member: Member, handle: &LiveHandle) -> JoinOutcome {
        let member_id = member.id;
        let display_name = member.display_name.clone();
        let name = queue.name().to_string();

        let (joined, before) = queue.toggle(member);
        let total = queue.len();

        let outcome = if joined {
            let rank = queue.rank(&member_id).unwrap_or(total);
            info!(queue = %name, member_id = %member_id, member = %display_name, rank, total, "Member joined queue");

            self.sink.notify(handle, Notice::Joined { queue: name.clone() });
            let notifier =
                PositionNotifier::new(Arc::clone(&self.notifier_ctx), name.clone(), member_id)
                    .spawn();
            self.notifiers.insert(&name, member_id, notifier);

            JoinOutcome::Joined { rank, total }
        } else {
            info!(queue = %name, member_id = %member_id, member = %display_name, total, "Member left queue");

            self.notifiers.cancel(&name, &member_id);
            self.sink.notify(handle, Notice::Left { queue: name.clone() });
            self.display.update_queue(handle, None, &name, total);

            JoinOutcome::Left
        };

        self.broadcast_ranks(queue, &member_id);
        self.notify_overtaken(queue, &before);

        let drained = self.processor.drain(queue, &self.notifiers);
        debug!(queue = %name, outcome = ?drained, "Drain after toggle");

        outcome
    }

    /// Refresh the rank display of every member except `actor`
    fn broadcast_ranks(&self, queue: &Queue, actor: &MemberId) {
        let total = queue.len();
        for (index, member) in queue.members().iter().enumerate() {
            if &member.id == actor {
                continue;
            }
            if let Some(handle) = self.resolver.resolve(&member.id) {
                self.display
                    .update_queue(&handle, Some(index + 1), queue.name(), total);
            }
        }
    }

    fn notify_overtaken(&self, queue: &Queue, before: &[Member]) {
        for member_id in detect_overtaken(before, queue.members()) {
            if let Some(handle) = self.resolver.resolve(&member_id) {
                self.sink.notify(
                    &handle,
                    Notice::Overtaken {
                        queue: queue.name().to_string(),
                    },
                );
            }
        }
    }

    fn notify_all(&self, queue: &Queue, notice: Notice) {
        for member in queue.members() {
            if let Some(handle) = self.resolver.resolve(&member.id) {
                self.sink.notify(&handle, notice.clone());
            }
        }
    }
}
