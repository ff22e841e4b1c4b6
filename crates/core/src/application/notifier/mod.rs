// Position Notifier - periodic rank report for one waiting member

mod registry;
mod token;

pub use registry::NotifierRegistry;
pub use token::{cancel_channel, CancelSender, CancelToken};

use crate::application::store::QueueStore;
use crate::domain::{MemberId, QueueName};
use crate::port::{IdentityResolver, Notice, PresentationSink, QueueDisplay};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

/// Collaborators shared by every notifier task
pub struct NotifierContext {
    pub store: Arc<QueueStore>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub sink: Arc<dyn PresentationSink>,
    pub display: Arc<dyn QueueDisplay>,
    pub interval: Duration,
}

/// Owner-side handle of a running notifier
pub struct NotifierHandle {
    cancel: CancelSender,
    task: JoinHandle<()>,
}

impl NotifierHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to exit (call `cancel` first)
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Reports a member's live `(rank, total)` every interval until cancelled.
///
/// The first report fires immediately. A tick is skipped when the member is
/// no longer in the queue or cannot be resolved; neither stops the task.
/// The task only reads queue state.
pub struct PositionNotifier {
    queue: QueueName,
    member_id: MemberId,
    ctx: Arc<NotifierContext>,
}

impl PositionNotifier {
    pub fn new(ctx: Arc<NotifierContext>, queue: impl Into<QueueName>, member_id: MemberId) -> Self {
        Self {
            queue: queue.into(),
            member_id,
            ctx,
        }
    }

    /// Spawn the notifier loop on the current runtime
    pub fn spawn(self) -> NotifierHandle {
        let (cancel, token) = cancel_channel();
        let task = tokio::spawn(self.run(token));
        NotifierHandle { cancel, task }
    }

    async fn run(self, mut token: CancelToken) {
        let mut tick = interval(self.ctx.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(queue = %self.queue, member_id = %self.member_id, "Position notifier started");

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tick.tick() => {
                    self.report(&token).await;
                }
            }
        }

        debug!(queue = %self.queue, member_id = %self.member_id, "Position notifier stopped");
    }

    /// Emit one position report; returns whether anything was sent
    pub async fn report(&self, token: &CancelToken) -> bool {
        let Some((rank, total)) = self.ctx.store.rank_of(&self.queue, &self.member_id).await else {
            trace!(queue = %self.queue, member_id = %self.member_id, "Member no longer queued, skipping tick");
            return false;
        };

        let Some(handle) = self.ctx.resolver.resolve(&self.member_id) else {
            trace!(queue = %self.queue, member_id = %self.member_id, "Member offline, skipping tick");
            return false;
        };

        if token.is_cancelled() {
            return false;
        }

        self.ctx.sink.notify(
            &handle,
            Notice::Position {
                queue: self.queue.clone(),
                rank,
                total,
            },
        );
        self.ctx
            .display
            .update_queue(&handle, Some(rank), &self.queue, total);
        true
    }
}
