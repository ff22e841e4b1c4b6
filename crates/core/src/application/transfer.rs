//! Transfer Processor - moves the head of an active queue to its destination
//!
//! The transfer itself is handed off to a spawned task. Local state (notifier,
//! queue order, first-in-line notice) is updated right away; a failed
//! transfer is logged and the member is not requeued.

use super::notifier::NotifierRegistry;
use crate::domain::{Member, MemberId, Queue};
use crate::port::{IdentityResolver, LiveHandle, Notice, PresentationSink, TransferMechanism};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to do with a head member that cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleHeadPolicy {
    /// Leave the queue untouched; the next drain retries the same head
    #[default]
    Hold,
    /// Remove the stale head and try the next one in the same drain
    Drop,
}

impl std::str::FromStr for StaleHeadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hold" => Ok(StaleHeadPolicy::Hold),
            "drop" => Ok(StaleHeadPolicy::Drop),
            other => Err(format!("unknown stale head policy '{}'", other)),
        }
    }
}

/// Result of one drain attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Queue paused or empty
    Idle,
    /// Head could not be resolved and was kept (`StaleHeadPolicy::Hold`)
    Stalled(MemberId),
    /// Head was handed to the transfer mechanism and removed
    Transferred(Member),
}

pub struct TransferProcessor {
    resolver: Arc<dyn IdentityResolver>,
    sink: Arc<dyn PresentationSink>,
    transfer: Arc<dyn TransferMechanism>,
    stale_head_policy: StaleHeadPolicy,
}

impl TransferProcessor {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        sink: Arc<dyn PresentationSink>,
        transfer: Arc<dyn TransferMechanism>,
        stale_head_policy: StaleHeadPolicy,
    ) -> Self {
        Self {
            resolver,
            sink,
            transfer,
            stale_head_policy,
        }
    }

    /// Transfer at most one member out of a locked queue.
    ///
    /// Safe to call when nothing is eligible.
    pub fn drain(&self, queue: &mut Queue, notifiers: &NotifierRegistry) -> DrainOutcome {
        if queue.is_paused() {
            debug!(queue = %queue.name(), "Queue paused, not draining");
            return DrainOutcome::Idle;
        }

        loop {
            let Some(head) = queue.peek_head().cloned() else {
                return DrainOutcome::Idle;
            };

            let Some(handle) = self.resolver.resolve(&head.id) else {
                match self.stale_head_policy {
                    StaleHeadPolicy::Hold => {
                        debug!(
                            queue = %queue.name(),
                            member_id = %head.id,
                            "Head member offline, holding position"
                        );
                        return DrainOutcome::Stalled(head.id);
                    }
                    StaleHeadPolicy::Drop => {
                        info!(
                            queue = %queue.name(),
                            member_id = %head.id,
                            "Dropping offline head member"
                        );
                        notifiers.cancel(queue.name(), &head.id);
                        queue.pop_head();
                        continue;
                    }
                }
            };

            self.hand_off(handle, queue.name());
            notifiers.cancel(queue.name(), &head.id);
            queue.pop_head();

            info!(
                queue = %queue.name(),
                member_id = %head.id,
                member = %head.display_name,
                remaining = queue.len(),
                "Member transferred out of queue"
            );

            if let Some(next) = queue.peek_head() {
                if let Some(next_handle) = self.resolver.resolve(&next.id) {
                    self.sink.notify(
                        &next_handle,
                        Notice::FirstInLine {
                            queue: queue.name().to_string(),
                        },
                    );
                }
            }

            return DrainOutcome::Transferred(head);
        }
    }

    fn hand_off(&self, handle: LiveHandle, destination: &str) {
        let transfer = Arc::clone(&self.transfer);
        let destination = destination.to_string();

        tokio::spawn(async move {
            match transfer.transfer(&handle, &destination).await {
                Ok(()) => debug!(
                    member_id = %handle.member_id,
                    destination = %destination,
                    "Transfer accepted"
                ),
                Err(e) => warn!(
                    member_id = %handle.member_id,
                    destination = %destination,
                    error = %e,
                    "Transfer failed; member is not requeued"
                ),
            }
        });
    }
}
