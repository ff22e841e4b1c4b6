// Notifier Registry - live notifier tasks keyed by (queue, member)

use super::NotifierHandle;
use crate::domain::{MemberId, QueueName};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

type NotifierKey = (QueueName, MemberId);

/// Set of live notifiers. Mutated only while the owning queue is locked.
#[derive(Default)]
pub struct NotifierRegistry {
    handles: Mutex<HashMap<NotifierKey, NotifierHandle>>,
}

impl NotifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly spawned notifier.
    ///
    /// # Panics
    /// If a notifier is already tracked for the same queue and member.
    pub(crate) fn insert(&self, queue: &str, member_id: MemberId, handle: NotifierHandle) {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = handles.insert((queue.to_string(), member_id), handle);
        assert!(
            previous.is_none(),
            "duplicate position notifier for member {} in queue {}",
            member_id,
            queue
        );
    }

    /// Cancel and discard a member's notifier; returns whether one existed
    pub(crate) fn cancel(&self, queue: &str, member_id: &MemberId) -> bool {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        match handles.remove(&(queue.to_string(), *member_id)) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every notifier and hand the handles back for joining
    pub(crate) fn cancel_all(&self) -> Vec<NotifierHandle> {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles
            .drain()
            .map(|(_, handle)| {
                handle.cancel();
                handle
            })
            .collect()
    }

    pub fn contains(&self, queue: &str, member_id: &MemberId) -> bool {
        let handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.contains_key(&(queue.to_string(), *member_id))
    }

    /// Number of live notifiers for a queue
    pub fn count(&self, queue: &str) -> usize {
        let handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.keys().filter(|(name, _)| name == queue).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notifier::cancel_channel;
    use uuid::Uuid;

    fn idle_handle() -> NotifierHandle {
        let (cancel, _token) = cancel_channel();
        NotifierHandle {
            cancel,
            task: tokio::spawn(async {}),
        }
    }

    #[tokio::test]
    async fn test_cancel_removes_only_that_member() {
        let registry = NotifierRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        registry.insert("survival", alice, idle_handle());
        registry.insert("survival", bob, idle_handle());
        registry.insert("creative", alice, idle_handle());

        assert!(registry.cancel("survival", &alice));
        assert!(!registry.cancel("survival", &alice));

        assert!(!registry.contains("survival", &alice));
        assert!(registry.contains("creative", &alice));
        assert_eq!(registry.count("survival"), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "duplicate position notifier")]
    async fn test_second_notifier_for_same_member_panics() {
        let registry = NotifierRegistry::new();
        let alice = Uuid::new_v4();
        registry.insert("survival", alice, idle_handle());
        registry.insert("survival", alice, idle_handle());
    }
}
