// Queue Display Port
// Secondary, best-effort rank display (e.g. a sidebar board)

use super::identity_resolver::LiveHandle;

/// Rank display interface
///
/// `rank == None` clears the member's display for `queue`.
pub trait QueueDisplay: Send + Sync {
    fn update_queue(&self, handle: &LiveHandle, rank: Option<usize>, queue: &str, total: usize);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::MemberId;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DisplayUpdate {
        pub member_id: MemberId,
        pub rank: Option<usize>,
        pub queue: String,
        pub total: usize,
    }

    /// Display that records every update
    #[derive(Default)]
    pub struct RecordingDisplay {
        updates: Mutex<Vec<DisplayUpdate>>,
    }

    impl RecordingDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn updates_for(&self, id: &MemberId) -> Vec<DisplayUpdate> {
            self.updates
                .lock()
                .unwrap()
                .iter()
                .filter(|u| &u.member_id == id)
                .cloned()
                .collect()
        }

        pub fn last_for(&self, id: &MemberId) -> Option<DisplayUpdate> {
            self.updates_for(id).pop()
        }
    }

    impl QueueDisplay for RecordingDisplay {
        fn update_queue(
            &self,
            handle: &LiveHandle,
            rank: Option<usize>,
            queue: &str,
            total: usize,
        ) {
            self.updates.lock().unwrap().push(DisplayUpdate {
                member_id: handle.member_id,
                rank,
                queue: queue.to_string(),
                total,
            });
        }
    }
}
