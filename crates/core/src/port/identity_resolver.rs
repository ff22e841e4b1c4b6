// Identity Resolver Port
// Maps a stored member ID to a currently-connected client

use crate::domain::MemberId;
use serde::{Deserialize, Serialize};

/// Addressable handle of a connected client
///
/// `connection_id` distinguishes reconnects of the same member: a handle taken
/// before a reconnect no longer addresses the new connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiveHandle {
    pub member_id: MemberId,
    pub connection_id: u64,
}

impl LiveHandle {
    pub fn new(member_id: MemberId, connection_id: u64) -> Self {
        Self {
            member_id,
            connection_id,
        }
    }
}

/// Identity resolver interface
///
/// Called on every broadcast, tick and drain; implementations must be cheap.
/// `None` means "not connected right now" and is never an error.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, id: &MemberId) -> Option<LiveHandle>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Resolver whose online set is driven by the test
    #[derive(Default)]
    pub struct MockIdentityResolver {
        online: Mutex<HashMap<MemberId, LiveHandle>>,
        next_connection: AtomicU64,
    }

    impl MockIdentityResolver {
        pub fn new() -> Self {
            Self::default()
        }

        /// Mark a member as connected and return its handle
        pub fn connect(&self, id: MemberId) -> LiveHandle {
            let connection_id = self.next_connection.fetch_add(1, Ordering::SeqCst) + 1;
            let handle = LiveHandle::new(id, connection_id);
            self.online.lock().unwrap().insert(id, handle.clone());
            handle
        }

        pub fn disconnect(&self, id: &MemberId) {
            self.online.lock().unwrap().remove(id);
        }
    }

    impl IdentityResolver for MockIdentityResolver {
        fn resolve(&self, id: &MemberId) -> Option<LiveHandle> {
            self.online.lock().unwrap().get(id).cloned()
        }
    }
}
