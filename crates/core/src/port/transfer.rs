// Transfer Mechanism Port
// Moves a connected client to its destination server

use super::identity_resolver::LiveHandle;
use async_trait::async_trait;
use thiserror::Error;

/// Transfer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Client disconnected: {0}")]
    Disconnected(String),

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Transfer mechanism trait
///
/// The core spawns each call and never awaits it while holding queue state;
/// the returned error is logged and not retried.
#[async_trait]
pub trait TransferMechanism: Send + Sync {
    async fn transfer(&self, handle: &LiveHandle, destination: &str) -> Result<(), TransferError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::MemberId;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Mock transfer behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        Accept,
        Reject(String),
    }

    /// Transfer mechanism that records calls
    pub struct MockTransfer {
        behavior: Mutex<MockBehavior>,
        calls: Mutex<Vec<(MemberId, String)>>,
        called: Notify,
    }

    impl MockTransfer {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                calls: Mutex::new(Vec::new()),
                called: Notify::new(),
            }
        }

        pub fn new_accepting() -> Self {
            Self::new(MockBehavior::Accept)
        }

        pub fn new_rejecting(reason: impl Into<String>) -> Self {
            Self::new(MockBehavior::Reject(reason.into()))
        }

        pub fn calls(&self) -> Vec<(MemberId, String)> {
            self.calls.lock().unwrap().clone()
        }

        /// Wait until at least `n` transfers were requested (1s cap)
        pub async fn wait_for_calls(&self, n: usize) -> bool {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
            loop {
                let notified = self.called.notified();
                if self.calls.lock().unwrap().len() >= n {
                    return true;
                }
                if tokio::time::timeout_at(deadline, notified).await.is_err() {
                    return self.calls.lock().unwrap().len() >= n;
                }
            }
        }
    }

    #[async_trait]
    impl TransferMechanism for MockTransfer {
        async fn transfer(
            &self,
            handle: &LiveHandle,
            destination: &str,
        ) -> Result<(), TransferError> {
            self.calls
                .lock()
                .unwrap()
                .push((handle.member_id, destination.to_string()));
            self.called.notify_waiters();

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Accept => Ok(()),
                MockBehavior::Reject(reason) => Err(TransferError::Rejected(reason)),
            }
        }
    }
}
