// Proxy transfer (hand-off instruction queued on the member's session)

use crate::session_registry::{Outbound, SessionRegistry};
use async_trait::async_trait;
use queuegate_core::port::{LiveHandle, TransferError, TransferMechanism};
use std::sync::Arc;
use tracing::info;

/// Tells the connected client to switch to the destination server
pub struct ProxyTransfer {
    sessions: Arc<SessionRegistry>,
}

impl ProxyTransfer {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl TransferMechanism for ProxyTransfer {
    async fn transfer(&self, handle: &LiveHandle, destination: &str) -> Result<(), TransferError> {
        let queued = self.sessions.push(
            handle,
            Outbound::Transfer {
                destination: destination.to_string(),
            },
        );

        if !queued {
            return Err(TransferError::Disconnected(format!(
                "member {} connection {}",
                handle.member_id, handle.connection_id
            )));
        }

        info!(
            member_id = %handle.member_id,
            destination = %destination,
            "Transfer instruction queued"
        );
        Ok(())
    }
}
