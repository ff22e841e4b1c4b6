//! RPC Method Handlers
//!
//! Implements each JSON-RPC method on top of `QueueService` and the session
//! registry.

use crate::error::{session_error, throttled, to_rpc_error};
use crate::throttle::ToggleThrottle;
use crate::types::{
    ConnectRequest, ConnectResponse, DescribeResponse, DisconnectResponse, JoinRequest,
    JoinResponse, LeaveRequest, ListResponse, PauseResponse, PollResponse, QueueEntry,
    QueueRequest, SessionRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use queuegate_core::application::QueueService;
use queuegate_core::domain::{Member, MemberId, QueueState};
use queuegate_core::error::AppError;
use queuegate_core::port::LiveHandle;
use queuegate_infra_session::SessionRegistry;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<QueueService>,
    sessions: Arc<SessionRegistry>,
    throttle: ToggleThrottle,
}

impl RpcHandler {
    pub fn new(
        service: Arc<QueueService>,
        sessions: Arc<SessionRegistry>,
        throttle: ToggleThrottle,
    ) -> Self {
        Self {
            service,
            sessions,
            throttle,
        }
    }

    /// session.connect.v1
    pub async fn connect(&self, params: ConnectRequest) -> Result<ConnectResponse, ErrorObjectOwned> {
        if params.display_name.trim().is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "display_name must not be empty".to_string(),
            )));
        }

        let member_id = params.member_id.unwrap_or_else(Uuid::new_v4);
        let handle = self.sessions.connect(member_id, params.display_name);

        Ok(ConnectResponse {
            member_id: handle.member_id,
            connection_id: handle.connection_id,
        })
    }

    /// session.disconnect.v1
    ///
    /// Queue positions are kept; the member is simply unresolvable until it
    /// reconnects.
    pub async fn disconnect(
        &self,
        params: SessionRequest,
    ) -> Result<DisconnectResponse, ErrorObjectOwned> {
        let handle = LiveHandle::new(params.member_id, params.connection_id);
        let disconnected = self.sessions.disconnect(&handle);
        if disconnected {
            self.throttle.forget(&params.member_id);
        }

        Ok(DisconnectResponse { disconnected })
    }

    /// session.poll.v1
    pub async fn poll(&self, params: SessionRequest) -> Result<PollResponse, ErrorObjectOwned> {
        let handle = LiveHandle::new(params.member_id, params.connection_id);
        let frames = self.sessions.drain_inbox(&handle).map_err(session_error)?;

        Ok(PollResponse { frames })
    }

    /// queue.join.v1
    pub async fn join(&self, params: JoinRequest) -> Result<JoinResponse, ErrorObjectOwned> {
        let handle = self.toggle_handle(params.member_id, params.connection_id)?;
        let display_name = self
            .sessions
            .display_name(&params.member_id)
            .unwrap_or_default();

        let member = Member::new(params.member_id, display_name, params.priority_weight);
        let outcome = self
            .service
            .join(&params.queue, member, &handle)
            .await
            .map_err(to_rpc_error)?;

        debug!(queue = %params.queue, member_id = %params.member_id, outcome = ?outcome, "queue.join.v1");
        Ok(JoinResponse {
            queue: params.queue,
            outcome,
        })
    }

    /// queue.leave.v1
    pub async fn leave(&self, params: LeaveRequest) -> Result<JoinResponse, ErrorObjectOwned> {
        let handle = self.toggle_handle(params.member_id, params.connection_id)?;
        let outcome = self
            .service
            .leave(&params.queue, &params.member_id, &handle)
            .await
            .map_err(to_rpc_error)?;

        Ok(JoinResponse {
            queue: params.queue,
            outcome,
        })
    }

    /// queue.pause.v1
    pub async fn pause(&self, params: QueueRequest) -> Result<PauseResponse, ErrorObjectOwned> {
        let changed = self
            .service
            .pause(&params.queue)
            .await
            .map_err(to_rpc_error)?;

        Ok(PauseResponse {
            queue: params.queue,
            changed,
            state: QueueState::Paused,
        })
    }

    /// queue.resume.v1
    pub async fn resume(&self, params: QueueRequest) -> Result<PauseResponse, ErrorObjectOwned> {
        let changed = self
            .service
            .resume(&params.queue)
            .await
            .map_err(to_rpc_error)?;

        Ok(PauseResponse {
            queue: params.queue,
            changed,
            state: QueueState::Active,
        })
    }

    /// queue.describe.v1
    pub async fn describe(&self, params: QueueRequest) -> Result<DescribeResponse, ErrorObjectOwned> {
        let text = self.service.describe(&params.queue).await;
        let members = self
            .service
            .snapshot(&params.queue)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, member)| QueueEntry {
                rank: index + 1,
                display_name: member.display_name,
                priority_weight: member.priority_weight,
            })
            .collect();

        Ok(DescribeResponse {
            queue: params.queue,
            text,
            members,
        })
    }

    /// queue.list.v1
    pub async fn list(&self) -> Result<ListResponse, ErrorObjectOwned> {
        Ok(ListResponse {
            queues: self.service.list().await,
        })
    }

    /// Validate the caller's connection and charge one toggle token
    fn toggle_handle(
        &self,
        member_id: MemberId,
        connection_id: u64,
    ) -> Result<LiveHandle, ErrorObjectOwned> {
        let handle = LiveHandle::new(member_id, connection_id);
        self.sessions
            .ensure_current(&handle)
            .map_err(session_error)?;

        if !self.throttle.check(&member_id) {
            return Err(throttled(&member_id));
        }
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use crate::throttle::ThrottleConfig;
    use queuegate_core::application::{JoinOutcome, QueueServiceConfig};
    use queuegate_core::port::time_provider::mocks::ManualTimeProvider;
    use queuegate_core::port::transfer::mocks::MockTransfer;
    use queuegate_infra_session::Outbound;
    use tokio_test::{assert_err, assert_ok};

    fn handler(burst: u32) -> RpcHandler {
        let sessions = Arc::new(SessionRegistry::default());
        let service = Arc::new(QueueService::new(
            sessions.clone(),
            sessions.clone(),
            sessions.clone(),
            Arc::new(MockTransfer::new_accepting()),
            QueueServiceConfig::default(),
        ));
        let throttle = ToggleThrottle::new(
            ThrottleConfig {
                burst,
                refill_per_sec: 1,
            },
            Arc::new(ManualTimeProvider::new(0)),
        );
        RpcHandler::new(service, sessions, throttle)
    }

    async fn connect(handler: &RpcHandler, name: &str) -> ConnectResponse {
        assert_ok!(
            handler
                .connect(ConnectRequest {
                    member_id: None,
                    display_name: name.to_string(),
                })
                .await
        )
    }

    fn join_request(queue: &str, session: &ConnectResponse, weight: i32) -> JoinRequest {
        JoinRequest {
            queue: queue.to_string(),
            member_id: session.member_id,
            connection_id: session.connection_id,
            priority_weight: weight,
        }
    }

    #[tokio::test]
    async fn test_join_uses_session_display_name() {
        let handler = handler(5);
        let alice = connect(&handler, "alice").await;
        // Pause so the only member is not transferred straight away
        assert_ok!(
            handler
                .pause(QueueRequest {
                    queue: "survival".to_string()
                })
                .await
        );

        let response = assert_ok!(handler.join(join_request("survival", &alice, 1)).await);
        assert_eq!(response.outcome, JoinOutcome::Joined { rank: 1, total: 1 });

        let described = assert_ok!(
            handler
                .describe(QueueRequest {
                    queue: "survival".to_string()
                })
                .await
        );
        assert_eq!(described.text, "1 - alice");
        assert_eq!(described.members[0].display_name, "alice");
    }

    #[tokio::test]
    async fn test_join_with_stale_connection_is_rejected() {
        let handler = handler(5);
        let alice = connect(&handler, "alice").await;
        assert_ok!(
            handler
                .disconnect(SessionRequest {
                    member_id: alice.member_id,
                    connection_id: alice.connection_id,
                })
                .await
        );

        let err = assert_err!(handler.join(join_request("survival", &alice, 1)).await);
        assert_eq!(err.code(), code::SESSION_INVALID);
    }

    #[tokio::test]
    async fn test_toggle_spam_is_throttled() {
        let handler = handler(2);
        let alice = connect(&handler, "alice").await;

        assert_ok!(handler.join(join_request("survival", &alice, 1)).await);
        assert_ok!(handler.join(join_request("survival", &alice, 1)).await);
        let err = assert_err!(handler.join(join_request("survival", &alice, 1)).await);
        assert_eq!(err.code(), code::THROTTLED);
    }

    #[tokio::test]
    async fn test_invalid_queue_name_maps_to_validation_error() {
        let handler = handler(5);
        let alice = connect(&handler, "alice").await;

        let err = assert_err!(handler.join(join_request("bad name!", &alice, 1)).await);
        assert_eq!(err.code(), code::VALIDATION_ERROR);
    }

    #[tokio::test]
    async fn test_poll_returns_queued_frames() {
        let handler = handler(5);
        let alice = connect(&handler, "alice").await;
        assert_ok!(
            handler
                .pause(QueueRequest {
                    queue: "survival".to_string()
                })
                .await
        );
        assert_ok!(handler.join(join_request("survival", &alice, 1)).await);

        let polled = assert_ok!(
            handler
                .poll(SessionRequest {
                    member_id: alice.member_id,
                    connection_id: alice.connection_id,
                })
                .await
        );
        assert!(polled.frames.iter().any(|frame| matches!(
            frame,
            Outbound::Message { text, .. } if text == "You have entered the survival queue."
        )));
    }

    #[tokio::test]
    async fn test_blank_display_name_is_rejected() {
        let handler = handler(5);
        let err = assert_err!(
            handler
                .connect(ConnectRequest {
                    member_id: None,
                    display_name: "  ".to_string(),
                })
                .await
        );
        assert_eq!(err.code(), code::VALIDATION_ERROR);
    }

    #[tokio::test]
    async fn test_pause_twice_reports_no_change() {
        let handler = handler(5);
        let request = || QueueRequest {
            queue: "survival".to_string(),
        };

        assert!(assert_ok!(handler.pause(request()).await).changed);
        assert!(!assert_ok!(handler.pause(request()).await).changed);

        let listed = assert_ok!(handler.list().await);
        assert_eq!(listed.queues.len(), 1);
        assert_eq!(listed.queues[0].state, QueueState::Paused);
    }
}
