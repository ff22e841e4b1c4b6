//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use queuegate_core::application::{JoinOutcome, QueueSummary};
use queuegate_core::domain::{MemberId, Priority, QueueState};
use queuegate_infra_session::Outbound;
use serde::{Deserialize, Serialize};

/// session.connect.v1 - Register a client connection
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Stable identity; a new one is issued when omitted
    #[serde(default)]
    pub member_id: Option<MemberId>,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub member_id: MemberId,
    pub connection_id: u64,
}

/// Addresses one live connection (session.disconnect.v1, session.poll.v1)
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub member_id: MemberId,
    pub connection_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub disconnected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub frames: Vec<Outbound>,
}

/// queue.join.v1 - Toggle membership in a queue
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub queue: String,
    pub member_id: MemberId,
    pub connection_id: u64,
    #[serde(default)]
    pub priority_weight: Priority,
}

/// queue.leave.v1 - Leave a queue (never joins)
#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub queue: String,
    pub member_id: MemberId,
    pub connection_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub queue: String,
    pub outcome: JoinOutcome,
}

/// queue.pause.v1 / queue.resume.v1 / queue.describe.v1
#[derive(Debug, Deserialize)]
pub struct QueueRequest {
    pub queue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseResponse {
    pub queue: String,
    /// False when the queue was already in the requested state
    pub changed: bool,
    pub state: QueueState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub rank: usize,
    pub display_name: String,
    pub priority_weight: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeResponse {
    pub queue: String,
    pub text: String,
    pub members: Vec<QueueEntry>,
}

/// queue.list.v1 (takes no parameters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub queues: Vec<QueueSummary>,
}
