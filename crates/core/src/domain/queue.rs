// Queue Domain Model

use super::error::{DomainError, Result};
use super::member::{Member, MemberId};
use serde::{Deserialize, Serialize};

/// Queue identifier (also the transfer destination)
pub type QueueName = String;

/// Maximum queue name length accepted from callers
pub const MAX_QUEUE_NAME_LEN: usize = 64;

/// Queue admission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueState {
    Active,
    Paused,
}

impl std::fmt::Display for QueueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueState::Active => write!(f, "ACTIVE"),
            QueueState::Paused => write!(f, "PAUSED"),
        }
    }
}

/// Named waiting list ordered by descending priority weight.
///
/// Members with equal weight keep their join order: a newcomer is inserted
/// after every member whose weight is greater than or equal to its own.
#[derive(Debug, Clone)]
pub struct Queue {
    name: QueueName,
    members: Vec<Member>,
    state: QueueState,
}

impl Queue {
    pub fn new(name: impl Into<QueueName>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            state: QueueState::Active,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert `member` if absent, remove it if present.
    ///
    /// Returns `(joined, snapshot_before)` where the snapshot is the order
    /// prior to the mutation.
    pub fn toggle(&mut self, member: Member) -> (bool, Vec<Member>) {
        let before = self.members.clone();

        let joined = match self.position(&member.id) {
            Some(index) => {
                self.members.remove(index);
                false
            }
            None => {
                let weight = member.priority_weight;
                let index = self
                    .members
                    .partition_point(|queued| queued.priority_weight >= weight);
                self.members.insert(index, member);
                true
            }
        };

        assert!(self.is_ordered(), "queue {} lost its ordering", self.name);
        (joined, before)
    }

    /// Zero-based index of a member
    pub fn position(&self, id: &MemberId) -> Option<usize> {
        self.members.iter().position(|m| &m.id == id)
    }

    /// One-based rank of a member
    pub fn rank(&self, id: &MemberId) -> Option<usize> {
        self.position(id).map(|index| index + 1)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn current_order(&self) -> Vec<Member> {
        self.members.clone()
    }

    pub fn peek_head(&self) -> Option<&Member> {
        self.members.first()
    }

    pub fn pop_head(&mut self) -> Option<Member> {
        if self.members.is_empty() {
            None
        } else {
            Some(self.members.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.state = if paused {
            QueueState::Paused
        } else {
            QueueState::Active
        };
    }

    pub fn is_paused(&self) -> bool {
        self.state == QueueState::Paused
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    fn is_ordered(&self) -> bool {
        self.members
            .windows(2)
            .all(|pair| pair[0].priority_weight >= pair[1].priority_weight)
    }
}

/// Validate a caller-supplied queue name
pub fn validate_queue_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DomainError::InvalidQueueName(
            "queue name is empty".to_string(),
        ));
    }
    if name.len() > MAX_QUEUE_NAME_LEN {
        return Err(DomainError::InvalidQueueName(format!(
            "queue name too long ({} > {})",
            name.len(),
            MAX_QUEUE_NAME_LEN
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DomainError::InvalidQueueName(format!(
            "'{}' must be alphanumeric, '_' or '-'",
            name
        )));
    }
    Ok(())
}

/// Validate a member before it enters a queue
pub fn validate_member(member: &Member) -> Result<()> {
    if member.display_name.trim().is_empty() {
        return Err(DomainError::ValidationError(format!(
            "member {} has an empty display name",
            member.id
        )));
    }
    Ok(())
}
