// Session Registry - in-process connection table with per-member inboxes

use queuegate_core::domain::MemberId;
use queuegate_core::port::{IdentityResolver, LiveHandle, Notice, PresentationSink, QueueDisplay};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Frames kept per session before the oldest is dropped
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub inbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not connected: member {0}")]
    NotConnected(MemberId),

    #[error("Stale connection {connection_id} for member {member_id}")]
    StaleConnection {
        member_id: MemberId,
        connection_id: u64,
    },
}

/// One frame waiting to be polled by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Chat-style notice with its rendered text
    Message { text: String, notice: Notice },
    /// Sidebar rank; `rank == None` clears it
    QueueDisplay {
        queue: String,
        rank: Option<usize>,
        total: usize,
    },
    /// Proxy hand-off to the destination server
    Transfer { destination: String },
}

struct Session {
    display_name: String,
    connection_id: u64,
    inbox: VecDeque<Outbound>,
}

/// Connected members, addressed by `LiveHandle`
pub struct SessionRegistry {
    config: SessionConfig,
    sessions: RwLock<HashMap<MemberId, Session>>,
    next_connection: AtomicU64,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            next_connection: AtomicU64::new(0),
        }
    }

    /// Register a connection, replacing any previous one for the same member.
    ///
    /// Frames buffered for the old connection are discarded.
    pub fn connect(&self, member_id: MemberId, display_name: impl Into<String>) -> LiveHandle {
        let connection_id = self.next_connection.fetch_add(1, Ordering::SeqCst) + 1;
        let display_name = display_name.into();

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = sessions
            .insert(
                member_id,
                Session {
                    display_name: display_name.clone(),
                    connection_id,
                    inbox: VecDeque::new(),
                },
            )
            .is_some();

        info!(
            member_id = %member_id,
            member = %display_name,
            connection_id,
            replaced,
            "Session connected"
        );
        LiveHandle::new(member_id, connection_id)
    }

    /// Drop the session if `handle` is still its current connection
    pub fn disconnect(&self, handle: &LiveHandle) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let current = sessions
            .get(&handle.member_id)
            .is_some_and(|s| s.connection_id == handle.connection_id);

        if current {
            sessions.remove(&handle.member_id);
            info!(
                member_id = %handle.member_id,
                connection_id = handle.connection_id,
                "Session disconnected"
            );
        }
        current
    }

    /// Take every buffered frame for a connection
    pub fn drain_inbox(&self, handle: &LiveHandle) -> Result<Vec<Outbound>, SessionError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let session = sessions
            .get_mut(&handle.member_id)
            .ok_or(SessionError::NotConnected(handle.member_id))?;
        check_connection(session, handle)?;

        Ok(session.inbox.drain(..).collect())
    }

    pub fn display_name(&self, member_id: &MemberId) -> Option<String> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(member_id).map(|s| s.display_name.clone())
    }

    /// Check that `handle` addresses the member's current connection
    pub fn ensure_current(&self, handle: &LiveHandle) -> Result<(), SessionError> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let session = sessions
            .get(&handle.member_id)
            .ok_or(SessionError::NotConnected(handle.member_id))?;
        check_connection(session, handle)
    }

    pub fn is_current(&self, handle: &LiveHandle) -> bool {
        self.ensure_current(handle).is_ok()
    }

    pub fn connected_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Queue a frame for a connection; false if the handle is stale
    pub(crate) fn push(&self, handle: &LiveHandle, frame: Outbound) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let Some(session) = sessions
            .get_mut(&handle.member_id)
            .filter(|s| s.connection_id == handle.connection_id)
        else {
            debug!(
                member_id = %handle.member_id,
                connection_id = handle.connection_id,
                "Dropping frame for stale handle"
            );
            return false;
        };

        if session.inbox.len() >= self.config.inbox_capacity {
            session.inbox.pop_front();
            warn!(
                member_id = %handle.member_id,
                capacity = self.config.inbox_capacity,
                "Session inbox full, dropped oldest frame"
            );
        }
        session.inbox.push_back(frame);
        true
    }
}

fn check_connection(session: &Session, handle: &LiveHandle) -> Result<(), SessionError> {
    if session.connection_id != handle.connection_id {
        return Err(SessionError::StaleConnection {
            member_id: handle.member_id,
            connection_id: handle.connection_id,
        });
    }
    Ok(())
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl IdentityResolver for SessionRegistry {
    fn resolve(&self, id: &MemberId) -> Option<LiveHandle> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(id)
            .map(|s| LiveHandle::new(*id, s.connection_id))
    }
}

impl PresentationSink for SessionRegistry {
    fn notify(&self, handle: &LiveHandle, notice: Notice) {
        let text = notice.to_string();
        self.push(handle, Outbound::Message { text, notice });
    }
}

impl QueueDisplay for SessionRegistry {
    fn update_queue(&self, handle: &LiveHandle, rank: Option<usize>, queue: &str, total: usize) {
        self.push(
            handle,
            Outbound::QueueDisplay {
                queue: queue.to_string(),
                rank,
                total,
            },
        );
    }
}
