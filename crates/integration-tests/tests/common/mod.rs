//! Shared harness: QueueService wired to the real session adapter

#![allow(dead_code)]

use queuegate_core::application::{QueueService, QueueServiceConfig, StaleHeadPolicy};
use queuegate_core::domain::Member;
use queuegate_core::port::{LiveHandle, Notice};
use queuegate_infra_session::{Outbound, ProxyTransfer, SessionRegistry};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const QUEUE: &str = "survival";

pub struct Harness {
    pub sessions: Arc<SessionRegistry>,
    pub service: Arc<QueueService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(QueueServiceConfig::default())
    }

    pub fn with_policy(policy: StaleHeadPolicy) -> Self {
        Self::with_config(QueueServiceConfig {
            stale_head_policy: policy,
            ..Default::default()
        })
    }

    pub fn with_config(config: QueueServiceConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::default());
        let service = Arc::new(QueueService::new(
            sessions.clone(),
            sessions.clone(),
            sessions.clone(),
            Arc::new(ProxyTransfer::new(sessions.clone())),
            config,
        ));
        Self { sessions, service }
    }

    /// Connect a new client and build its member record
    pub fn connect(&self, name: &str, weight: i32) -> (Member, LiveHandle) {
        let member = Member::new(Uuid::new_v4(), name, weight);
        let handle = self.sessions.connect(member.id, name);
        (member, handle)
    }

    /// Connect and toggle into `queue`
    pub async fn join(&self, queue: &str, name: &str, weight: i32) -> (Member, LiveHandle) {
        let (member, handle) = self.connect(name, weight);
        self.service
            .join(queue, member.clone(), &handle)
            .await
            .expect("join failed");
        (member, handle)
    }

    pub async fn order(&self, queue: &str) -> Vec<String> {
        self.service
            .snapshot(queue)
            .await
            .into_iter()
            .map(|m| m.display_name)
            .collect()
    }

    pub fn frames(&self, handle: &LiveHandle) -> Vec<Outbound> {
        self.sessions.drain_inbox(handle).expect("session gone")
    }

    /// Poll a session until a frame matches (1s of runtime time)
    pub async fn wait_for_frame(
        &self,
        handle: &LiveHandle,
        pred: impl Fn(&Outbound) -> bool,
    ) -> Vec<Outbound> {
        let mut seen = Vec::new();
        for _ in 0..100 {
            seen.extend(self.frames(handle));
            if seen.iter().any(&pred) {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no matching frame, got {:?}", seen);
    }
}

pub fn notices(frames: &[Outbound]) -> Vec<Notice> {
    frames
        .iter()
        .filter_map(|frame| match frame {
            Outbound::Message { notice, .. } => Some(notice.clone()),
            _ => None,
        })
        .collect()
}

pub fn texts(frames: &[Outbound]) -> Vec<String> {
    frames
        .iter()
        .filter_map(|frame| match frame {
            Outbound::Message { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn displays(frames: &[Outbound]) -> Vec<(Option<usize>, usize)> {
    frames
        .iter()
        .filter_map(|frame| match frame {
            Outbound::QueueDisplay { rank, total, .. } => Some((*rank, *total)),
            _ => None,
        })
        .collect()
}

pub fn is_transfer(frame: &Outbound) -> bool {
    matches!(frame, Outbound::Transfer { .. })
}
