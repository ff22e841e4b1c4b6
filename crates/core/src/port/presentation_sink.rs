// Presentation Sink Port
// Delivers queue notices to a connected client

use super::identity_resolver::LiveHandle;
use serde::{Deserialize, Serialize};

/// Queue event addressed to one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Joined { queue: String },
    Left { queue: String },
    Position { queue: String, rank: usize, total: usize },
    Overtaken { queue: String },
    FirstInLine { queue: String },
    Paused { queue: String },
    Resumed { queue: String },
}

impl Notice {
    pub fn queue(&self) -> &str {
        match self {
            Notice::Joined { queue }
            | Notice::Left { queue }
            | Notice::Position { queue, .. }
            | Notice::Overtaken { queue }
            | Notice::FirstInLine { queue }
            | Notice::Paused { queue }
            | Notice::Resumed { queue } => queue,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Joined { queue } => write!(f, "You have entered the {} queue.", queue),
            Notice::Left { queue } => {
                write!(f, "You have left your queue position for {}.", queue)
            }
            Notice::Position { rank, total, .. } => {
                write!(f, "You are currently position #{} out of {}.", rank, total)
            }
            Notice::Overtaken { queue } => write!(
                f,
                "Someone with a higher rank has joined the {} queue.",
                queue
            ),
            Notice::FirstInLine { queue } => {
                write!(f, "You are now first in line for {}.", queue)
            }
            Notice::Paused { queue } => write!(f, "The {} queue has been paused.", queue),
            Notice::Resumed { queue } => write!(f, "The {} queue has been unpaused.", queue),
        }
    }
}

/// Presentation sink interface (fire-and-forget)
pub trait PresentationSink: Send + Sync {
    fn notify(&self, handle: &LiveHandle, notice: Notice);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::MemberId;
    use std::sync::Mutex;

    /// Sink that records every notice it receives
    #[derive(Default)]
    pub struct RecordingSink {
        sent: Mutex<Vec<(MemberId, Notice)>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn all(&self) -> Vec<(MemberId, Notice)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn notices_for(&self, id: &MemberId) -> Vec<Notice> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(to, _)| to == id)
                .map(|(_, notice)| notice.clone())
                .collect()
        }

        /// Count notices sent to `id` that match `predicate`
        pub fn count_for(&self, id: &MemberId, predicate: impl Fn(&Notice) -> bool) -> usize {
            self.notices_for(id).iter().filter(|n| predicate(n)).count()
        }

        pub fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }
    }

    impl PresentationSink for RecordingSink {
        fn notify(&self, handle: &LiveHandle, notice: Notice) {
            self.sent.lock().unwrap().push((handle.member_id, notice));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text_names_the_queue() {
        let notice = Notice::FirstInLine {
            queue: "survival".to_string(),
        };
        assert_eq!(notice.to_string(), "You are now first in line for survival.");
        assert_eq!(notice.queue(), "survival");
    }

    #[test]
    fn test_notice_serializes_with_kind_tag() {
        let notice = Notice::Position {
            queue: "survival".to_string(),
            rank: 2,
            total: 5,
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "position");
        assert_eq!(json["rank"], 2);
    }
}
