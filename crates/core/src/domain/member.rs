// Member Domain Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Member ID (stable client identity)
pub type MemberId = Uuid;

/// Priority weight (higher number = served sooner)
pub type Priority = i32;

/// A client waiting in a queue.
///
/// Identity is the `id` alone. `display_name` and `priority_weight` are the
/// values captured when the member joined and may be stale afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    pub priority_weight: Priority,
}

impl Member {
    pub fn new(id: MemberId, display_name: impl Into<String>, priority_weight: Priority) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            priority_weight,
        }
    }

    /// Create a member with a random ID (for tests only)
    pub fn new_test(display_name: impl Into<String>, priority_weight: Priority) -> Self {
        Self::new(Uuid::new_v4(), display_name, priority_weight)
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Member {}

impl std::hash::Hash for Member {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
