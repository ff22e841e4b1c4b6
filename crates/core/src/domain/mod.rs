// Domain Layer - Pure queue model and validation

pub mod error;
pub mod member;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use member::{Member, MemberId, Priority};
pub use queue::{validate_member, validate_queue_name, Queue, QueueName, QueueState};
