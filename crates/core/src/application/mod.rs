// Application Layer - Use Cases and Coordination

pub mod constants;
pub mod notifier;
pub mod priority;
pub mod queue_service;
pub mod store;
pub mod transfer;

// Re-exports
pub use notifier::{NotifierHandle, PositionNotifier};
pub use priority::detect_overtaken;
pub use queue_service::{JoinOutcome, QueueService, QueueServiceConfig, QueueSummary};
pub use store::QueueStore;
pub use transfer::{DrainOutcome, StaleHeadPolicy, TransferProcessor};
