// Port Layer - Interfaces for external collaborators

pub mod identity_resolver;
pub mod presentation_sink;
pub mod queue_display;
pub mod time_provider; // For deterministic testing
pub mod transfer;

// Re-exports
pub use identity_resolver::{IdentityResolver, LiveHandle};
pub use presentation_sink::{Notice, PresentationSink};
pub use queue_display::QueueDisplay;
pub use time_provider::TimeProvider;
pub use transfer::{TransferError, TransferMechanism};
