// QueueGate Infrastructure - Session Adapter
// Implements: IdentityResolver, PresentationSink, QueueDisplay, TransferMechanism

mod proxy_transfer;
mod session_registry;

pub use proxy_transfer::ProxyTransfer;
pub use session_registry::{
    Outbound, SessionConfig, SessionError, SessionRegistry, DEFAULT_INBOX_CAPACITY,
};
