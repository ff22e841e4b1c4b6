//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for the QueueGate queue coordinator.
//! Methods are versioned (`queue.join.v1`, `session.poll.v1`, ...).

pub mod error;
pub mod handler;
pub mod server;
pub mod throttle;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
pub use throttle::{ThrottleConfig, ToggleThrottle};
