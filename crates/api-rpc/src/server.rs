//! JSON-RPC Server
//!
//! Serves the queue and session methods over HTTP/WebSocket on localhost.

use crate::handler::RpcHandler;
use crate::types::{ConnectRequest, JoinRequest, LeaveRequest, QueueRequest, SessionRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9530;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Binds to `host:port` (localhost by default) and returns the handle used
    /// to stop it.
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let mut module = RpcModule::new(());

        // Session methods
        let handler = self.handler.clone();
        module
            .register_async_method("session.connect.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ConnectRequest = params.parse()?;
                    handler.connect(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("session.disconnect.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SessionRequest = params.parse()?;
                    handler.disconnect(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("session.poll.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SessionRequest = params.parse()?;
                    handler.poll(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Queue methods
        let handler = self.handler.clone();
        module
            .register_async_method("queue.join.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JoinRequest = params.parse()?;
                    handler.join(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.leave.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LeaveRequest = params.parse()?;
                    handler.leave(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.pause.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: QueueRequest = params.parse()?;
                    handler.pause(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.resume.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: QueueRequest = params.parse()?;
                    handler.resume(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.describe.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: QueueRequest = params.parse()?;
                    handler.describe(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.list.v1", move |_, _, _| {
                let handler = handler.clone();
                async move {
                    handler.list().await
                }
            })
            .map_err(|e| e.to_string())?;

        info!("JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(handle)
    }
}
