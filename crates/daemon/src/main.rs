//! QueueGate - Main Entry Point
//! JSON-RPC server + in-process session registry + queue coordinator

mod config;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use queuegate_api_rpc::{RpcHandler, RpcServer, ToggleThrottle};
use queuegate_core::application::QueueService;
use queuegate_core::port::time_provider::SystemTimeProvider;
use queuegate_infra_session::{ProxyTransfer, SessionRegistry};

use crate::config::DaemonConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format =
        std::env::var("QUEUEGATE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("queuegate=info"))?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("QueueGate v{} starting...", VERSION);

    // 2. Load configuration
    let config = DaemonConfig::from_env()?;
    info!(
        rpc_port = config.rpc.port,
        notify_interval_secs = config.queue.notify_interval.as_secs(),
        stale_head_policy = ?config.queue.stale_head_policy,
        inbox_capacity = config.session.inbox_capacity,
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let sessions = Arc::new(SessionRegistry::new(config.session));
    let transfer = Arc::new(ProxyTransfer::new(sessions.clone()));

    let service = Arc::new(QueueService::new(
        sessions.clone(),
        sessions.clone(),
        sessions.clone(),
        transfer,
        config.queue,
    ));

    // 4. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let throttle = ToggleThrottle::new(config.throttle, time_provider);
    let handler = RpcHandler::new(service.clone(), sessions, throttle);
    let rpc_handle = RpcServer::new(config.rpc, handler)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!("System ready. Waiting for members...");
    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Graceful shutdown: stop accepting toggles, then stop notifiers
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    service.shutdown().await;

    info!("Shutdown complete.");

    Ok(())
}
