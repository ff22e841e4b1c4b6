//! Daemon configuration from `QUEUEGATE_*` environment variables
//!
//! Unset variables fall back to library defaults. Malformed values are an
//! error rather than silently ignored.

use anyhow::{anyhow, Result};
use queuegate_api_rpc::{RpcServerConfig, ThrottleConfig};
use queuegate_core::application::{QueueServiceConfig, StaleHeadPolicy};
use queuegate_infra_session::SessionConfig;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_RPC_PORT: &str = "QUEUEGATE_RPC_PORT";
pub const ENV_NOTIFY_INTERVAL_SECS: &str = "QUEUEGATE_NOTIFY_INTERVAL_SECS";
pub const ENV_STALE_HEAD_POLICY: &str = "QUEUEGATE_STALE_HEAD_POLICY";
pub const ENV_INBOX_CAPACITY: &str = "QUEUEGATE_INBOX_CAPACITY";
pub const ENV_TOGGLE_BURST: &str = "QUEUEGATE_TOGGLE_BURST";
pub const ENV_TOGGLE_RATE: &str = "QUEUEGATE_TOGGLE_RATE";

#[derive(Debug, Clone, Default)]
pub struct DaemonConfig {
    pub rpc: RpcServerConfig,
    pub queue: QueueServiceConfig,
    pub session: SessionConfig,
    pub throttle: ThrottleConfig,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, ENV_RPC_PORT)? {
            config.rpc.port = port;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_NOTIFY_INTERVAL_SECS)? {
            if secs == 0 {
                return Err(anyhow!("{} must be greater than zero", ENV_NOTIFY_INTERVAL_SECS));
            }
            config.queue.notify_interval = Duration::from_secs(secs);
        }
        if let Some(policy) = lookup(ENV_STALE_HEAD_POLICY) {
            config.queue.stale_head_policy = policy
                .parse::<StaleHeadPolicy>()
                .map_err(|e| anyhow!("{}: {}", ENV_STALE_HEAD_POLICY, e))?;
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, ENV_INBOX_CAPACITY)? {
            if capacity == 0 {
                return Err(anyhow!("{} must be greater than zero", ENV_INBOX_CAPACITY));
            }
            config.session.inbox_capacity = capacity;
        }
        if let Some(burst) = parse_var(&lookup, ENV_TOGGLE_BURST)? {
            config.throttle.burst = burst;
        }
        if let Some(rate) = parse_var(&lookup, ENV_TOGGLE_RATE)? {
            config.throttle.refill_per_sec = rate;
        }

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow!("invalid {}='{}': {}", key, raw, e))
        })
        .transpose()
}
