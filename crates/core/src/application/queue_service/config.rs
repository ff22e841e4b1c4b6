// Queue Service Configuration

use crate::application::constants::DEFAULT_NOTIFY_INTERVAL;
use crate::application::transfer::StaleHeadPolicy;
use std::time::Duration;

/// Queue service configuration
#[derive(Debug, Clone)]
pub struct QueueServiceConfig {
    /// How often each waiting member receives its position
    pub notify_interval: Duration,

    /// Handling of an offline member at the head of an active queue
    pub stale_head_policy: StaleHeadPolicy,
}

impl Default for QueueServiceConfig {
    fn default() -> Self {
        Self {
            notify_interval: DEFAULT_NOTIFY_INTERVAL,
            stale_head_policy: StaleHeadPolicy::Hold,
        }
    }
}
