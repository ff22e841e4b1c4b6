// Queue constants (No magic values)
use std::time::Duration;

/// Interval between position reports for a waiting member (30s)
pub const DEFAULT_NOTIFY_INTERVAL: Duration = Duration::from_secs(30);

/// Upper bound on how long `QueueService::shutdown` waits for notifier tasks (5s)
pub const NOTIFIER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Shortest accepted position report interval; shorter configs are raised to it
pub const MIN_NOTIFY_INTERVAL: Duration = Duration::from_millis(100);
