//! Toggle Throttle (per-member token bucket)
//!
//! Limits how fast one member can join/leave queues. Each toggle broadcasts
//! to the whole queue, so spam from one client is throttled per member rather
//! than globally. Tokens are tracked in thousandths to keep refill exact.

use queuegate_core::domain::MemberId;
use queuegate_core::port::TimeProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Default burst of toggles allowed back-to-back
pub const DEFAULT_TOGGLE_BURST: u32 = 5;

/// Default toggles regained per second
pub const DEFAULT_TOGGLE_RATE: u32 = 1;

const MILLI: u64 = 1000;

#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Maximum burst size
    pub burst: u32,
    /// Tokens added per second
    pub refill_per_sec: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            burst: DEFAULT_TOGGLE_BURST,
            refill_per_sec: DEFAULT_TOGGLE_RATE,
        }
    }
}

struct Bucket {
    milli_tokens: u64,
    last_refill_ms: i64,
}

pub struct ToggleThrottle {
    config: ThrottleConfig,
    clock: Arc<dyn TimeProvider>,
    buckets: Mutex<HashMap<MemberId, Bucket>>,
}

impl ToggleThrottle {
    pub fn new(config: ThrottleConfig, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            config,
            clock,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Consume one token for `member_id`; false if the member is throttled
    pub fn check(&self, member_id: &MemberId) -> bool {
        let now = self.clock.now_millis();
        let capacity = u64::from(self.config.burst) * MILLI;

        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets.entry(*member_id).or_insert(Bucket {
            milli_tokens: capacity,
            last_refill_ms: now,
        });

        // Clock going backwards refills nothing
        let elapsed_ms = u64::try_from(now - bucket.last_refill_ms).unwrap_or(0);
        let refill = elapsed_ms * u64::from(self.config.refill_per_sec);
        bucket.milli_tokens = (bucket.milli_tokens + refill).min(capacity);
        bucket.last_refill_ms = now;

        if bucket.milli_tokens >= MILLI {
            bucket.milli_tokens -= MILLI;
            true
        } else {
            false
        }
    }

    /// Drop a member's bucket (on disconnect)
    pub fn forget(&self, member_id: &MemberId) {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(member_id);
    }
}
