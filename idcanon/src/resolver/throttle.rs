//! Request spacing for rate-limited APIs

use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Admits one request per `min_interval`, shared by every caller
pub struct RequestThrottle {
    limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    min_interval: Duration,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        // Zero interval falls back to one request per second
        let quota = Quota::with_period(min_interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
            min_interval,
        }
    }

    /// Wait until the next request may start
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("min_interval", &self.min_interval)
            .finish()
    }
}
