//! Single-slot minimum-interval limiter for generation requests.
//!
//! Every request waits until at least `interval` has passed since the
//! previous one. The last-call instant sits behind an async mutex that is
//! held for the whole wait, so concurrent callers are served one at a time
//! in lock order.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct MinIntervalLimiter {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl MinIntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Sleep out the remainder of the interval, then record this call.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
