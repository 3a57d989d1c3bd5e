//! Pacing between platform actions
//!
//! Discord applies its own rate limits; the throttle keeps a sweep well
//! inside them and spreads the load of a large queue instead of bursting.

use tokio::time::{Duration, Instant, sleep};

/// Default pause between consecutive actions, in milliseconds
pub const DEFAULT_ACTION_DELAY_MS: u64 = 1200;

/// How the execution runner paces itself between consecutive targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottlePolicy {
    /// Sleep a fixed interval after every attempt
    FixedDelay(Duration),
    /// Allow `burst` attempts back to back, then wait `refill` before the
    /// next burst
    TokenBucket { burst: u32, refill: Duration },
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self::FixedDelay(Duration::from_millis(DEFAULT_ACTION_DELAY_MS))
    }
}

impl ThrottlePolicy {
    /// Start pacing state for one run
    #[must_use]
    pub fn throttle(self) -> Throttle {
        Throttle::new(self)
    }
}

/// Pacing state for a single execution run
#[derive(Debug)]
pub struct Throttle {
    policy: ThrottlePolicy,
    tokens: u32,
    window_start: Instant,
}

impl Throttle {
    fn new(policy: ThrottlePolicy) -> Self {
        let tokens = match policy {
            ThrottlePolicy::FixedDelay(_) => 0,
            ThrottlePolicy::TokenBucket { burst, .. } => burst.max(1),
        };
        Self {
            policy,
            tokens,
            window_start: Instant::now(),
        }
    }

    /// Pause according to the policy; called once after every attempt
    pub async fn pause(&mut self) {
        match self.policy {
            ThrottlePolicy::FixedDelay(delay) => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
            ThrottlePolicy::TokenBucket { burst, refill } => {
                if self.window_start.elapsed() >= refill {
                    self.tokens = burst.max(1);
                    self.window_start = Instant::now();
                }
                if self.tokens == 0 {
                    let wait = refill.saturating_sub(self.window_start.elapsed());
                    sleep(wait).await;
                    self.tokens = burst.max(1);
                    self.window_start = Instant::now();
                }
                self.tokens -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_pauses_between_attempts() {
        let mut throttle = ThrottlePolicy::FixedDelay(Duration::from_millis(1200)).throttle();

        let start = Instant::now();
        throttle.pause().await;
        throttle.pause().await;
        assert_eq!(start.elapsed(), Duration::from_millis(2400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_never_sleeps() {
        let mut throttle = ThrottlePolicy::FixedDelay(Duration::ZERO).throttle();

        let start = Instant::now();
        for _ in 0..100 {
            throttle.pause().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_allows_burst_then_waits() {
        let mut throttle = ThrottlePolicy::TokenBucket {
            burst: 3,
            refill: Duration::from_secs(5),
        }
        .throttle();

        // The first burst passes without sleeping
        let start = Instant::now();
        throttle.pause().await;
        throttle.pause().await;
        throttle.pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        // The fourth attempt waits out the refill window
        throttle.pause().await;
        assert_eq!(start.elapsed(), Duration::from_secs(5));

        // A fresh burst is available afterwards
        let resumed = Instant::now();
        throttle.pause().await;
        throttle.pause().await;
        assert_eq!(resumed.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_uses_platform_safe_delay() {
        let ThrottlePolicy::FixedDelay(delay) = ThrottlePolicy::default() else {
            panic!("default policy should be a fixed delay");
        };
        assert_eq!(delay, Duration::from_millis(DEFAULT_ACTION_DELAY_MS));
    }
}
