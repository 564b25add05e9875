use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Adaptive delay applied before each outbound request to a given host.
///
/// The delay grows multiplicatively whenever the server signals it's
/// unhappy (HTTP 429) and decays multiplicatively on sustained success,
/// mirroring the backoff/decay shape the upstream system uses for its own
/// rate-limited endpoints. State lives behind an `Arc` on [`crate::Client`]
/// rather than as a global — callers may run several clients against
/// different hosts without cross-talk.
pub struct RateLimiter {
    delay_millis: AtomicU64,
    consecutive_successes: AtomicU64,
    min_delay: Duration,
    max_delay: Duration,
    growth_factor: f64,
    decay_after_successes: u64,
    decay_factor: f64,
}

impl RateLimiter {
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            delay_millis: AtomicU64::new(min_delay.as_millis() as u64),
            consecutive_successes: AtomicU64::new(0),
            min_delay,
            max_delay,
            growth_factor: 2.0,
            decay_after_successes: 10,
            decay_factor: 0.8,
        }
    }

    /// The delay to sleep before issuing the next request.
    pub fn current_delay(&self) -> Duration {
        Duration::from_millis(self.delay_millis.load(Ordering::Relaxed))
    }

    pub fn record_rate_limited(&self) {
        self.consecutive_successes.store(0, Ordering::Relaxed);
        let current = self.delay_millis.load(Ordering::Relaxed);
        let grown = ((current.max(1) as f64) * self.growth_factor) as u64;
        let clamped = grown.clamp(self.min_delay.as_millis() as u64, self.max_delay.as_millis() as u64);
        self.delay_millis.store(clamped, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes < self.decay_after_successes {
            return;
        }
        self.consecutive_successes.store(0, Ordering::Relaxed);
        let current = self.delay_millis.load(Ordering::Relaxed);
        let decayed = ((current as f64) * self.decay_factor) as u64;
        let clamped = decayed.max(self.min_delay.as_millis() as u64);
        self.delay_millis.store(clamped, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_on_rate_limit_and_is_clamped() {
        let limiter = RateLimiter::new(Duration::from_millis(100), Duration::from_millis(500));
        for _ in 0..10 {
            limiter.record_rate_limited();
        }
        assert_eq!(limiter.current_delay(), Duration::from_millis(500));
    }

    #[test]
    fn delay_decays_only_after_sustained_success() {
        let limiter = RateLimiter::new(Duration::from_millis(100), Duration::from_millis(10_000));
        limiter.record_rate_limited();
        let grown = limiter.current_delay();
        for _ in 0..9 {
            limiter.record_success();
        }
        assert_eq!(limiter.current_delay(), grown, "should not decay before threshold");
        limiter.record_success();
        assert!(limiter.current_delay() < grown, "should decay once threshold reached");
    }

    #[test]
    fn delay_never_drops_below_minimum() {
        let limiter = RateLimiter::new(Duration::from_millis(50), Duration::from_millis(1000));
        for _ in 0..100 {
            for _ in 0..10 {
                limiter.record_success();
            }
        }
        assert!(limiter.current_delay() >= Duration::from_millis(50));
    }
}
