use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Opens after `threshold` consecutive rate-limit events against a host,
/// refusing new requests until `recovery` has elapsed, then allows a single
/// probe request through; a successful probe closes the circuit, a failed
/// one reopens it and restarts the recovery clock.
pub struct CircuitBreaker {
    consecutive_rate_limits: AtomicU32,
    opened_at_unix_millis: AtomicU64,
    threshold: u32,
    recovery: Duration,
}

pub enum Admission {
    Allowed,
    Probe,
    Blocked { remaining: Duration },
}

impl CircuitBreaker {
    pub fn new(threshold: u32, recovery: Duration) -> Self {
        Self {
            consecutive_rate_limits: AtomicU32::new(0),
            opened_at_unix_millis: AtomicU64::new(0),
            threshold,
            recovery,
        }
    }

    pub fn admit(&self) -> Admission {
        let opened_at = self.opened_at_unix_millis.load(Ordering::Relaxed);
        if opened_at == 0 {
            return Admission::Allowed;
        }
        let elapsed = now_millis().saturating_sub(opened_at);
        let recovery_millis = self.recovery.as_millis() as u64;
        if elapsed < recovery_millis {
            return Admission::Blocked {
                remaining: Duration::from_millis(recovery_millis - elapsed),
            };
        }
        Admission::Probe
    }

    pub fn record_rate_limited(&self) {
        let count = self.consecutive_rate_limits.fetch_add(1, Ordering::Relaxed) + 1;
        if count >= self.threshold {
            self.open();
        }
    }

    pub fn record_success(&self) {
        self.consecutive_rate_limits.store(0, Ordering::Relaxed);
        self.opened_at_unix_millis.store(0, Ordering::Relaxed);
    }

    /// A failed probe reopens the circuit and restarts the recovery clock.
    pub fn record_probe_failure(&self) {
        self.open();
    }

    fn open(&self) {
        self.opened_at_unix_millis.store(now_millis(), Ordering::Relaxed);
    }

    pub fn is_open(&self) -> bool {
        matches!(self.admit(), Admission::Blocked { .. })
    }
}

fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_closed_below_threshold() {
        let breaker = CircuitBreaker::new(5, Duration::from_secs(30));
        for _ in 0..4 {
            breaker.record_rate_limited();
        }
        assert!(matches!(breaker.admit(), Admission::Allowed));
    }

    #[test]
    fn opens_at_threshold_and_blocks() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        for _ in 0..3 {
            breaker.record_rate_limited();
        }
        assert!(matches!(breaker.admit(), Admission::Blocked { .. }));
    }

    #[test]
    fn success_resets_consecutive_count() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        breaker.record_rate_limited();
        breaker.record_rate_limited();
        breaker.record_success();
        breaker.record_rate_limited();
        assert!(matches!(breaker.admit(), Admission::Allowed));
    }

    #[test]
    fn probe_failure_reopens_circuit() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(0));
        breaker.record_rate_limited();
        assert!(matches!(breaker.admit(), Admission::Probe));
        breaker.record_probe_failure();
        assert!(!matches!(breaker.admit(), Admission::Allowed));
    }
}
