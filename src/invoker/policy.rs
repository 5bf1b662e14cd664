use std::time::Duration;

/// Exponential backoff with additive random jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub jitter: Duration,
}

impl Backoff {
    pub const fn none() -> Self {
        Self {
            initial: Duration::ZERO,
            max: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based): `min(initial * 2^(retry-1), max) + jitter`.
    pub fn delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let base = self
            .initial
            .saturating_mul(1u32 << exponent)
            .min(self.max);

        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::random::<u64>() % jitter_ms)
    }
}

/// Bounds of a single retrying invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Resolution + call cycles allowed before giving up. Zero behaves as one.
    pub max_attempts: u32,
    /// Deadline for one call attempt; expiry is a routing failure.
    pub attempt_timeout: Duration,
    /// Schedule after routing failures.
    pub routing_backoff: Backoff,
    /// Schedule after discovery failures.
    pub resolution_backoff: Backoff,
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            attempt_timeout: Duration::from_secs(2),
            routing_backoff: Backoff {
                initial: Duration::from_millis(150),
                max: Duration::from_millis(1200),
                jitter: Duration::from_millis(50),
            },
            resolution_backoff: Backoff {
                initial: Duration::from_millis(500),
                max: Duration::from_secs(5),
                jitter: Duration::from_millis(50),
            },
        }
    }
}
