use std::time::Duration;

/// Exponential reconnect backoff: attempt `n` (1-indexed) waits `base * 2^(n-1)`.
///
/// There is no jitter and no delay cap; growth is bounded by `max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max_attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts }
    }

    /// Delay before the given attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    /// Whether another attempt may follow `attempts_made` earlier ones
    pub fn allows(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(crate::types::DEFAULT_RECONNECT_BASE_DELAY),
            crate::types::DEFAULT_MAX_RECONNECT_ATTEMPTS,
        )
    }
}
