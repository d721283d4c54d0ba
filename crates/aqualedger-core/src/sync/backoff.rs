//! Retry scheduling for failed sync operations

use std::time::Duration;

/// Deterministic capped exponential backoff.
///
/// The first failure waits `initial`, each further failure doubles the wait,
/// and no wait exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(5),
            max: Duration::from_secs(15 * 60),
        }
    }
}

impl BackoffPolicy {
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    /// Wait before the next attempt after `attempts` consecutive failures
    #[must_use]
    pub fn delay(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(31);
        self.initial
            .checked_mul(1_u32 << exponent)
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Unix ms at which an operation with `attempts` failures may run again
    #[must_use]
    pub fn next_attempt_at(&self, now_ms: i64, attempts: u32) -> i64 {
        let delay = i64::try_from(self.delay(attempts).as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_add(delay)
    }
}
