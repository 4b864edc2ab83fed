use std::time::Duration;

use crate::error::ErrorKind;

/// Total attempts per call, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Delay before the second attempt.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;
/// Backoff growth factor between consecutive retries.
pub const DEFAULT_BACKOFF_MULTIPLIER: u64 = 2;

/// Only failures where a retry can plausibly change the outcome qualify.
/// Auth, validation, and lookup misses are deterministic; retrying them
/// burns attempts against the same answer.
#[must_use]
pub fn is_retryable(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Network | ErrorKind::Timeout)
}

/// Bounded exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves as one.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay_ms: u64, multiplier: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            multiplier,
        }
    }

    /// Delay inserted before the given 1-based attempt: zero for the first,
    /// then `initial * multiplier^(attempt - 2)`.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }

        let exponent = (attempt - 2).min(30);
        Duration::from_millis(
            self.initial_delay_ms
                .saturating_mul(self.multiplier.saturating_pow(exponent)),
        )
    }

    /// Whether a failure of `kind` on the given attempt warrants another try.
    #[must_use]
    pub fn should_retry(&self, kind: ErrorKind, attempt: u32) -> bool {
        attempt < self.max_attempts && is_retryable(kind)
    }
}
