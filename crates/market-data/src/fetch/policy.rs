use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default wait before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(2_000);

/// Default wait after the store itself signals throttling.
pub const DEFAULT_STALE_COOLDOWN: Duration = Duration::from_millis(15_000);

/// Retry parameters shared by every component that talks to a rate-limited
/// collaborator.
///
/// The fetch client uses `max_retries` and `initial_backoff`. Store-level
/// throttling (gap detection, monthly upserts) waits `stale_cooldown` once
/// before a single retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub stale_cooldown: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, stale_cooldown: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            stale_cooldown,
        }
    }

    /// Backoff for a zero-based retry attempt: `initial_backoff * 2^attempt`.
    ///
    /// Growth is uncapped; the retry count is the only bound. Saturates at
    /// `Duration::MAX` instead of overflowing.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.initial_backoff.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// Total number of attempts the fetch client may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            DEFAULT_INITIAL_BACKOFF,
            DEFAULT_STALE_COOLDOWN,
        )
    }
}
