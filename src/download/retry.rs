//! Retry policies with backoff
//!
//! Three retry tiers share the [`RetryPolicy`] value type:
//! - Network requests: exponential backoff, `2^k * base` before attempt k
//! - Per-chapter attempts: exponential backoff, `2^attempt * base` after a failure
//! - Auto-retry passes: linear backoff, `base * pass`
//!
//! Exponential policies add uniform random jitter in `[0, jitter]`.

use crate::config::DownloadConfig;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Largest exponent used for exponential backoff, keeps delays finite
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// How the delay grows between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * 2^step`
    Exponential,
    /// `base * step`
    Linear,
}

/// Retry count plus the delay schedule between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Upper bound of the random delay added to each wait
    pub jitter: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Exponential policy without jitter
    pub fn exponential(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            jitter: Duration::ZERO,
            backoff: Backoff::Exponential,
        }
    }

    /// Linear policy without jitter
    pub fn linear(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            jitter: Duration::ZERO,
            backoff: Backoff::Linear,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Per-chapter policy: `max-retries` attempts with exponential backoff
    pub fn chapter(config: &DownloadConfig) -> Self {
        Self::exponential(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay),
        )
        .with_jitter(Duration::from_millis(config.retry_jitter))
    }

    /// Auto-retry policy: `batch-retry-passes` passes with linear delays
    pub fn batch(config: &DownloadConfig) -> Self {
        Self::linear(
            config.batch_retry_passes,
            Duration::from_millis(config.batch_retry_delay),
        )
    }

    /// Deterministic part of the delay for `step`
    pub fn base_delay_for(&self, step: u32) -> Duration {
        match self.backoff {
            Backoff::Exponential => {
                let factor = 1u32 << step.min(MAX_BACKOFF_EXPONENT);
                self.base_delay.saturating_mul(factor)
            }
            Backoff::Linear => self.base_delay.saturating_mul(step),
        }
    }

    /// Delay for `step` including random jitter
    pub fn delay_for(&self, step: u32) -> Duration {
        let base = self.base_delay_for(step);
        if self.jitter.is_zero() {
            return base;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        base + Duration::from_millis(jitter_ms)
    }

    /// Total attempts this policy allows for one operation
    pub fn max_attempts(&self) -> u64 {
        1 + self.max_retries as u64
    }
}

/// Worst-case fetch attempts for one chapter when an inner per-chapter
/// policy runs inside every pass of an outer auto-retry policy
///
/// # Examples
///
/// ```
/// use chapter_ripple::download::{worst_case_attempts, RetryPolicy};
/// use std::time::Duration;
///
/// let inner = RetryPolicy::exponential(2, Duration::from_millis(1000));
/// let outer = RetryPolicy::linear(2, Duration::from_millis(3000));
/// assert_eq!(worst_case_attempts(&inner, &outer), 9);
/// ```
pub fn worst_case_attempts(inner: &RetryPolicy, outer: &RetryPolicy) -> u64 {
    inner.max_attempts() * outer.max_attempts()
}

/// Sleeps for `delay` unless the token fires first
///
/// Returns false when cancelled.
pub(crate) async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
