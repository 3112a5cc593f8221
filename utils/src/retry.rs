//! Bounded retry with exponential backoff for unreliable network and chain calls.
//!
//! [`retry`] wraps an async operation. Call sites that must hand mutable state
//! to every attempt drive a [`Backoff`] in their own loop instead; both share
//! the same policy and logging.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::time::secs_to_duration;

/// Classifies errors for the retry loop.
///
/// The default treats every error as transient.
pub trait Retryable {
    fn is_retryable(&self) -> bool {
        true
    }
}

/// Attempt budget and delay bounds for one call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay after the first failure, in seconds.
    pub min_delay_secs: f64,
    /// Upper bound for the doubled delay, in seconds.
    pub max_delay_secs: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay_secs: 1.0,
            max_delay_secs: 10.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            min_delay_secs: min_delay.as_secs_f64(),
            max_delay_secs: max_delay.as_secs_f64(),
        }
    }

    /// A policy that never retries.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the `failed`-th failed attempt (1-based).
    pub fn delay_after(&self, failed: u32) -> Duration {
        let min = secs_to_duration(self.min_delay_secs);
        let max = secs_to_duration(self.max_delay_secs.max(self.min_delay_secs));
        let factor = 1u32 << failed.saturating_sub(1).min(16);
        min.saturating_mul(factor).min(max)
    }
}

/// Tracks attempts against a [`RetryPolicy`].
pub struct Backoff<'a> {
    policy: &'a RetryPolicy,
    label: &'a str,
    failed: u32,
}

impl<'a> Backoff<'a> {
    pub fn new(policy: &'a RetryPolicy, label: &'a str) -> Self {
        Self {
            policy,
            label,
            failed: 0,
        }
    }

    /// Failed attempts recorded so far.
    pub fn failures(&self) -> u32 {
        self.failed
    }

    /// Record a failed attempt.
    ///
    /// Returns the delay before the next attempt, or `None` when the error is
    /// not retryable or the budget is spent.
    pub fn on_failure<E: Retryable + Display>(&mut self, err: &E) -> Option<Duration> {
        self.failed += 1;
        let max = self.policy.attempts();
        if !err.is_retryable() {
            tracing::warn!(op = self.label, attempt = self.failed, "{err} (not retried)");
            return None;
        }
        if self.failed >= max {
            tracing::warn!(op = self.label, attempt = self.failed, max, "{err} (giving up)");
            return None;
        }
        let delay = self.policy.delay_after(self.failed);
        tracing::warn!(
            op = self.label,
            attempt = self.failed,
            max,
            "{err}, retrying in {:.1}s",
            delay.as_secs_f64()
        );
        Some(delay)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt budget is exhausted. The last error is returned.
///
/// Dropping the returned future cancels the in-flight attempt and any pending
/// backoff sleep.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut backoff = Backoff::new(policy, label);
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => match backoff.on_failure(&err) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Err(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Flaky {
        fatal: bool,
    }

    impl Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "flaky (fatal: {})", self.fatal)
        }
    }

    impl Retryable for Flaky {
        fn is_retryable(&self) -> bool {
            !self.fatal
        }
    }

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(100), Duration::from_millis(300))
    }

    #[test]
    fn delay_doubles_and_caps() {
        let p = policy(5);
        assert_eq!(p.delay_after(1), Duration::from_millis(100));
        assert_eq!(p.delay_after(2), Duration::from_millis(200));
        assert_eq!(p.delay_after(3), Duration::from_millis(300));
        assert_eq!(p.delay_after(30), Duration::from_millis(300));
    }

    #[test]
    fn unrepresentable_delays_saturate() {
        let p = RetryPolicy {
            max_attempts: 3,
            min_delay_secs: f64::NAN,
            max_delay_secs: f64::INFINITY,
        };
        assert_eq!(p.delay_after(1), Duration::ZERO);
        let p = RetryPolicy {
            max_attempts: 3,
            min_delay_secs: 1e300,
            max_delay_secs: 1e300,
        };
        assert_eq!(p.delay_after(2), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<u32, Flaky> = retry(&policy(3), "test", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(Flaky { fatal: false })
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), Flaky> = retry(&policy(2), "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Flaky { fatal: false })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), Flaky> = retry(&policy(5), "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Flaky { fatal: true })
        })
        .await;
        assert!(result.unwrap_err().fatal);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let _: Result<(), Flaky> = retry(&policy(0), "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Flaky { fatal: false })
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn policy_reads_partial_toml() {
        let p: RetryPolicy = toml::from_str("max_attempts = 7").unwrap();
        assert_eq!(p.max_attempts, 7);
        assert_eq!(p.min_delay_secs, 1.0);
    }
}
