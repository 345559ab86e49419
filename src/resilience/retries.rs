//! Retry logic.
//!
//! # Responsibilities
//! - Run a fallible async operation up to a fixed number of attempts
//! - Sleep a fixed backoff between attempts
//! - Stop early when the next sleep would cross the check deadline
//!
//! # Design Decisions
//! - Attempt counter starts at 1 and never exceeds `max_attempts`
//! - No jitter: one poller hits one node, there is no herd to spread
//! - Every attempt outcome is logged with its attempt number

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::observability::metrics;

/// Bounded fixed-backoff retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Sleep between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// A policy that tries exactly once.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Successful result of [`retry`].
#[derive(Debug)]
pub struct Attempted<T> {
    pub value: T,
    /// Attempt number that succeeded (1-based).
    pub attempts: u32,
}

/// Error returned when every permitted attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Number of attempts actually made.
    pub attempts: u32,
    /// True if the loop stopped because of the deadline.
    pub deadline_reached: bool,
    pub last_error: E,
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// `op` receives the 1-based attempt number. `stage` labels log lines and
/// metrics.
pub async fn retry<T, E, F, Fut>(
    stage: &'static str,
    policy: &RetryPolicy,
    deadline: Option<Instant>,
    mut op: F,
) -> Result<Attempted<T>, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        tracing::debug!(stage, attempt, max_attempts, "Attempt starting");

        let error = match op(attempt).await {
            Ok(value) => {
                tracing::info!(stage, attempt, "Attempt succeeded");
                return Ok(Attempted {
                    value,
                    attempts: attempt,
                });
            }
            Err(e) => e,
        };

        tracing::warn!(stage, attempt, max_attempts, error = %error, "Attempt failed");

        if attempt >= max_attempts {
            tracing::error!(stage, attempts = attempt, "Retry limit reached");
            return Err(Exhausted {
                attempts: attempt,
                deadline_reached: false,
                last_error: error,
            });
        }

        if let Some(deadline) = deadline {
            if Instant::now() + policy.backoff >= deadline {
                tracing::error!(stage, attempts = attempt, "Check deadline reached, giving up");
                return Err(Exhausted {
                    attempts: attempt,
                    deadline_reached: true,
                    last_error: error,
                });
            }
        }

        tracing::info!(stage, attempt, delay = ?policy.backoff, "Retrying after backoff");
        metrics::record_retry(stage);
        tokio::time::sleep(policy.backoff).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_secs(1));

        let result = retry("test", &policy, None, |attempt| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(n, attempt);
            async move {
                if attempt < 3 {
                    Err("refused")
                } else {
                    Ok("up")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.value, "up");
        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_permitted_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_millis(500));
        let result = retry("test", &policy, None, |attempt| async move {
            if attempt < 4 {
                Err("down")
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(result.attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(10, Duration::from_secs(5));
        let started = Instant::now();

        let err = retry("test", &policy, None, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("refused") }
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 10);
        assert!(!err.deadline_reached);
        assert_eq!(err.last_error, "refused");
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        // Nine sleeps between ten attempts, none after the last.
        assert_eq!(started.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_does_not_sleep() {
        let started = Instant::now();
        let err = retry("test", &RetryPolicy::once(), None, |_| async {
            Err::<(), _>("nope")
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_retrying() {
        let policy = RetryPolicy::new(10, Duration::from_secs(5));
        let deadline = Instant::now() + Duration::from_secs(12);

        let err = retry("test", &policy, Some(deadline), |_| async {
            Err::<(), _>("refused")
        })
        .await
        .unwrap_err();

        // Attempts at t=0, t=5 and t=10; another sleep would end at t=15.
        assert_eq!(err.attempts, 3);
        assert!(err.deadline_reached);
    }
}
