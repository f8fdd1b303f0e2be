//! Generic retry strategy with bounded attempts and exponential backoff
//!
//! The executor is deliberately small: it runs an operation, asks a
//! [`RetryPolicy`] whether a failure may be retried, sleeps according to the
//! configured [`BackoffStrategy`] and gives up after `max_attempts`. The last
//! error is always handed back to the caller so that nothing is lost.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("All retry attempts exhausted after {attempts} tries")]
    AttemptsExhausted {
        /// Attempts made, including the first one
        attempts: u32,
        /// Error returned by the final attempt
        last: E,
    },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error")]
    NonRetryable {
        /// Error that stopped the retry loop
        source: E,
    },
}

impl<E> RetryError<E> {
    /// The underlying operation error, whichever way the loop ended.
    pub fn into_source(self) -> E {
        match self {
            Self::AttemptsExhausted { last, .. } => last,
            Self::NonRetryable { source } => source,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a custom
    /// delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: `min(initial_delay * base^attempt, max_delay)`
    Exponential {
        /// Delay before the first retry
        initial_delay: Duration,
        /// Growth factor per retry
        base: f64,
        /// Upper bound for any single delay
        max_delay: Duration,
    },
}

impl BackoffStrategy {
    /// Exponential doubling from `initial_delay`, capped at `max_delay`.
    pub const fn doubling(initial_delay: Duration, max_delay: Duration) -> Self {
        Self::Exponential { initial_delay, base: 2.0, max_delay }
    }

    /// Calculate the delay before retry number `attempt` (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay = initial_delay.as_secs_f64() * base.powi(exponent);
                if !delay.is_finite() || delay >= max_delay.as_secs_f64() {
                    *max_delay
                } else {
                    Duration::from_secs_f64(delay.max(0.0))
                }
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::doubling(Duration::from_secs(1), Duration::from_secs(30)),
        }
    }
}

impl RetryConfig {
    /// Configuration allowing `retries` additional attempts after the first.
    pub fn with_retries(retries: u32, backoff: BackoffStrategy) -> Self {
        Self { max_attempts: retries.saturating_add(1), backoff }
    }

    /// Configuration that runs the operation exactly once.
    pub fn once() -> Self {
        Self { max_attempts: 1, backoff: BackoffStrategy::Fixed(Duration::ZERO) }
    }
}

/// Run `operation`, retrying failures the policy accepts.
///
/// The operation is attempted at most `config.max_attempts` times (at least
/// once). Delays are slept with `tokio::time::sleep`, so they are suspension
/// points for the calling task.
///
/// # Errors
///
/// Returns [`RetryError::NonRetryable`] when the policy stops the loop and
/// [`RetryError::AttemptsExhausted`] when every attempt failed; both carry the
/// last operation error.
pub async fn retry_with_policy<F, Fut, T, E, P>(
    config: &RetryConfig,
    policy: &P,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E> + ?Sized,
    E: fmt::Debug,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        debug!(attempt = attempt + 1, max_attempts, "executing operation");

        let error = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(retries = attempt, "operation succeeded after retries");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        let delay = match policy.should_retry(&error, attempt) {
            RetryDecision::Stop => {
                debug!(?error, "retry policy determined not to retry");
                return Err(RetryError::NonRetryable { source: error });
            }
            RetryDecision::Retry => config.backoff.calculate_delay(attempt),
            RetryDecision::RetryAfter(delay) => delay,
        };

        if attempt + 1 >= max_attempts {
            warn!(attempts = attempt + 1, ?error, "all retry attempts exhausted");
            return Err(RetryError::AttemptsExhausted { attempts: attempt + 1, last: error });
        }

        warn!(attempt = attempt + 1, ?delay, "operation failed, retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};
    use crate::error::ErrorClassification;

    /// Never retry policy - never retries
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Retries exactly the errors that classify themselves as retryable,
    /// honouring any `retry_after` hint.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ClassifiedRetry;

    impl<E: ErrorClassification> RetryPolicy<E> for ClassifiedRetry {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if !error.is_retryable() {
                return RetryDecision::Stop;
            }
            error.retry_after().map_or(RetryDecision::Retry, RetryDecision::RetryAfter)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::policies::*;
    use super::*;
    use crate::error::ClassifiedError;

    fn fast_config(retries: u32) -> RetryConfig {
        RetryConfig::with_retries(retries, BackoffStrategy::Fixed(Duration::from_millis(1)))
    }

    #[test]
    fn test_backoff_strategy_exponential_is_capped() {
        let backoff = BackoffStrategy::doubling(Duration::from_secs(1), Duration::from_secs(30));
        assert_eq!(backoff.calculate_delay(0), Duration::from_secs(1));
        assert_eq!(backoff.calculate_delay(1), Duration::from_secs(2));
        assert_eq!(backoff.calculate_delay(4), Duration::from_secs(16));
        assert_eq!(backoff.calculate_delay(5), Duration::from_secs(30));
        assert_eq!(backoff.calculate_delay(64), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_config_counts_first_attempt() {
        assert_eq!(RetryConfig::with_retries(2, BackoffStrategy::Fixed(Duration::ZERO)).max_attempts, 3);
        assert_eq!(RetryConfig::once().max_attempts, 1);
    }

    #[tokio::test]
    async fn test_retryable_errors_exhaust_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: RetryResult<(), ClassifiedError> =
            retry_with_policy(&fast_config(2), &ClassifiedRetry, || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ClassifiedError::new(503, "HTTP_503", None::<String>))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(RetryError::AttemptsExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last.status_code(), 503);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: RetryResult<(), ClassifiedError> =
            retry_with_policy(&fast_config(2), &ClassifiedRetry, || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ClassifiedError::new(404, "HTTP_404", None::<String>))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().into_source().status_code(), 404);
    }

    #[tokio::test]
    async fn test_success_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: RetryResult<&str, ClassifiedError> =
            retry_with_policy(&fast_config(2), &ClassifiedRetry, || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(ClassifiedError::new(0, "NETWORK_ERROR", None::<String>))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_never_retry_policy() {
        let result: RetryResult<(), &str> =
            retry_with_policy(&fast_config(5), &NeverRetry, || async { Err("nope") }).await;
        assert_eq!(result, Err(RetryError::NonRetryable { source: "nope" }));
    }
}
