//! Resilience patterns for transient failures
//!
//! - **Retry**: bounded attempts with exponential backoff, driven by a
//!   [`RetryPolicy`] that decides per error whether another attempt is useful
//! - **Clock**: monotonic time abstraction so freshness windows can be tested
//!   with [`MockClock`] instead of sleeping
//!
//! Both are generic over the error type. [`policies::ClassifiedRetry`] bridges
//! them to [`crate::error::ErrorClassification`].

pub mod clock;
pub mod retry;

pub use clock::{Clock, MockClock, SystemClock};
pub use retry::{
    policies, retry_with_policy, BackoffStrategy, RetryConfig, RetryDecision, RetryError,
    RetryPolicy, RetryResult,
};
