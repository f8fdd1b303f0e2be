//! Modular common utilities shared across Entigate crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification (`ClassifiedError`, predicates, user
//!   messages)
//! - `runtime`: async infrastructure (clock abstraction, backoff, retry)
//! - `observability`: optional tracing (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{
    classify, ClassifiedError, ErrorClassification, ErrorSeverity, FailureKind, RawFailure,
    ResponseBody,
};
#[cfg(feature = "runtime")]
pub use resilience::{
    retry_with_policy, BackoffStrategy, Clock, MockClock, RetryConfig, RetryDecision, RetryError,
    RetryPolicy, RetryResult, SystemClock,
};
