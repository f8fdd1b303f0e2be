//! Error classification infrastructure shared by every Entigate layer
//!
//! Any failure produced while talking to the remote entity API is normalized
//! into a single [`ClassifiedError`] value carrying a numeric status, a machine
//! error code and an optional human-readable detail. Downstream policy (query
//! retries, user notifications) never inspects transport-specific errors; it
//! only consults the classification predicates.
//!
//! # Error Handling Architecture
//!
//! 1. **[`RawFailure`]**: what the transport observed (no response at all, or
//!    a response with a status and a body).
//! 2. **[`classify`]**: the single conversion from a raw failure into a
//!    [`ClassifiedError`].
//! 3. **[`ErrorClassification`] trait**: a standard interface for classifying
//!    errors by their characteristics (retryability, severity, criticality).
//! 4. **[`ErrorSeverity`] enum**: a unified severity level used for log
//!    levels.
//!
//! # Example
//!
//! ```rust
//! use entigate_common::error::{classify, ErrorClassification, RawFailure};
//!
//! let error = classify(RawFailure::NoResponse { timed_out: true });
//! assert_eq!(error.status_code(), 0);
//! assert_eq!(error.error_code(), "TIMEOUT");
//! assert!(error.is_retryable());
//! ```

mod classified;
pub mod messages;

use std::fmt;
use std::time::Duration;

pub use classified::{classify, ClassifiedError, FailureKind, RawFailure, ResponseBody};

/// Standard interface for classifying errors
///
/// Implemented by [`ClassifiedError`]; generic retry helpers in
/// [`crate::resilience`] are written against this trait so they never depend on
/// a concrete error type.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as network failures, rate limiting or temporary service
    /// unavailability.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this error must always be surfaced to the user
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    ///
    /// Returns `None` when the default backoff should be used.
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
