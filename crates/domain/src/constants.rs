//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Remote API
/// Path prefix of every entity endpoint.
pub const ENTITIES_BASE_PATH: &str = "/rest/entities";
/// Per-attempt request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// Query cache
/// How long a read stays fresh.
pub const DEFAULT_STALE_TIME_MS: u64 = 30_000;
/// Additional attempts after a retryable read failure.
pub const DEFAULT_QUERY_RETRY_COUNT: u32 = 2;
/// First retry delay.
pub const DEFAULT_RETRY_BASE_MS: u64 = 1_000;
/// Retry delay cap.
pub const DEFAULT_RETRY_MAX_MS: u64 = 30_000;

// Identity profile claim holding the user's resource roles
/// Profile claim holding the role list.
pub const DEFAULT_ROLES_CLAIM: &str = "jmix-roles";

// Logging
/// Filter directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";
