//! Status enums shared between the cache and notification ports

use serde::{Deserialize, Serialize};

/// Lifecycle of a cache entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Never fetched.
    #[default]
    Idle,
    /// A fetch is running.
    Pending,
    /// Last fetch succeeded or data was written directly.
    Success,
    /// Last fetch failed; any earlier data is kept.
    Error,
}

crate::impl_domain_status_conversions!(QueryStatus {
    Idle => "idle",
    Pending => "pending",
    Success => "success",
    Error => "error",
});

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A write went through.
    Success,
    /// A write failed.
    Error,
    /// Needs attention but nothing failed.
    Warn,
    /// Neutral information.
    Info,
}

crate::impl_domain_status_conversions!(NotificationKind {
    Success => "success",
    Error => "error",
    Warn => "warn",
    Info => "info",
});
