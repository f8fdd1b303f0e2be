//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_QUERY_RETRY_COUNT, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RETRY_BASE_MS,
    DEFAULT_RETRY_MAX_MS, DEFAULT_ROLES_CLAIM, DEFAULT_STALE_TIME_MS,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings.
    pub api: ApiConfig,
    /// Read cache settings.
    #[serde(default)]
    pub query: QueryConfig,
    /// Identity claim settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Tracing settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote entity API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto
    pub base_url: String,
    /// Per-attempt request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Read cache policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// How long a successful read stays fresh
    pub stale_time_ms: u64,
    /// Additional attempts after a retryable failure
    pub retry_count: u32,
    /// First retry delay; doubles per attempt
    pub retry_base_ms: u64,
    /// Upper bound for a single retry delay
    pub retry_max_ms: u64,
}

/// Identity claim configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Profile claim holding the role list
    pub roles_claim: String,
}

/// Tracing subscriber configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Config {
    /// Configuration for `base_url` with every other section defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig::new(base_url),
            query: QueryConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Settings for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS }
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl QueryConfig {
    /// Freshness window.
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    /// First retry delay.
    pub fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }

    /// Retry delay cap.
    pub fn retry_max(&self) -> Duration {
        Duration::from_millis(self.retry_max_ms)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time_ms: DEFAULT_STALE_TIME_MS,
            retry_count: DEFAULT_QUERY_RETRY_COUNT,
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
            retry_max_ms: DEFAULT_RETRY_MAX_MS,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { roles_claim: DEFAULT_ROLES_CLAIM.to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api": {"base_url": "http://localhost:8080"}}"#).unwrap();

        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.query.stale_time(), Duration::from_secs(30));
        assert_eq!(config.query.retry_count, 2);
        assert_eq!(config.auth.roles_claim, "jmix-roles");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"api": {"base_url": "http://x", "timeout_ms": 500}, "query": {"retry_count": 0}}"#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_ms, 500);
        assert_eq!(config.query.retry_count, 0);
        assert_eq!(config.query.retry_max(), Duration::from_secs(30));
    }

    #[test]
    fn with_base_url_matches_serde_defaults() {
        let built = Config::with_base_url("http://x");
        let parsed: Config = serde_json::from_str(r#"{"api": {"base_url": "http://x"}}"#).unwrap();
        assert_eq!(built, parsed);
    }
}
