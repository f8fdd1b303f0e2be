//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `ENTIGATE_API_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ENTIGATE_API_URL`: Base URL of the entity API (required)
//! - `ENTIGATE_API_TIMEOUT_MS`: Per-attempt request timeout
//! - `ENTIGATE_QUERY_STALE_MS`: How long cached reads stay fresh
//! - `ENTIGATE_QUERY_RETRY_COUNT`: Retries after a retryable read failure
//! - `ENTIGATE_ROLES_CLAIM`: Profile claim holding the role list
//! - `ENTIGATE_LOG_LEVEL`: Default log filter
//! - `ENTIGATE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./entigate.json` or `./entigate.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use entigate_domain::{Config, EntigateError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the API URL is not
/// set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `EntigateError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `ENTIGATE_API_URL` is required; every other setting keeps its default
/// when unset.
///
/// # Errors
/// Returns `EntigateError::Config` if the API URL is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::with_base_url(env_var("ENTIGATE_API_URL")?);

    if let Some(timeout) = env_parse("ENTIGATE_API_TIMEOUT_MS")? {
        config.api.timeout_ms = timeout;
    }
    if let Some(stale) = env_parse("ENTIGATE_QUERY_STALE_MS")? {
        config.query.stale_time_ms = stale;
    }
    if let Some(retries) = env_parse("ENTIGATE_QUERY_RETRY_COUNT")? {
        config.query.retry_count = retries;
    }
    if let Ok(claim) = std::env::var("ENTIGATE_ROLES_CLAIM") {
        config.auth.roles_claim = claim;
    }
    if let Ok(level) = std::env::var("ENTIGATE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("ENTIGATE_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `EntigateError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(EntigateError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            EntigateError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| EntigateError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| EntigateError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| EntigateError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(EntigateError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory (and up to two parents), then the same
/// names relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("entigate.json"),
        dir.join("entigate.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        EntigateError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| EntigateError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
