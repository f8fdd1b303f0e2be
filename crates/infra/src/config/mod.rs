//! Configuration loading
//!
//! Builds the application [`Config`](entigate_domain::Config) from
//! environment variables, falling back to a JSON or TOML file.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
