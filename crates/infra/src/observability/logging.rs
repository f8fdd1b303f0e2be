//! Tracing subscriber setup

use entigate_domain::constants::DEFAULT_LOG_LEVEL;
use entigate_domain::{EntigateError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber described by `config`.
///
/// `RUST_LOG` wins over `config.level` when it is set and valid; an invalid
/// level falls back to `info`.
///
/// # Errors
///
/// Returns [`EntigateError::Config`] when a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config);

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).try_init()
    };

    installed.map_err(|err| EntigateError::Config(format!("tracing already initialised: {err}")))
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let config = LoggingConfig { level: "not a level[".to_string(), json: true };

        assert!(init_tracing(&config).is_ok());
        let err = init_tracing(&LoggingConfig::default()).unwrap_err();

        assert!(matches!(err, EntigateError::Config(_)));
    }
}
