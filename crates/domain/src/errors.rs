//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Entigate
///
/// Remote API failures are not represented here; they travel as
/// `ClassifiedError` so that retry and messaging policy can inspect them.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum EntigateError {
    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session token could not be obtained.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A request that cannot be built from the given input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A value that could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EntigateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for Entigate operations
pub type Result<T> = std::result::Result<T, EntigateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let value = serde_json::to_value(EntigateError::Auth("token unavailable".into())).unwrap();
        assert_eq!(value, serde_json::json!({"type": "Auth", "message": "token unavailable"}));
    }

    #[test]
    fn converts_serde_errors() {
        let err: EntigateError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, EntigateError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
