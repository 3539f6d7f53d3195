//! Core error types for recallwise-core.
//!
//! Every operation in the engine is total over valid input. The only failures
//! are rejected inputs (bad review outcomes, malformed timestamps, nonsensical
//! budgets) and configuration that cannot be parsed or is inconsistent.

use thiserror::Error;

/// Core error type for recallwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected caller input
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors for review outcomes and planner arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Quality rating outside 0..=5
    #[error("Quality {quality} is out of range (expected 0-5)")]
    QualityOutOfRange { quality: i32 },

    /// Negative response time
    #[error("Response time must not be negative (got {seconds}s)")]
    NegativeResponseTime { seconds: f64 },

    /// NaN or infinite number
    #[error("Value for '{field}' must be a finite number")]
    NonFiniteValue { field: String },

    /// Timestamp that is not valid ISO-8601 / RFC 3339
    #[error("Malformed timestamp '{value}': {message}")]
    MalformedTimestamp { value: String, message: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SerializeFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_into_invalid_input() {
        let err: CoreError = ValidationError::QualityOutOfRange { quality: 7 }.into();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(
            err.to_string(),
            "Invalid input: Quality 7 is out of range (expected 0-5)"
        );
    }

    #[test]
    fn toml_parse_error_maps_to_parse_failed() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("review = [");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }
}
