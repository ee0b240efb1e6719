//! Error types for the petrel-alerts crate.

use thiserror::Error;

/// Errors that can occur in the alert pipeline.
#[derive(Debug, Error)]
pub enum AlertError {
    /// A channel was configured with invalid parameters.
    #[error("invalid channel config: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    HttpClient(String),

    /// Failed to serialize a payload.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_display() {
        let err = AlertError::InvalidConfig {
            reason: "webhook URL cannot be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid channel config: webhook URL cannot be empty"
        );
    }

    #[test]
    fn http_client_display() {
        let err = AlertError::HttpClient("builder failed".to_string());
        assert_eq!(err.to_string(), "http client error: builder failed");
    }

    #[test]
    fn serialization_error_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid")
            .expect_err("should fail to parse");
        let err = AlertError::from(json_err);

        assert!(matches!(err, AlertError::SerializationError(_)));
        assert!(err.to_string().starts_with("serialization error:"));
    }
}
