//! Error types for stream telemetry.

use thiserror::Error;

/// Result type alias for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Main error type for the stream telemetry crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// Configuration error (malformed environment value, invalid setting)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// An accumulated token count could not be parsed as an integer.
    ///
    /// This indicates a mismatch between the stream protocol and the
    /// accumulator, so it is reported instead of being treated as zero.
    #[error("Invalid token count for '{field}': {value:?}")]
    InvalidTokenCount {
        /// Name of the accumulated field
        field: String,
        /// The raw accumulated value
        value: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },

    /// Logging could not be initialized
    #[error("Logging error: {message}")]
    Logging {
        /// Error message describing the logging issue
        message: String,
    },
}

impl TelemetryError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        TelemetryError::Configuration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::Serialization {
            message: format!("JSON serialization error: {}", err),
        }
    }
}
