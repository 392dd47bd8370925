//! Error types for the tbsim CLI.

use tbsim_core::types::ConfigurationError;
use tbsim_models::calibration::CalibrationError;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file or environment problem
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid model inputs
    #[error("Model configuration error: {0}")]
    Model(#[from] ConfigurationError),

    /// Calibration failure
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON write error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::invalid_argument("population must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid argument: population must be positive"
        );
    }

    #[test]
    fn test_from_model_errors() {
        let err: CliError = ConfigurationError::InvalidHorizon(0).into();
        assert!(err.to_string().contains("horizon"));

        let err: CliError = CalibrationError::bracketing_failure(975.0, 0.01, 1.0e8).into();
        assert!(err.to_string().starts_with("Calibration error"));
    }
}
