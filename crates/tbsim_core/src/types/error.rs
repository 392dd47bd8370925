//! Error types for structured error handling.
//!
//! This module provides:
//! - `ConfigurationError`: Invalid population, horizon, target, or parameter values
//! - `SolverError`: Errors from bracketing root finders

use thiserror::Error;

/// Invalid model configuration.
///
/// Raised synchronously before any simulation work starts and never retried.
///
/// # Variants
/// - `RateOutOfRange`: Annual probability outside `[0, 1)`
/// - `InvalidValue`: Parameter outside its documented domain
/// - `UnknownParameter`: Override key that names no parameter
/// - `InvalidPopulation`: Population below one person
/// - `InvalidHorizon`: Simulation horizon of zero years
/// - `InvalidTarget`: Negative or non-finite calibration target
///
/// # Examples
/// ```
/// use tbsim_core::types::ConfigurationError;
///
/// let err = ConfigurationError::RateOutOfRange { name: "detection_rate".to_string(), value: 1.0 };
/// assert!(format!("{}", err).contains("detection_rate"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigurationError {
    /// Annual probability outside `[0, 1)`.
    #[error("Rate '{name}' = {value} is outside [0, 1)")]
    RateOutOfRange {
        /// Parameter name
        name: String,
        /// Offending value
        value: f64,
    },

    /// Parameter value outside its documented domain.
    #[error("Invalid value for '{name}': {value} ({reason})")]
    InvalidValue {
        /// Parameter name
        name: String,
        /// Offending value
        value: f64,
        /// Domain that was violated
        reason: String,
    },

    /// Override key that does not name a known parameter.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Population below one person.
    #[error("Population must be at least 1, got {0}")]
    InvalidPopulation(u64),

    /// Simulation horizon of zero years.
    #[error("Simulation horizon must be at least 1 year, got {0}")]
    InvalidHorizon(u32),

    /// Calibration target that is negative or not finite.
    #[error("Calibration target must be finite and non-negative, got {0}")]
    InvalidTarget(f64),
}

impl ConfigurationError {
    /// Create an invalid value error.
    pub fn invalid_value(name: &str, value: f64, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidValue {
            name: name.to_string(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a rate out of range error.
    pub fn rate_out_of_range(name: &str, value: f64) -> Self {
        ConfigurationError::RateOutOfRange {
            name: name.to_string(),
            value,
        }
    }
}

/// Root-finding solver errors.
///
/// # Variants
/// - `NoBracket`: Function values at bracket endpoints have same sign,
///   even after any configured bracket expansion
/// - `NumericalInstability`: Objective returned a non-finite value
///
/// # Examples
/// ```
/// use tbsim_core::types::SolverError;
///
/// let err = SolverError::NoBracket { a: 0.01, b: 1.0e8 };
/// assert!(format!("{}", err).contains("same sign"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Lower bracket endpoint
        a: f64,
        /// Upper bracket endpoint after expansion
        b: f64,
    },

    /// Objective produced NaN or infinity.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_out_of_range_display() {
        let err = ConfigurationError::rate_out_of_range("relapse_rate", 1.5);
        let msg = format!("{}", err);
        assert!(msg.contains("relapse_rate"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigurationError::invalid_value("malnut_multiplier", -1.0, "must be >= 0");
        assert_eq!(
            format!("{}", err),
            "Invalid value for 'malnut_multiplier': -1 (must be >= 0)"
        );
    }

    #[test]
    fn test_population_and_horizon_display() {
        assert!(ConfigurationError::InvalidPopulation(0)
            .to_string()
            .contains("at least 1"));
        assert!(ConfigurationError::InvalidHorizon(0)
            .to_string()
            .contains("1 year"));
    }

    #[test]
    fn test_no_bracket_display() {
        let err = SolverError::NoBracket { a: 1.0, b: 2.0 };
        assert_eq!(format!("{}", err), "No bracket: f(1) and f(2) have same sign");
    }

    #[test]
    fn test_errors_are_cloneable_and_comparable() {
        let err = SolverError::NumericalInstability("NaN residual".to_string());
        assert_eq!(err.clone(), err);
    }
}
