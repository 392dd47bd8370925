//! Calibration error types.

use std::time::Duration;

use tbsim_core::types::{ConfigurationError, SolverError};
use thiserror::Error;

/// β calibration failure.
///
/// Running out of bisection iterations is not an error; see
/// [`CalibrationResult::converged`](super::CalibrationResult::converged).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Invalid population, horizon, target or parameters.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// No sign change between the β bounds, even after expanding the upper bound.
    ///
    /// Callers are expected to fall back to [`DEFAULT_BETA`](crate::DEFAULT_BETA).
    #[error(
        "Unable to bracket target {target:.3} between beta = {beta_low} and beta = {beta_high}"
    )]
    BracketingFailure {
        /// Year-1 incidence that was sought
        target: f64,
        /// Lower β bound
        beta_low: f64,
        /// Upper β bound after the last expansion
        beta_high: f64,
    },

    /// The optional work budget ran out before the search finished.
    #[error("Calibration budget exhausted after {simulations} simulations ({elapsed:?})")]
    BudgetExhausted {
        /// Simulations performed
        simulations: usize,
        /// Wall time spent
        elapsed: Duration,
    },

    /// The objective produced NaN.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl CalibrationError {
    /// Create a bracketing failure error.
    pub fn bracketing_failure(target: f64, beta_low: f64, beta_high: f64) -> Self {
        CalibrationError::BracketingFailure {
            target,
            beta_low,
            beta_high,
        }
    }

    /// Whether the caller can proceed with the default β.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalibrationError::BracketingFailure { .. } | CalibrationError::BudgetExhausted { .. }
        )
    }
}

impl From<SolverError> for CalibrationError {
    fn from(err: SolverError) -> Self {
        match err {
            // The calibrator rewrites this with the target; bounds are kept as a fallback.
            SolverError::NoBracket { a, b } => CalibrationError::BracketingFailure {
                target: f64::NAN,
                beta_low: a,
                beta_high: b,
            },
            SolverError::NumericalInstability(msg) => CalibrationError::NumericalInstability(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketing_failure_display() {
        let err = CalibrationError::bracketing_failure(2.0e8, 0.01, 1.0e8);
        let msg = err.to_string();
        assert!(msg.contains("Unable to bracket"));
        assert!(msg.contains("100000000"));
    }

    #[test]
    fn test_configuration_is_transparent() {
        let err: CalibrationError = ConfigurationError::InvalidTarget(-1.0).into();
        assert_eq!(
            err.to_string(),
            ConfigurationError::InvalidTarget(-1.0).to_string()
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable_variants() {
        assert!(CalibrationError::bracketing_failure(1.0, 0.01, 200.0).is_recoverable());
        assert!(CalibrationError::BudgetExhausted {
            simulations: 3,
            elapsed: Duration::from_millis(5),
        }
        .is_recoverable());
        assert!(!CalibrationError::NumericalInstability("NaN".to_string()).is_recoverable());
    }

    #[test]
    fn test_from_solver_error() {
        let err: CalibrationError = SolverError::NoBracket { a: 0.01, b: 2.0e7 }.into();
        match err {
            CalibrationError::BracketingFailure {
                beta_low, beta_high, ..
            } => {
                assert_eq!(beta_low, 0.01);
                assert_eq!(beta_high, 2.0e7);
            }
            other => panic!("Expected BracketingFailure, got {:?}", other),
        }
    }
}
