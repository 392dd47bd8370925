//! β calibration.
//!
//! Year-1 incidence is treated as a black-box function of β; classic bisection
//! from [`tbsim_core::math::solvers`] finds the β where it meets a target.
//!
//! ## Failure Handling
//!
//! - Iteration limit reached: not an error, the last midpoint is returned with
//!   `converged == false`
//! - No sign change after expanding the upper bound, or a target above the
//!   population: [`CalibrationError::BracketingFailure`]
//! - Budget exceeded: [`CalibrationError::BudgetExhausted`]
//!
//! For the last two, callers fall back to [`DEFAULT_BETA`](crate::DEFAULT_BETA).

mod beta;
mod config;
mod error;
mod result;

pub use beta::{calibrate, BetaCalibrator};
pub use config::{
    CalibrationBudget, CalibrationConfig, DEFAULT_BETA_HIGH, DEFAULT_BETA_LOW,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, DEFAULT_UPPER_EXPANSION,
};
pub use error::CalibrationError;
pub use result::CalibrationResult;
