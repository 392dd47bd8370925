//! Annual-to-monthly rate conversion.
//!
//! The model advances in monthly steps while its inputs are quoted as annual
//! probabilities. An annual probability `a` is converted to the constant monthly
//! hazard whose twelve-fold compounding reproduces it:
//!
//! ```text
//! m = 1 - (1 - a)^(1/12)        so that        1 - (1 - m)^12 = a
//! ```
//!
//! Transmission (β) and latent activation (σ) are not probabilities and are
//! spread linearly over the year instead, see [`monthly_share`].

use crate::types::ConfigurationError;

/// Number of model steps per calendar year.
pub const MONTHS_PER_YEAR: usize = 12;

const MONTHS_PER_YEAR_F64: f64 = MONTHS_PER_YEAR as f64;

/// Convert an annual probability into a constant monthly hazard.
///
/// # Arguments
///
/// * `name` - Parameter name, used for error reporting
/// * `annual` - Annual probability, must lie in `[0, 1)`
///
/// # Errors
///
/// [`ConfigurationError::RateOutOfRange`] when `annual` is outside `[0, 1)` or not finite.
///
/// # Example
///
/// ```
/// use tbsim_core::math::hazard::monthly_hazard;
///
/// let m = monthly_hazard("relapse_rate", 0.02).unwrap();
/// assert!(m > 0.02 / 12.0 && m < 0.02);
/// assert!(monthly_hazard("relapse_rate", 1.0).is_err());
/// ```
pub fn monthly_hazard(name: &str, annual: f64) -> Result<f64, ConfigurationError> {
    if !(0.0..1.0).contains(&annual) {
        return Err(ConfigurationError::rate_out_of_range(name, annual));
    }
    Ok(1.0 - (1.0 - annual).powf(1.0 / MONTHS_PER_YEAR_F64))
}

/// Monthly detection hazard including the diagnostic reporting lag.
///
/// The hazard from [`monthly_hazard`] is divided by `max(1, delay_months)`, so
/// delays shorter than one month leave the hazard unchanged.
///
/// # Errors
///
/// - [`ConfigurationError::RateOutOfRange`] for a detection rate outside `[0, 1)`
/// - [`ConfigurationError::InvalidValue`] for a negative or non-finite delay
///
/// # Example
///
/// ```
/// use tbsim_core::math::hazard::{monthly_detection_hazard, monthly_hazard};
///
/// let base = monthly_hazard("detection_rate", 0.7).unwrap();
/// let lagged = monthly_detection_hazard(0.7, 2.0).unwrap();
/// assert!((lagged - base / 2.0).abs() < 1e-15);
/// ```
pub fn monthly_detection_hazard(
    annual_detection: f64,
    delay_months: f64,
) -> Result<f64, ConfigurationError> {
    if !delay_months.is_finite() || delay_months < 0.0 {
        return Err(ConfigurationError::invalid_value(
            "diagnostic_delay_months",
            delay_months,
            "must be finite and >= 0",
        ));
    }
    let hazard = monthly_hazard("detection_rate", annual_detection)?;
    Ok(hazard / delay_months.max(1.0))
}

/// Spread an annual quantity evenly over twelve months.
///
/// Used for the transmission coefficient and the latent activation rate,
/// which are rates rather than probabilities.
#[inline]
pub fn monthly_share(annual: f64) -> f64 {
    annual / MONTHS_PER_YEAR_F64
}

/// Compound a monthly hazard back into an annual probability.
///
/// Inverse of [`monthly_hazard`] on `[0, 1)`.
#[inline]
pub fn annual_probability(monthly: f64) -> f64 {
    1.0 - (1.0 - monthly).powi(MONTHS_PER_YEAR as i32)
}
