//! Calibration result types.

use std::time::Duration;

/// Outcome of a β calibration.
///
/// `converged == false` means the iteration limit ran out and `beta` is the
/// last midpoint; it is still a usable estimate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationResult {
    /// Calibrated annual transmission coefficient
    pub beta: f64,
    /// Year-1 incidence that was sought
    pub target: f64,
    /// `incidence(beta) - target`
    pub residual: f64,
    /// Lower end of the bracket in force when `beta` was accepted
    pub beta_low: f64,
    /// Upper end of the bracket in force when `beta` was accepted
    pub beta_high: f64,
    /// Upper search bound after any expansion
    pub search_upper: f64,
    /// Bisection iterations
    pub iterations: usize,
    /// Simulations run, including bracketing
    pub simulations: usize,
    /// Whether `|residual| <= tolerance`
    pub converged: bool,
    /// Wall time spent
    pub duration: Duration,
}

impl CalibrationResult {
    /// Year-1 incidence produced by `beta`.
    pub fn year1_incidence(&self) -> f64 {
        self.target + self.residual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year1_incidence() {
        let result = CalibrationResult {
            beta: 27.7,
            target: 1950.0,
            residual: 0.2,
            beta_low: 27.6,
            beta_high: 27.8,
            search_upper: 200.0,
            iterations: 11,
            simulations: 13,
            converged: true,
            duration: Duration::from_millis(3),
        };
        assert!((result.year1_incidence() - 1950.2).abs() < 1e-9);
    }
}
