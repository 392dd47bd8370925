//! Calibration configuration.

use std::time::Duration;

use tbsim_core::types::ConfigurationError;

/// Default acceptance tolerance, in cases.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Default lower β bound.
pub const DEFAULT_BETA_LOW: f64 = 0.01;

/// Default upper β bound before expansion.
pub const DEFAULT_BETA_HIGH: f64 = 200.0;

/// Default bisection iteration limit.
pub const DEFAULT_MAX_ITERATIONS: usize = 40;

/// Default factors applied in turn to the upper bound when unbracketed.
pub const DEFAULT_UPPER_EXPANSION: [f64; 2] = [500.0, 1000.0];

/// Optional limit on the work a single calibration may perform.
///
/// Checked before every simulation; exceeding either limit aborts with
/// [`CalibrationError::BudgetExhausted`](super::CalibrationError::BudgetExhausted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationBudget {
    /// Maximum number of simulations
    pub max_simulations: Option<usize>,
    /// Maximum wall time
    pub max_duration: Option<Duration>,
}

impl CalibrationBudget {
    /// Budget limited to a number of simulations.
    pub fn simulations(max_simulations: usize) -> Self {
        Self {
            max_simulations: Some(max_simulations),
            max_duration: None,
        }
    }

    /// Budget limited to a wall time.
    pub fn duration(max_duration: Duration) -> Self {
        Self {
            max_simulations: None,
            max_duration: Some(max_duration),
        }
    }

    /// Whether another simulation may start.
    pub fn allows(&self, simulations_done: usize, elapsed: Duration) -> bool {
        self.max_simulations.map_or(true, |max| simulations_done < max)
            && self.max_duration.map_or(true, |max| elapsed < max)
    }
}

/// Settings for [`BetaCalibrator`](super::BetaCalibrator).
///
/// # Examples
///
/// ```
/// use tbsim_models::calibration::CalibrationConfig;
///
/// let config = CalibrationConfig::default();
/// assert_eq!(config.tolerance, 1.0);
/// assert_eq!(config.beta_low, 0.01);
/// assert_eq!(config.beta_high, 200.0);
/// assert_eq!(config.max_iterations, 40);
///
/// let strict = CalibrationConfig::default().with_tolerance(0.1);
/// assert!(strict.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationConfig {
    /// Accepted `|incidence - target|`, in cases
    pub tolerance: f64,
    /// Lower β bound
    pub beta_low: f64,
    /// Upper β bound before expansion
    pub beta_high: f64,
    /// Bisection iteration limit
    pub max_iterations: usize,
    /// Factors applied in turn to `beta_high` while unbracketed
    pub upper_expansion: Vec<f64>,
    /// Horizon of each trial simulation; only Year 1 is matched
    pub years: u32,
    /// Optional work limit
    pub budget: CalibrationBudget,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            beta_low: DEFAULT_BETA_LOW,
            beta_high: DEFAULT_BETA_HIGH,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            upper_expansion: DEFAULT_UPPER_EXPANSION.to_vec(),
            years: 1,
            budget: CalibrationBudget::default(),
        }
    }
}

impl CalibrationConfig {
    /// Set the acceptance tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set both β bounds.
    pub fn with_bounds(mut self, beta_low: f64, beta_high: f64) -> Self {
        self.beta_low = beta_low;
        self.beta_high = beta_high;
        self
    }

    /// Set the bisection iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the upper-bound expansion factors.
    pub fn with_upper_expansion(mut self, factors: impl IntoIterator<Item = f64>) -> Self {
        self.upper_expansion = factors.into_iter().collect();
        self
    }

    /// Set the trial simulation horizon.
    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    /// Set the work budget.
    pub fn with_budget(mut self, budget: CalibrationBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidValue` for a non-positive tolerance, bounds
    /// that are negative or out of order, a zero iteration limit or an expansion
    /// factor not greater than one; `ConfigurationError::InvalidHorizon` for a
    /// zero horizon.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigurationError::invalid_value(
                "tolerance",
                self.tolerance,
                "must be finite and > 0",
            ));
        }
        if !(self.beta_low.is_finite() && self.beta_low >= 0.0) {
            return Err(ConfigurationError::invalid_value(
                "beta_low",
                self.beta_low,
                "must be finite and >= 0",
            ));
        }
        if !(self.beta_high.is_finite() && self.beta_high > self.beta_low) {
            return Err(ConfigurationError::invalid_value(
                "beta_high",
                self.beta_high,
                "must be finite and greater than beta_low",
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_iterations",
                0.0,
                "must be > 0",
            ));
        }
        if let Some(&factor) = self
            .upper_expansion
            .iter()
            .find(|f| !(f.is_finite() && **f > 1.0))
        {
            return Err(ConfigurationError::invalid_value(
                "upper_expansion",
                factor,
                "factors must be finite and > 1",
            ));
        }
        if self.years == 0 {
            return Err(ConfigurationError::InvalidHorizon(0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalibrationConfig::default();
        assert_eq!(config.upper_expansion, vec![500.0, 1000.0]);
        assert_eq!(config.years, 1);
        assert_eq!(config.budget, CalibrationBudget::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = CalibrationConfig::default()
            .with_bounds(0.5, 50.0)
            .with_max_iterations(60)
            .with_upper_expansion([10.0])
            .with_years(2)
            .with_budget(CalibrationBudget::simulations(20));
        assert_eq!(config.beta_low, 0.5);
        assert_eq!(config.beta_high, 50.0);
        assert_eq!(config.max_iterations, 60);
        assert_eq!(config.upper_expansion, vec![10.0]);
        assert_eq!(config.years, 2);
        assert_eq!(config.budget.max_simulations, Some(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let cases = [
            CalibrationConfig::default().with_tolerance(0.0),
            CalibrationConfig::default().with_tolerance(f64::NAN),
            CalibrationConfig::default().with_bounds(-1.0, 200.0),
            CalibrationConfig::default().with_bounds(10.0, 10.0),
            CalibrationConfig::default().with_max_iterations(0),
            CalibrationConfig::default().with_upper_expansion([500.0, 0.5]),
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigurationError::InvalidValue { .. })),
                "{:?} should be rejected",
                config
            );
        }
        assert_eq!(
            CalibrationConfig::default().with_years(0).validate(),
            Err(ConfigurationError::InvalidHorizon(0))
        );
    }

    #[test]
    fn test_budget_allows() {
        let unlimited = CalibrationBudget::default();
        assert!(unlimited.allows(usize::MAX - 1, Duration::from_secs(3600)));

        let capped = CalibrationBudget::simulations(3);
        assert!(capped.allows(2, Duration::ZERO));
        assert!(!capped.allows(3, Duration::ZERO));

        let timed = CalibrationBudget::duration(Duration::from_millis(10));
        assert!(timed.allows(100, Duration::from_millis(9)));
        assert!(!timed.allows(0, Duration::from_millis(10)));
    }
}
