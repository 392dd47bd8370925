//! District batch runs.
//!
//! For each district: derive a Year-1 target from notified cases and an
//! underreporting multiplier, calibrate β (falling back to
//! [`DEFAULT_BETA`] on a recoverable failure), then simulate the full horizon
//! with that β.
//!
//! Districts share nothing, so with the `parallel` feature they are processed
//! on the rayon thread pool; results keep the input order either way.

use crate::calibration::{BetaCalibrator, CalibrationConfig, CalibrationError, CalibrationResult};
use crate::parameters::ParameterSet;
use crate::simulation::Simulator;
use crate::DEFAULT_BETA;
use tbsim_core::types::ConfigurationError;

/// Index of the Year-5 figure in a yearly incidence series.
const YEAR5_INDEX: usize = 4;

/// One district to model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistrictInput {
    /// District name
    pub district: String,
    /// Population size
    pub population: u64,
    /// Notified cases in the reference year
    pub notified_cases: f64,
}

impl DistrictInput {
    /// Create a district input.
    pub fn new(district: impl Into<String>, population: u64, notified_cases: f64) -> Self {
        Self {
            district: district.into(),
            population,
            notified_cases,
        }
    }
}

/// Where the β used for a district came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BetaSource {
    /// Calibrated against the district's target
    Calibrated,
    /// Calibration failed; [`DEFAULT_BETA`] used
    Fallback,
    /// Calibration not requested; [`DEFAULT_BETA`] used
    Default,
}

impl BetaSource {
    /// Lower-case label.
    pub fn as_str(self) -> &'static str {
        match self {
            BetaSource::Calibrated => "calibrated",
            BetaSource::Fallback => "fallback",
            BetaSource::Default => "default",
        }
    }
}

/// Result for one district.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistrictOutcome {
    /// District name
    pub district: String,
    /// Population size
    pub population: u64,
    /// Notified cases in the reference year
    pub notified_cases: f64,
    /// Year-1 target (`notified_cases * underreporting`)
    pub target: f64,
    /// β used for the reported run
    pub beta_used: f64,
    /// Origin of `beta_used`
    pub beta_source: BetaSource,
    /// Simulated Year-1 incidence
    pub year1_incidence: f64,
    /// Simulated Year-5 incidence, or the last year for shorter horizons
    pub year5_incidence: f64,
    /// `100 * (year1 - year5) / year1`, zero when Year 1 has no cases
    pub percent_reduction: f64,
    /// Incidence for every year of the horizon
    pub yearly_incidence: Vec<f64>,
    /// Calibration details when β was calibrated
    pub calibration: Option<CalibrationResult>,
    /// Reason for a fallback
    pub fallback_reason: Option<String>,
}

/// Runs calibration and simulation for a batch of districts.
///
/// # Example
///
/// ```
/// use tbsim_models::districts::{BetaSource, DistrictInput, DistrictRunner};
/// use tbsim_models::parameters::ParameterSet;
///
/// let runner = DistrictRunner::new(ParameterSet::default()).with_years(5);
/// let outcomes = runner.run_all(&[
///     DistrictInput::new("North", 500_000, 1950.0),
///     DistrictInput::new("South", 500_000, 975.0),
/// ]);
///
/// let north = outcomes[0].as_ref().unwrap();
/// assert_eq!(north.beta_source, BetaSource::Calibrated);
///
/// // 975 cases is below what the model produces even with β at its lower bound
/// let south = outcomes[1].as_ref().unwrap();
/// assert_eq!(south.beta_source, BetaSource::Fallback);
/// ```
#[derive(Debug, Clone)]
pub struct DistrictRunner {
    params: ParameterSet,
    calibration: CalibrationConfig,
    years: u32,
    underreporting: f64,
    calibrate: bool,
}

impl DistrictRunner {
    /// Runner with a 10-year horizon, no underreporting and calibration on.
    pub fn new(params: ParameterSet) -> Self {
        Self {
            params,
            calibration: CalibrationConfig::default(),
            years: 10,
            underreporting: 1.0,
            calibrate: true,
        }
    }

    /// Set the calibration settings.
    pub fn with_calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set the reporting horizon in years.
    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    /// Set the multiplier applied to notified cases.
    pub fn with_underreporting(mut self, multiplier: f64) -> Self {
        self.underreporting = multiplier;
        self
    }

    /// Enable or disable calibration; disabled runs use [`DEFAULT_BETA`].
    pub fn with_calibrate(mut self, calibrate: bool) -> Self {
        self.calibrate = calibrate;
        self
    }

    /// Returns the parameter set.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Model one district.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for an invalid population, horizon, multiplier or
    /// parameter set. Calibration failures that allow a fallback are not errors.
    pub fn run_one(&self, input: &DistrictInput) -> Result<DistrictOutcome, ConfigurationError> {
        if !(self.underreporting.is_finite() && self.underreporting > 0.0) {
            return Err(ConfigurationError::invalid_value(
                "underreporting",
                self.underreporting,
                "must be finite and > 0",
            ));
        }
        let target = input.notified_cases * self.underreporting;

        let (beta_used, beta_source, calibration, fallback_reason) = if self.calibrate {
            let calibrator = BetaCalibrator::new(self.params, self.calibration.clone());
            match calibrator.calibrate(target, input.population) {
                Ok(result) => (result.beta, BetaSource::Calibrated, Some(result), None),
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(
                        district = %input.district,
                        target,
                        error = %err,
                        fallback = DEFAULT_BETA,
                        "calibration failed; using default beta"
                    );
                    (DEFAULT_BETA, BetaSource::Fallback, None, Some(err.to_string()))
                }
                Err(CalibrationError::Configuration(err)) => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        district = %input.district,
                        error = %err,
                        "calibration unstable; using default beta"
                    );
                    (DEFAULT_BETA, BetaSource::Fallback, None, Some(err.to_string()))
                }
            }
        } else {
            (DEFAULT_BETA, BetaSource::Default, None, None)
        };

        let series = Simulator::new(self.params).run(beta_used, self.years, input.population)?;
        let yearly_incidence = series.yearly_incidence();
        let year1_incidence = yearly_incidence.first().copied().unwrap_or(0.0);
        let year5_incidence = yearly_incidence
            .get(YEAR5_INDEX)
            .or_else(|| yearly_incidence.last())
            .copied()
            .unwrap_or(0.0);
        let percent_reduction = percent_reduction(year1_incidence, year5_incidence);

        tracing::debug!(
            district = %input.district,
            beta = beta_used,
            source = beta_source.as_str(),
            year1_incidence,
            year5_incidence,
            "district modelled"
        );

        Ok(DistrictOutcome {
            district: input.district.clone(),
            population: input.population,
            notified_cases: input.notified_cases,
            target,
            beta_used,
            beta_source,
            year1_incidence,
            year5_incidence,
            percent_reduction,
            yearly_incidence,
            calibration,
            fallback_reason,
        })
    }

    /// Model every district, in parallel.
    #[cfg(feature = "parallel")]
    pub fn run_all(&self, inputs: &[DistrictInput]) -> Vec<Result<DistrictOutcome, ConfigurationError>> {
        use rayon::prelude::*;

        inputs.par_iter().map(|input| self.run_one(input)).collect()
    }

    /// Model every district, sequentially.
    #[cfg(not(feature = "parallel"))]
    pub fn run_all(&self, inputs: &[DistrictInput]) -> Vec<Result<DistrictOutcome, ConfigurationError>> {
        inputs.iter().map(|input| self.run_one(input)).collect()
    }
}

/// Percentage fall from Year 1 to a later year; zero when Year 1 is not positive.
pub fn percent_reduction(year1: f64, later: f64) -> f64 {
    if year1 > 0.0 {
        100.0 * (year1 - later) / year1
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percent_reduction() {
        assert_relative_eq!(percent_reduction(200.0, 150.0), 25.0);
        assert_relative_eq!(percent_reduction(100.0, 120.0), -20.0);
        assert_eq!(percent_reduction(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_calibrated_district() {
        let runner = DistrictRunner::new(ParameterSet::default()).with_years(5);
        let outcome = runner
            .run_one(&DistrictInput::new("Pune", 500_000, 1950.0))
            .unwrap();

        assert_eq!(outcome.beta_source, BetaSource::Calibrated);
        assert!(outcome.calibration.is_some());
        assert!(outcome.fallback_reason.is_none());
        assert!((outcome.year1_incidence - 1950.0).abs() <= 1.0);
        assert_eq!(outcome.yearly_incidence.len(), 5);
        assert_eq!(outcome.year5_incidence, outcome.yearly_incidence[4]);
    }

    #[test]
    fn test_underreporting_scales_target() {
        let runner = DistrictRunner::new(ParameterSet::default())
            .with_years(1)
            .with_underreporting(2.0);
        let outcome = runner
            .run_one(&DistrictInput::new("Nashik", 500_000, 975.0))
            .unwrap();
        assert_eq!(outcome.target, 1950.0);
        assert_eq!(outcome.beta_source, BetaSource::Calibrated);
    }

    #[test]
    fn test_infeasible_target_falls_back() {
        let runner = DistrictRunner::new(ParameterSet::default()).with_years(3);
        let outcome = runner
            .run_one(&DistrictInput::new("Satara", 500_000, 975.0))
            .unwrap();

        assert_eq!(outcome.beta_source, BetaSource::Fallback);
        assert_eq!(outcome.beta_used, DEFAULT_BETA);
        assert!(outcome.fallback_reason.is_some());
        // Horizon shorter than five years: last year stands in
        assert_eq!(outcome.year5_incidence, outcome.yearly_incidence[2]);
    }

    #[test]
    fn test_calibration_disabled() {
        let runner = DistrictRunner::new(ParameterSet::default())
            .with_years(2)
            .with_calibrate(false);
        let outcome = runner
            .run_one(&DistrictInput::new("Thane", 1_000_000, 0.0))
            .unwrap();
        assert_eq!(outcome.beta_source, BetaSource::Default);
        assert_eq!(outcome.beta_used, DEFAULT_BETA);
        assert!(outcome.calibration.is_none());
    }

    #[test]
    fn test_invalid_population_is_error() {
        let runner = DistrictRunner::new(ParameterSet::default());
        let result = runner.run_one(&DistrictInput::new("Empty", 0, 10.0));
        assert_eq!(result, Err(ConfigurationError::InvalidPopulation(0)));
    }

    #[test]
    fn test_invalid_underreporting() {
        let runner = DistrictRunner::new(ParameterSet::default()).with_underreporting(0.0);
        assert!(runner
            .run_one(&DistrictInput::new("Solapur", 1_000, 1.0))
            .is_err());
    }

    #[test]
    fn test_run_all_keeps_order() {
        let runner = DistrictRunner::new(ParameterSet::default()).with_years(1);
        let inputs: Vec<_> = [1950.0, 3000.0, 2500.0]
            .iter()
            .enumerate()
            .map(|(i, cases)| DistrictInput::new(format!("D{}", i), 500_000, *cases))
            .collect();
        let outcomes = runner.run_all(&inputs);

        assert_eq!(outcomes.len(), 3);
        for (input, outcome) in inputs.iter().zip(&outcomes) {
            assert_eq!(outcome.as_ref().unwrap().district, input.district);
        }
    }
}
