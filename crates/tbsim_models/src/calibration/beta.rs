//! β calibration against a Year-1 incidence target.

use std::time::Instant;

use super::{CalibrationConfig, CalibrationError, CalibrationResult};
use crate::parameters::ParameterSet;
use crate::simulation::Simulator;
use tbsim_core::math::solvers::{BisectionSolver, SolverConfig};
use tbsim_core::types::ConfigurationError;

/// Fits β so that simulated Year-1 incidence matches a target.
///
/// Each trial β runs an independent simulation of `config.years` years and
/// compares its first yearly incidence with the target. The search assumes
/// incidence is non-decreasing in β.
///
/// # Example
///
/// ```
/// use tbsim_models::calibration::{BetaCalibrator, CalibrationConfig};
/// use tbsim_models::parameters::ParameterSet;
/// use tbsim_models::simulation::simulate;
///
/// let calibrator = BetaCalibrator::new(ParameterSet::default(), CalibrationConfig::default());
/// let result = calibrator.calibrate(1950.0, 500_000).unwrap();
///
/// let series = simulate(result.beta, 1, 500_000, &ParameterSet::default()).unwrap();
/// assert!((series.yearly_incidence()[0] - 1950.0).abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct BetaCalibrator {
    simulator: Simulator,
    config: CalibrationConfig,
}

impl BetaCalibrator {
    /// Create a calibrator.
    pub fn new(params: ParameterSet, config: CalibrationConfig) -> Self {
        Self {
            simulator: Simulator::new(params),
            config,
        }
    }

    /// Calibrator with [`CalibrationConfig::default`].
    pub fn with_defaults(params: ParameterSet) -> Self {
        Self::new(params, CalibrationConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Returns the parameter set.
    pub fn params(&self) -> &ParameterSet {
        self.simulator.params()
    }

    /// Find β for `target_cases` Year-1 cases in a population.
    ///
    /// # Errors
    ///
    /// * `CalibrationError::Configuration` - invalid target, population, horizon,
    ///   parameters or settings
    /// * `CalibrationError::BracketingFailure` - the target is above the population
    ///   or no β in the expanded range reaches it
    /// * `CalibrationError::BudgetExhausted` - the configured budget ran out
    pub fn calibrate(
        &self,
        target_cases: f64,
        population: u64,
    ) -> Result<CalibrationResult, CalibrationError> {
        let config = &self.config;
        config.validate()?;
        if !(target_cases.is_finite() && target_cases >= 0.0) {
            return Err(ConfigurationError::InvalidTarget(target_cases).into());
        }
        if population == 0 {
            return Err(ConfigurationError::InvalidPopulation(population).into());
        }
        self.params().validate()?;

        if target_cases > population as f64 {
            tracing::debug!(
                target_cases,
                population,
                "target exceeds population; not searching"
            );
            return Err(CalibrationError::bracketing_failure(
                target_cases,
                config.beta_low,
                config.beta_high,
            ));
        }

        let solver = BisectionSolver::new(SolverConfig::new(config.tolerance, config.max_iterations))
            .with_upper_expansion(config.upper_expansion.iter().copied());

        let started = Instant::now();
        let mut simulations = 0usize;

        let objective = |beta: f64| -> Result<f64, CalibrationError> {
            let elapsed = started.elapsed();
            if !config.budget.allows(simulations, elapsed) {
                return Err(CalibrationError::BudgetExhausted {
                    simulations,
                    elapsed,
                });
            }
            simulations += 1;

            let series = self.simulator.run_quiet(beta, config.years, population)?;
            let incidence = series.yearly_incidence().first().copied().unwrap_or(0.0);
            let residual = incidence - target_cases;
            tracing::debug!(
                beta,
                incidence,
                residual,
                clamps = series.clamp_diagnostics().events,
                "calibration trial"
            );
            Ok(residual)
        };

        let outcome = solver
            .try_find_root(objective, config.beta_low, config.beta_high)
            .map_err(|err| match err {
                CalibrationError::BracketingFailure {
                    beta_low,
                    beta_high,
                    ..
                } => CalibrationError::bracketing_failure(target_cases, beta_low, beta_high),
                other => other,
            })?;

        let duration = started.elapsed();
        if outcome.converged {
            tracing::info!(
                beta = outcome.root,
                target_cases,
                residual = outcome.residual,
                iterations = outcome.iterations,
                simulations = outcome.evaluations,
                "calibration converged"
            );
        } else {
            tracing::warn!(
                beta = outcome.root,
                target_cases,
                residual = outcome.residual,
                iterations = outcome.iterations,
                "calibration hit the iteration limit; returning last midpoint"
            );
        }

        Ok(CalibrationResult {
            beta: outcome.root,
            target: target_cases,
            residual: outcome.residual,
            beta_low: outcome.bracket.lower,
            beta_high: outcome.bracket.upper,
            search_upper: outcome.search.upper,
            iterations: outcome.iterations,
            simulations: outcome.evaluations,
            converged: outcome.converged,
            duration,
        })
    }
}

/// Calibrate β for `target_cases` with the given parameters and settings.
///
/// Shorthand for `BetaCalibrator::new(*params, config.clone()).calibrate(target_cases, population)`.
pub fn calibrate(
    target_cases: f64,
    population: u64,
    params: &ParameterSet,
    config: &CalibrationConfig,
) -> Result<CalibrationResult, CalibrationError> {
    BetaCalibrator::new(*params, config.clone()).calibrate(target_cases, population)
}
