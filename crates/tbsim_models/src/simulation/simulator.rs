//! Simulation driver.

use super::TimeSeries;
use crate::compartments::{ClampDiagnostics, CompartmentStepper, InitialStateBuilder, MonthlyRates};
use crate::parameters::ParameterSet;
use tbsim_core::math::hazard::MONTHS_PER_YEAR;
use tbsim_core::types::ConfigurationError;

/// Runs the compartment model over a horizon.
///
/// Every run builds its own initial state and output buffers; nothing is shared
/// between runs, so a `Simulator` can be used from several threads at once.
///
/// # Example
///
/// ```
/// use tbsim_models::parameters::ParameterSet;
/// use tbsim_models::simulation::Simulator;
/// use tbsim_models::DEFAULT_BETA;
///
/// let series = Simulator::new(ParameterSet::default())
///     .run(DEFAULT_BETA, 10, 1_000_000)
///     .unwrap();
///
/// assert_eq!(series.len(), 121);
/// assert_eq!(series.yearly_incidence().len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Simulator {
    params: ParameterSet,
}

impl Simulator {
    /// Create a simulator over a parameter set.
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }

    /// Returns the parameter set.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Simulate `years * 12` months.
    ///
    /// Logs a warning when the zero floor absorbed any negative values.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::InvalidHorizon` - `years == 0`
    /// * `ConfigurationError::InvalidPopulation` - `population == 0`
    /// * any parameter or β domain violation from [`MonthlyRates::new`]
    pub fn run(&self, beta: f64, years: u32, population: u64) -> Result<TimeSeries, ConfigurationError> {
        let series = self.run_quiet(beta, years, population)?;
        let clamp = series.clamp_diagnostics();
        if !clamp.is_clean() {
            tracing::warn!(
                beta,
                years,
                population,
                events = clamp.events,
                months = clamp.months_affected,
                absorbed = clamp.absorbed_mass,
                "negative compartment values clamped to zero"
            );
        }
        Ok(series)
    }

    /// [`Simulator::run`] without the clamp warning, for repeated trial runs.
    pub(crate) fn run_quiet(
        &self,
        beta: f64,
        years: u32,
        population: u64,
    ) -> Result<TimeSeries, ConfigurationError> {
        if years == 0 {
            return Err(ConfigurationError::InvalidHorizon(years));
        }
        if population == 0 {
            return Err(ConfigurationError::InvalidPopulation(population));
        }

        let stepper = CompartmentStepper::new(MonthlyRates::new(beta, &self.params)?);
        let initial = InitialStateBuilder::new(&self.params).build(population)?;

        let months = years as usize * MONTHS_PER_YEAR;
        let mut states = Vec::with_capacity(months + 1);
        let mut new_cases = Vec::with_capacity(months + 1);
        let mut clamp = ClampDiagnostics::default();

        states.push(initial);
        new_cases.push(0.0);

        let mut current = initial;
        for _ in 0..months {
            let outcome = stepper.step(&current);
            clamp.absorb(outcome.clamp);
            states.push(outcome.state);
            new_cases.push(outcome.new_cases);
            current = outcome.state;
        }

        Ok(TimeSeries::new(beta, years, population, states, new_cases, clamp))
    }
}

/// Simulate with the given β, horizon, population and parameters.
///
/// Shorthand for `Simulator::new(*params).run(beta, years, population)`.
pub fn simulate(
    beta: f64,
    years: u32,
    population: u64,
    params: &ParameterSet,
) -> Result<TimeSeries, ConfigurationError> {
    Simulator::new(*params).run(beta, years, population)
}
