//! Month-zero population split.
//!
//! Seeds the compartments near endemic proportions from a baseline incidence of
//! 195 per 100,000 per year so that runs do not start from an arbitrary guess.

use super::{Compartment, State};
use crate::parameters::ParameterSet;
use tbsim_core::types::ConfigurationError;

/// Baseline annual incidence per 100,000 used to seed the state.
pub const BASELINE_INCIDENCE_PER_100K: f64 = 195.0;

/// Floor on σ when dividing annual incidence into the latent pool.
const MIN_SIGMA: f64 = 1e-9;

/// Builds the month-zero [`State`] for a population.
///
/// # Example
///
/// ```
/// use tbsim_models::compartments::{Compartment, InitialStateBuilder};
/// use tbsim_models::parameters::ParameterSet;
///
/// let state = InitialStateBuilder::new(&ParameterSet::default())
///     .build(1_000_000)
///     .unwrap();
///
/// // 1950 expected cases a year, σ = 0.1
/// assert!((state[Compartment::Latent] - 19_500.0).abs() < 1e-9);
/// assert!((state.total() - 1_000_000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InitialStateBuilder<'a> {
    params: &'a ParameterSet,
}

impl<'a> InitialStateBuilder<'a> {
    /// Create a builder over a parameter set.
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Build the month-zero state.
    ///
    /// When the seeded compartments already exceed the population, S is floored
    /// and the latent pool takes the residual (itself floored at zero), so the
    /// total can then differ from `population`.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidPopulation` when `population == 0`.
    pub fn build(&self, population: u64) -> Result<State, ConfigurationError> {
        if population == 0 {
            return Err(ConfigurationError::InvalidPopulation(population));
        }
        let p = self.params;
        let n = population as f64;

        let annual_incidence = BASELINE_INCIDENCE_PER_100K / 100_000.0 * n;

        let mut latent = annual_incidence / p.sigma.max(MIN_SIGMA);
        let iu_s = (annual_incidence / 5.0).max(10.0);
        let iu_r = (iu_s * p.prop_resistant / (1.0 - p.prop_resistant)).max(1.0);
        let id_s = iu_s * 0.2;
        let id_r = iu_r * 0.2;
        let ts = id_s * 0.5;
        let tr = id_r * 0.5;
        let recovered = 0.0;
        let vaccinated = p.vaccine_coverage * n;

        let mut susceptible =
            n - (latent + iu_s + iu_r + id_s + id_r + ts + tr + recovered + vaccinated);
        if susceptible < 0.0 {
            let others = iu_s + iu_r + id_s + id_r + ts + tr + recovered + vaccinated;
            susceptible = (n - others).max(0.0);
            latent = n - (susceptible + others);
            if latent < 0.0 {
                tracing::warn!(
                    population,
                    residual = latent,
                    "seeded compartments exceed population; latent pool floored at zero"
                );
                latent = 0.0;
            }
        }

        let mut state = State::zeros();
        state[Compartment::Susceptible] = susceptible;
        state[Compartment::Vaccinated] = vaccinated;
        state[Compartment::Latent] = latent;
        state[Compartment::UndetectedSusceptible] = iu_s;
        state[Compartment::UndetectedResistant] = iu_r;
        state[Compartment::DetectedSusceptible] = id_s;
        state[Compartment::DetectedResistant] = id_r;
        state[Compartment::TreatedSusceptible] = ts;
        state[Compartment::TreatedResistant] = tr;
        state[Compartment::Recovered] = recovered;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterKey;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_split_for_one_million() {
        let state = InitialStateBuilder::new(&ParameterSet::default())
            .build(1_000_000)
            .unwrap();

        assert_relative_eq!(state[Compartment::Latent], 19_500.0, epsilon = 1e-9);
        assert_relative_eq!(state[Compartment::UndetectedSusceptible], 390.0, epsilon = 1e-9);
        assert_relative_eq!(state[Compartment::UndetectedResistant], 10.0, epsilon = 1e-9);
        assert_relative_eq!(state[Compartment::DetectedSusceptible], 78.0, epsilon = 1e-9);
        assert_relative_eq!(state[Compartment::DetectedResistant], 2.0, epsilon = 1e-9);
        assert_relative_eq!(state[Compartment::TreatedSusceptible], 39.0, epsilon = 1e-9);
        assert_relative_eq!(state[Compartment::TreatedResistant], 1.0, epsilon = 1e-9);
        assert_eq!(state[Compartment::Recovered], 0.0);
        assert_eq!(state[Compartment::Vaccinated], 0.0);
        assert_relative_eq!(state[Compartment::Susceptible], 979_980.0, epsilon = 1e-6);
    }

    #[test]
    fn test_small_population_uses_floors() {
        // 1000 people: annual incidence 1.95, below both floors
        let state = InitialStateBuilder::new(&ParameterSet::default())
            .build(1_000)
            .unwrap();
        assert_eq!(state[Compartment::UndetectedSusceptible], 10.0);
        assert_eq!(state[Compartment::UndetectedResistant], 1.0);
        assert!(state.is_non_negative());
    }

    #[test]
    fn test_vaccinated_share() {
        let params = ParameterSet::default().with(ParameterKey::VaccineCoverage, 0.3);
        let state = InitialStateBuilder::new(&params).build(100_000).unwrap();
        assert_relative_eq!(state[Compartment::Vaccinated], 30_000.0, epsilon = 1e-9);
        assert_relative_eq!(state.total(), 100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shortfall_moves_into_latent() {
        // σ tiny: latent seed dwarfs the population, so L becomes the residual
        let params = ParameterSet::default().with(ParameterKey::Sigma, 1e-4);
        let state = InitialStateBuilder::new(&params).build(10_000).unwrap();

        assert_relative_eq!(state[Compartment::Susceptible], 9_985.7, epsilon = 1e-6);
        assert!(state[Compartment::Latent].abs() < 1e-6);
        assert!(state.is_non_negative());
        assert_relative_eq!(state.total(), 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_latent_residual_floored() {
        let params = ParameterSet::default().with(ParameterKey::VaccineCoverage, 0.99);
        let state = InitialStateBuilder::new(&params).build(1_000).unwrap();
        assert_eq!(state[Compartment::Susceptible], 0.0);
        assert_eq!(state[Compartment::Latent], 0.0);
        assert!(state.is_non_negative());
    }

    #[test]
    fn test_zero_population_rejected() {
        let result = InitialStateBuilder::new(&ParameterSet::default()).build(0);
        assert_eq!(result, Err(ConfigurationError::InvalidPopulation(0)));
    }
}
