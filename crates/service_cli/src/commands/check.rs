//! Check command implementation
//!
//! Validates the configuration and runs a one-year smoke simulation.

use tbsim_models::parameters::ParameterSet;
use tbsim_models::simulation::simulate;
use tbsim_models::DEFAULT_BETA;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::output;
use crate::Result;

const SMOKE_POPULATION: u64 = 1_000_000;

/// Outcome of the smoke run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    /// Year-1 incidence at [`DEFAULT_BETA`] for a population of one million
    pub year1_incidence: f64,
    /// Whether the smoke run needed any clamping
    pub clamped: bool,
    /// Names of parameters that differ from the defaults
    pub changed: Vec<&'static str>,
}

/// Validate `config` and run the smoke simulation.
pub fn check(config: &CliConfig) -> Result<CheckReport> {
    config.validate()?;
    let params: &ParameterSet = &config.parameters;
    let series = simulate(DEFAULT_BETA, 1, SMOKE_POPULATION, params)?;

    Ok(CheckReport {
        year1_incidence: series.yearly_incidence()[0],
        clamped: !series.clamp_diagnostics().is_clean(),
        changed: output::changed_keys(params)
            .into_iter()
            .map(|key| key.name())
            .collect(),
    })
}

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");
    let report = check(config)?;

    info!(
        log_level = %config.log_level,
        horizon_years = config.horizon_years,
        underreporting = config.underreporting,
        "configuration valid"
    );
    if report.changed.is_empty() {
        info!("parameters: defaults");
    } else {
        info!(changed = ?report.changed, "parameters differ from defaults");
    }
    if report.clamped {
        warn!("smoke simulation clamped negative compartments");
    }
    info!(
        year1_incidence = report.year1_incidence,
        population = SMOKE_POPULATION,
        "smoke simulation ok"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::CliError;
    use approx::assert_relative_eq;
    use tbsim_models::parameters::ParameterKey;

    #[test]
    fn test_check_defaults() {
        let report = check(&CliConfig::default()).unwrap();
        assert_relative_eq!(report.year1_incidence, 2442.1570160634105, max_relative = 1e-9);
        assert!(!report.clamped);
        assert!(report.changed.is_empty());
    }

    #[test]
    fn test_check_lists_changed_parameters() {
        let mut config = CliConfig::default();
        config.parameters = config.parameters.with(ParameterKey::DetectionRate, 0.9);
        let report = check(&config).unwrap();
        assert_eq!(report.changed, vec!["detection_rate"]);
    }

    #[test]
    fn test_check_rejects_invalid_config() {
        let mut config = CliConfig::default();
        config.horizon_years = 0;
        assert!(matches!(
            check(&config),
            Err(CliError::Config(ConfigError::Validation(_)))
        ));
    }
}
