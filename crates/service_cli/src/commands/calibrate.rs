//! Calibrate command implementation
//!
//! Finds the β whose Year-1 incidence matches a target for one population.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tbsim_models::calibration::BetaCalibrator;
use tracing::{info, warn};

use super::{open_output, resolve_parameters};
use crate::config::CliConfig;
use crate::output::{self, OutputFormat};
use crate::{CliError, Result};

/// Arguments for `tbsim calibrate`
#[derive(Debug, Clone, Args)]
pub struct CalibrateArgs {
    /// Population size
    #[arg(short, long)]
    pub population: u64,

    /// Year-1 incidence target in cases
    #[arg(short, long, conflicts_with = "notified", required_unless_present = "notified")]
    pub target: Option<f64>,

    /// Notified cases; the target is this times the underreporting multiplier
    #[arg(short, long)]
    pub notified: Option<f64>,

    /// Underreporting multiplier (defaults to the configured value)
    #[arg(short, long)]
    pub underreporting: Option<f64>,

    /// Parameter override, repeatable (e.g. --set detection_rate=0.9)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CalibrateArgs {
    fn target(&self, config: &CliConfig) -> Result<f64> {
        match (self.target, self.notified) {
            (Some(target), _) => Ok(target),
            (None, Some(notified)) => {
                Ok(notified * self.underreporting.unwrap_or(config.underreporting))
            }
            (None, None) => Err(CliError::invalid_argument(
                "either --target or --notified is required",
            )),
        }
    }
}

/// Run the calibrate command
pub fn run(config: &CliConfig, args: &CalibrateArgs) -> Result<()> {
    let params = resolve_parameters(config, &args.overrides)?;
    let target = args.target(config)?;

    info!(target, population = args.population, "starting calibration");
    let calibrator = BetaCalibrator::new(params, config.calibration.to_config());
    let result = calibrator.calibrate(target, args.population)?;

    if !result.converged {
        warn!(
            beta = result.beta,
            residual = result.residual,
            "iteration limit reached before tolerance; reporting last midpoint"
        );
    }

    let mut out = open_output(args.output.as_deref())?;
    output::write_calibration(&mut out, &result, args.population, args.format)?;
    out.flush()?;

    info!("Calibration complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbsim_models::calibration::CalibrationError;

    fn args(population: u64, target: f64, output: PathBuf) -> CalibrateArgs {
        CalibrateArgs {
            population,
            target: Some(target),
            notified: None,
            underreporting: None,
            overrides: Vec::new(),
            format: OutputFormat::Json,
            output: Some(output),
        }
    }

    #[test]
    fn test_calibrate_writes_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beta.json");

        run(&CliConfig::default(), &args(500_000, 1950.0, path.clone())).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!((doc["beta"].as_f64().unwrap() - 27.694).abs() < 1e-3);
        assert_eq!(doc["population"], 500_000);
    }

    #[test]
    fn test_target_from_notified_cases() {
        let mut config = CliConfig::default();
        config.underreporting = 2.0;
        let mut args = args(500_000, 0.0, PathBuf::new());
        args.target = None;
        args.notified = Some(975.0);

        assert_eq!(args.target(&config).unwrap(), 1950.0);

        args.underreporting = Some(1.5);
        assert_eq!(args.target(&config).unwrap(), 1462.5);
    }

    #[test]
    fn test_unreachable_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            &CliConfig::default(),
            &args(500_000, 975.0, dir.path().join("beta.json")),
        );
        assert!(matches!(
            result,
            Err(CliError::Calibration(CalibrationError::BracketingFailure { .. }))
        ));
    }
}
