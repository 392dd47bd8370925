//! Simulate command implementation
//!
//! Runs the compartment model for one population at a fixed β.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tbsim_models::simulation::Simulator;
use tbsim_models::DEFAULT_BETA;
use tracing::info;

use super::{open_output, resolve_parameters};
use crate::config::CliConfig;
use crate::output::{self, OutputFormat};
use crate::{CliError, Result};

/// Arguments for `tbsim simulate`
#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Population size
    #[arg(short, long)]
    pub population: u64,

    /// Annual transmission coefficient
    #[arg(short, long, default_value_t = DEFAULT_BETA)]
    pub beta: f64,

    /// Horizon in years (defaults to the configured horizon)
    #[arg(short, long)]
    pub years: Option<u32>,

    /// Parameter override, repeatable (e.g. --set detection_rate=0.9)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Include monthly compartment values
    #[arg(long)]
    pub monthly: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the simulate command
pub fn run(config: &CliConfig, args: &SimulateArgs) -> Result<()> {
    let params = resolve_parameters(config, &args.overrides)?;
    let years = args.years.unwrap_or(config.horizon_years);

    if !(args.beta.is_finite() && args.beta >= 0.0) {
        return Err(CliError::invalid_argument(format!(
            "beta must be finite and >= 0, got {}",
            args.beta
        )));
    }

    info!(
        beta = args.beta,
        population = args.population,
        years,
        "running simulation"
    );
    let series = Simulator::new(params).run(args.beta, years, args.population)?;

    let mut out = open_output(args.output.as_deref())?;
    output::write_simulation(&mut out, &series, args.format, args.monthly)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(population: u64, output: PathBuf) -> SimulateArgs {
        SimulateArgs {
            population,
            beta: DEFAULT_BETA,
            years: Some(2),
            overrides: Vec::new(),
            monthly: false,
            format: OutputFormat::Csv,
            output: Some(output),
        }
    }

    #[test]
    fn test_simulate_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.csv");

        run(&CliConfig::default(), &args(1_000_000, path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("1,2442.15"));
    }

    #[test]
    fn test_simulate_rejects_zero_population() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(&CliConfig::default(), &args(0, dir.path().join("sim.csv")));
        assert!(matches!(result, Err(CliError::Model(_))));
    }

    #[test]
    fn test_simulate_rejects_negative_beta() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(1000, dir.path().join("sim.csv"));
        args.beta = -1.0;
        assert!(matches!(
            run(&CliConfig::default(), &args),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
