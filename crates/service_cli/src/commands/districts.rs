//! Districts command implementation
//!
//! Reads `district,population,notified_cases` rows from CSV, calibrates and
//! simulates each district, and writes one result row per district with its
//! recommendations.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use tbsim_models::districts::{DistrictInput, DistrictRunner};
use tracing::{info, warn};

use super::{open_output, resolve_parameters};
use crate::config::CliConfig;
use crate::output::{self, DistrictRow, OutputFormat};
use crate::recommendations;
use crate::{CliError, Result};

/// Arguments for `tbsim districts`
#[derive(Debug, Clone, Args)]
pub struct DistrictsArgs {
    /// CSV file with columns district, population, notified_cases
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Horizon in years (defaults to the configured horizon)
    #[arg(short, long)]
    pub years: Option<u32>,

    /// Underreporting multiplier (defaults to the configured value)
    #[arg(short, long)]
    pub underreporting: Option<f64>,

    /// Use the default β instead of calibrating each district
    #[arg(long)]
    pub no_calibrate: bool,

    /// Parameter override, repeatable (e.g. --set detection_rate=0.9)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

/// Read district inputs from a CSV file.
pub fn read_inputs(path: &Path) -> Result<Vec<DistrictInput>> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let inputs = reader
        .deserialize()
        .collect::<std::result::Result<Vec<DistrictInput>, _>>()?;
    Ok(inputs)
}

/// Model every district and build the output rows.
///
/// Districts with invalid inputs are logged and left out; the count of those
/// is returned alongside the rows.
pub fn model_districts(
    config: &CliConfig,
    args: &DistrictsArgs,
    inputs: &[DistrictInput],
) -> Result<(Vec<DistrictRow>, usize)> {
    let params = resolve_parameters(config, &args.overrides)?;
    let runner = DistrictRunner::new(params)
        .with_calibration(config.calibration.to_config())
        .with_years(args.years.unwrap_or(config.horizon_years))
        .with_underreporting(args.underreporting.unwrap_or(config.underreporting))
        .with_calibrate(!args.no_calibrate);

    let mut rows = Vec::with_capacity(inputs.len());
    let mut skipped = 0;
    for (input, outcome) in inputs.iter().zip(runner.run_all(inputs)) {
        match outcome {
            Ok(outcome) => {
                let recs = recommendations::recommend(
                    runner.params(),
                    outcome.year1_incidence,
                    outcome.year5_incidence,
                );
                rows.push(DistrictRow::new(&outcome, &recs));
            }
            Err(err) => {
                warn!(district = %input.district, error = %err, "district skipped");
                skipped += 1;
            }
        }
    }
    Ok((rows, skipped))
}

/// Run the districts command
pub fn run(config: &CliConfig, args: &DistrictsArgs) -> Result<()> {
    let inputs = read_inputs(&args.input)?;
    info!(districts = inputs.len(), input = %args.input.display(), "modelling districts");

    let (rows, skipped) = model_districts(config, args, &inputs)?;
    if rows.is_empty() && !inputs.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "no district in {} could be modelled",
            args.input.display()
        )));
    }

    let mut out = open_output(args.output.as_deref())?;
    output::write_districts(&mut out, &rows, args.format)?;
    out.flush()?;

    info!(modelled = rows.len(), skipped, "districts complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: PathBuf, output: Option<PathBuf>) -> DistrictsArgs {
        DistrictsArgs {
            input,
            output,
            years: Some(5),
            underreporting: None,
            no_calibrate: false,
            overrides: Vec::new(),
            format: OutputFormat::Csv,
        }
    }

    fn write_input(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("districts.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", body).unwrap();
        path
    }

    #[test]
    fn test_read_inputs_trims_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "district, population, notified_cases\nNorth, 500000, 1950\nSouth,250000,3000.5\n",
        );
        let inputs = read_inputs(&path).unwrap();
        assert_eq!(
            inputs,
            vec![
                DistrictInput::new("North", 500_000, 1950.0),
                DistrictInput::new("South", 250_000, 3000.5),
            ]
        );
    }

    #[test]
    fn test_read_inputs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_inputs(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }

    #[test]
    fn test_read_inputs_bad_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "district,population,notified_cases\nNorth,many,10\n");
        assert!(matches!(read_inputs(&path), Err(CliError::Csv(_))));
    }

    #[test]
    fn test_districts_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "district,population,notified_cases\nNorth,500000,1950\nSouth,500000,975\nEmpty,0,10\n",
        );
        let output_path = dir.path().join("results.csv");

        run(&CliConfig::default(), &args(input, Some(output_path.clone()))).unwrap();

        let mut reader = csv::Reader::from_path(&output_path).unwrap();
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(0), Some("North"));
        assert_eq!(records[0].get(5), Some("calibrated"));
        assert_eq!(records[1].get(0), Some("South"));
        assert_eq!(records[1].get(5), Some("fallback"));
        assert!(!records[1].get(10).unwrap().is_empty());
    }

    #[test]
    fn test_skip_calibration_uses_default_beta() {
        let args = DistrictsArgs {
            no_calibrate: true,
            ..args(PathBuf::new(), None)
        };
        let (rows, skipped) = model_districts(
            &CliConfig::default(),
            &args,
            &[DistrictInput::new("North", 1_000_000, 1950.0)],
        )
        .unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(rows[0].beta_source, "default");
        assert!((rows[0].year1_incidence - 2442.157).abs() < 1e-3);
    }

    #[test]
    fn test_all_districts_invalid_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "district,population,notified_cases\nEmpty,0,10\n");
        let result = run(&CliConfig::default(), &args(input, Some(dir.path().join("out.csv"))));
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
