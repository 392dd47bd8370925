//! Result writers for the `table`, `json` and `csv` output formats.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;
use tbsim_models::calibration::CalibrationResult;
use tbsim_models::compartments::Compartment;
use tbsim_models::districts::DistrictOutcome;
use tbsim_models::parameters::{ParameterKey, ParameterSet};
use tbsim_models::simulation::TimeSeries;

use crate::recommendations::{self, Recommendation};
use crate::Result;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminals
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values with a header row
    Csv,
}

// ========================================
// Simulation
// ========================================

/// Write yearly incidence, and the monthly compartments when `monthly` is set.
pub fn write_simulation<W: Write>(
    out: &mut W,
    series: &TimeSeries,
    format: OutputFormat,
    monthly: bool,
) -> Result<()> {
    let incidence = series.yearly_incidence();

    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "beta = {:.6}  population = {}  years = {}",
                series.beta(),
                series.population(),
                series.years()
            )?;
            writeln!(out, "{:>4}  {:>14}", "year", "incidence")?;
            for (year, cases) in incidence.iter().enumerate() {
                writeln!(out, "{:>4}  {:>14.2}", year + 1, cases)?;
            }
            let clamp = series.clamp_diagnostics();
            if !clamp.is_clean() {
                writeln!(
                    out,
                    "clamped {} values in {} months ({:.3} people absorbed)",
                    clamp.events, clamp.months_affected, clamp.absorbed_mass
                )?;
            }
            if monthly {
                writeln!(out)?;
                write!(out, "{:>5}", "month")?;
                for c in Compartment::ALL {
                    write!(out, "  {:>12}", c.label())?;
                }
                writeln!(out, "  {:>12}", "new_cases")?;
                for (month, (state, cases)) in
                    series.states().iter().zip(series.new_cases()).enumerate()
                {
                    write!(out, "{:>5}", month)?;
                    for (_, value) in state.iter() {
                        write!(out, "  {:>12.2}", value)?;
                    }
                    writeln!(out, "  {:>12.2}", cases)?;
                }
            }
        }
        OutputFormat::Json => {
            let clamp = series.clamp_diagnostics();
            let mut doc = json!({
                "beta": series.beta(),
                "population": series.population(),
                "years": series.years(),
                "yearly_incidence": incidence,
                "clamp": {
                    "events": clamp.events,
                    "months_affected": clamp.months_affected,
                    "absorbed_mass": clamp.absorbed_mass,
                },
            });
            if monthly {
                let months: Vec<_> = series
                    .states()
                    .iter()
                    .zip(series.new_cases())
                    .map(|(state, cases)| {
                        let mut row = serde_json::Map::new();
                        for c in Compartment::ALL {
                            row.insert(c.label().to_string(), json!(state[c]));
                        }
                        row.insert("new_cases".to_string(), json!(cases));
                        serde_json::Value::Object(row)
                    })
                    .collect();
                doc["monthly"] = serde_json::Value::Array(months);
            }
            serde_json::to_writer_pretty(&mut *out, &doc)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            if monthly {
                let mut header = vec!["month".to_string()];
                header.extend(Compartment::ALL.iter().map(|c| c.label().to_string()));
                header.push("new_cases".to_string());
                writer.write_record(&header)?;
                for (month, (state, cases)) in
                    series.states().iter().zip(series.new_cases()).enumerate()
                {
                    let mut record = vec![month.to_string()];
                    record.extend(state.iter().map(|(_, v)| v.to_string()));
                    record.push(cases.to_string());
                    writer.write_record(&record)?;
                }
            } else {
                writer.write_record(["year", "incidence"])?;
                for (year, cases) in incidence.iter().enumerate() {
                    writer.write_record([(year + 1).to_string(), cases.to_string()])?;
                }
            }
            writer.flush()?;
        }
    }
    Ok(())
}

// ========================================
// Calibration
// ========================================

#[derive(Debug, Serialize)]
struct CalibrationRow {
    target: f64,
    population: u64,
    beta: f64,
    year1_incidence: f64,
    residual: f64,
    iterations: usize,
    simulations: usize,
    search_upper: f64,
    converged: bool,
    seconds: f64,
}

impl CalibrationRow {
    fn new(result: &CalibrationResult, population: u64) -> Self {
        Self {
            target: result.target,
            population,
            beta: result.beta,
            year1_incidence: result.year1_incidence(),
            residual: result.residual,
            iterations: result.iterations,
            simulations: result.simulations,
            search_upper: result.search_upper,
            converged: result.converged,
            seconds: result.duration.as_secs_f64(),
        }
    }
}

/// Write one calibration result.
pub fn write_calibration<W: Write>(
    out: &mut W,
    result: &CalibrationResult,
    population: u64,
    format: OutputFormat,
) -> Result<()> {
    let row = CalibrationRow::new(result, population);

    match format {
        OutputFormat::Table => {
            writeln!(out, "target           {:.2}", row.target)?;
            writeln!(out, "population       {}", row.population)?;
            writeln!(out, "beta             {:.6}", row.beta)?;
            writeln!(out, "year1_incidence  {:.2}", row.year1_incidence)?;
            writeln!(out, "residual         {:+.4}", row.residual)?;
            writeln!(
                out,
                "iterations       {} ({} simulations)",
                row.iterations, row.simulations
            )?;
            writeln!(out, "search_upper     {}", row.search_upper)?;
            writeln!(out, "converged        {}", row.converged)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &row)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            writer.serialize(&row)?;
            writer.flush()?;
        }
    }
    Ok(())
}

// ========================================
// Districts
// ========================================

/// Flattened district result, one per output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictRow {
    /// District name
    pub district: String,
    /// Population size
    pub population: u64,
    /// Notified cases
    pub notified_cases: f64,
    /// Year-1 target
    pub target: f64,
    /// β used
    pub beta_used: f64,
    /// `calibrated`, `fallback` or `default`
    pub beta_source: String,
    /// Year-1 incidence
    pub year1_incidence: f64,
    /// Year-5 incidence
    pub year5_incidence: f64,
    /// Year-1 to Year-5 reduction in percent
    pub percent_reduction: f64,
    /// Calibration residual, when calibrated
    pub residual: Option<f64>,
    /// Reason for a fallback
    pub fallback_reason: Option<String>,
    /// Recommendations joined with `" || "`
    pub recommendations: String,
}

impl DistrictRow {
    /// Flatten an outcome together with its recommendations.
    pub fn new(outcome: &DistrictOutcome, recs: &[Recommendation]) -> Self {
        Self {
            district: outcome.district.clone(),
            population: outcome.population,
            notified_cases: outcome.notified_cases,
            target: outcome.target,
            beta_used: outcome.beta_used,
            beta_source: outcome.beta_source.as_str().to_string(),
            year1_incidence: outcome.year1_incidence,
            year5_incidence: outcome.year5_incidence,
            percent_reduction: outcome.percent_reduction,
            residual: outcome.calibration.as_ref().map(|c| c.residual),
            fallback_reason: outcome.fallback_reason.clone(),
            recommendations: recommendations::joined(recs),
        }
    }
}

/// Write district rows.
pub fn write_districts<W: Write>(out: &mut W, rows: &[DistrictRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "{:<20} {:>10} {:>10} {:>12} {:>11} {:>12} {:>12} {:>8}",
                "district", "population", "notified", "beta", "source", "year1", "year5", "reduc%"
            )?;
            for row in rows {
                writeln!(
                    out,
                    "{:<20} {:>10} {:>10.1} {:>12.6} {:>11} {:>12.2} {:>12.2} {:>8.1}",
                    row.district,
                    row.population,
                    row.notified_cases,
                    row.beta_used,
                    row.beta_source,
                    row.year1_incidence,
                    row.year5_incidence,
                    row.percent_reduction
                )?;
            }
            for row in rows {
                writeln!(out)?;
                writeln!(out, "{}:", row.district)?;
                for line in row.recommendations.split(recommendations::JOIN_SEPARATOR) {
                    writeln!(out, "  - {}", line)?;
                }
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

// ========================================
// Parameters
// ========================================

/// Write every parameter with its value, default and description.
pub fn write_parameters<W: Write>(out: &mut W, params: &ParameterSet, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{:<28} {:>10} {:>10}  {}", "parameter", "value", "default", "description")?;
            for (key, value) in params.entries() {
                writeln!(
                    out,
                    "{:<28} {:>10} {:>10}  {}",
                    key.name(),
                    value,
                    key.default_value(),
                    key.description()
                )?;
            }
        }
        OutputFormat::Json => {
            let map: serde_json::Map<_, _> = params
                .entries()
                .map(|(key, value)| (key.name().to_string(), json!(value)))
                .collect();
            serde_json::to_writer_pretty(&mut *out, &map)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            writer.write_record(["parameter", "value", "default", "description"])?;
            for (key, value) in params.entries() {
                writer.write_record([
                    key.name(),
                    value.to_string().as_str(),
                    key.default_value().to_string().as_str(),
                    key.description(),
                ])?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Keys whose value differs from the default.
pub fn changed_keys(params: &ParameterSet) -> Vec<ParameterKey> {
    params
        .entries()
        .filter(|(key, value)| *value != key.default_value())
        .map(|(key, _)| key)
        .collect()
}
