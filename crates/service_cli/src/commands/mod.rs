//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod calibrate;
pub mod check;
pub mod districts;
pub mod params;
pub mod simulate;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tbsim_models::parameters::{ParameterOverrides, ParameterSet, UnknownKeyPolicy};

use crate::config::CliConfig;
use crate::{CliError, Result};

/// Parse `key=value` pairs given with `--set`.
pub fn parse_overrides(pairs: &[String]) -> Result<ParameterOverrides> {
    let named = pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                CliError::invalid_argument(format!("expected key=value, got '{}'", pair))
            })?;
            let value: f64 = value.trim().parse().map_err(|_| {
                CliError::invalid_argument(format!("'{}' is not a number in '{}'", value, pair))
            })?;
            Ok((key.trim().to_string(), value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParameterOverrides::from_named(named, UnknownKeyPolicy::Reject)?)
}

/// Configured parameters with `--set` overrides applied, validated.
pub fn resolve_parameters(config: &CliConfig, pairs: &[String]) -> Result<ParameterSet> {
    let params = config.parameters.merge(&parse_overrides(pairs)?);
    params.validate()?;
    Ok(params)
}

/// Buffered writer for `path`, or stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
