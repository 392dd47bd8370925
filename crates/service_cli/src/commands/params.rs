//! Params command implementation
//!
//! Prints the parameter table in force: defaults, then the configuration
//! file, then `--set` overrides.

use std::io::Write;

use clap::Args;

use super::{open_output, resolve_parameters};
use crate::config::CliConfig;
use crate::output::{self, OutputFormat};
use crate::Result;

/// Arguments for `tbsim params`
#[derive(Debug, Clone, Args)]
pub struct ParamsArgs {
    /// Show the built-in defaults, ignoring the configuration file
    #[arg(long)]
    pub defaults: bool,

    /// Parameter override, repeatable (e.g. --set detection_rate=0.9)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Run the params command
pub fn run(config: &CliConfig, args: &ParamsArgs) -> Result<()> {
    let params = if args.defaults {
        resolve_parameters(&CliConfig::default(), &args.overrides)?
    } else {
        resolve_parameters(config, &args.overrides)?
    };

    let mut out = open_output(None)?;
    output::write_parameters(&mut out, &params, args.format)?;
    out.flush()?;
    Ok(())
}
