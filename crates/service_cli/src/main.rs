//! tbsim - District Tuberculosis Modelling CLI
//!
//! Operational entry point for the tbsim model crates.
//!
//! # Commands
//!
//! - `tbsim simulate --population <n>` - Run the model at a fixed β
//! - `tbsim calibrate --population <n> --target <cases>` - Fit β to Year-1 incidence
//! - `tbsim districts --input <file.csv>` - Calibrate, simulate and advise per district
//! - `tbsim params` - Print the parameter table in force
//! - `tbsim check` - Validate configuration and run a smoke simulation
//!
//! # Architecture
//!
//! As the **S**ervice layer, this crate feeds populations, targets and
//! parameter overrides into `tbsim_models` and exports its outputs.

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;
mod recommendations;

pub use error::{CliError, Result};

use commands::calibrate::CalibrateArgs;
use commands::districts::DistrictsArgs;
use commands::params::ParamsArgs;
use commands::simulate::SimulateArgs;
use config::CliConfig;

/// District TB transmission and care-cascade model
#[derive(Parser)]
#[command(name = "tbsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "tbsim.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the model for one population at a fixed β
    Simulate(SimulateArgs),

    /// Calibrate β to a Year-1 incidence target
    Calibrate(CalibrateArgs),

    /// Calibrate and simulate every district in a CSV file
    Districts(DistrictsArgs),

    /// Print the parameter table
    Params(ParamsArgs),

    /// Check configuration and run a smoke simulation
    Check,
}

fn init_tracing(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load_or_default(Path::new(&cli.config))?.with_env_override();
    init_tracing(&config.log_level, cli.verbose);
    config.validate()?;
    debug!(config = %cli.config, "configuration loaded");

    match &cli.command {
        Commands::Simulate(args) => commands::simulate::run(&config, args)?,
        Commands::Calibrate(args) => commands::calibrate::run(&config, args)?,
        Commands::Districts(args) => commands::districts::run(&config, args)?,
        Commands::Params(args) => commands::params::run(&config, args)?,
        Commands::Check => commands::check::run(&config)?,
    }
    Ok(())
}
