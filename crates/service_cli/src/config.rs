//! CLI configuration management.
//!
//! Loads `tbsim.toml` (or the file given with `--config`), applies environment
//! variable overrides and validates the result. A missing file yields the
//! defaults.
//!
//! ```toml
//! log_level = "info"
//! horizon_years = 10
//! underreporting = 1.0
//!
//! [parameters]
//! detection_rate = 0.75
//! tpt_coverage = 0.15
//!
//! [calibration]
//! tolerance = 1.0
//! max_simulations = 60
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tbsim_models::calibration::{
    CalibrationBudget, CalibrationConfig, DEFAULT_BETA_HIGH, DEFAULT_BETA_LOW,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, DEFAULT_UPPER_EXPANSION,
};
use tbsim_models::parameters::ParameterSet;
use thiserror::Error;

/// Environment variable overriding `log_level`.
pub const ENV_LOG_LEVEL: &str = "TBSIM_LOG_LEVEL";
/// Environment variable overriding `horizon_years`.
pub const ENV_HORIZON_YEARS: &str = "TBSIM_HORIZON_YEARS";
/// Environment variable overriding `underreporting`.
pub const ENV_UNDERREPORTING: &str = "TBSIM_UNDERREPORTING";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// `[calibration]` table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationSection {
    /// Accepted `|incidence - target|`, in cases
    pub tolerance: f64,
    /// Lower β bound
    pub beta_low: f64,
    /// Upper β bound before expansion
    pub beta_high: f64,
    /// Bisection iteration limit
    pub max_iterations: usize,
    /// Factors applied in turn to `beta_high` while unbracketed
    pub upper_expansion: Vec<f64>,
    /// Simulation budget per calibration
    pub max_simulations: Option<usize>,
    /// Wall-time budget per calibration, in seconds
    pub max_seconds: Option<f64>,
}

impl Default for CalibrationSection {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            beta_low: DEFAULT_BETA_LOW,
            beta_high: DEFAULT_BETA_HIGH,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            upper_expansion: DEFAULT_UPPER_EXPANSION.to_vec(),
            max_simulations: None,
            max_seconds: None,
        }
    }
}

impl CalibrationSection {
    /// Model-side calibration settings.
    ///
    /// A `max_seconds` that is not a valid duration is dropped here and reported
    /// by [`CliConfig::validate`].
    pub fn to_config(&self) -> CalibrationConfig {
        CalibrationConfig::default()
            .with_tolerance(self.tolerance)
            .with_bounds(self.beta_low, self.beta_high)
            .with_max_iterations(self.max_iterations)
            .with_upper_expansion(self.upper_expansion.iter().copied())
            .with_budget(CalibrationBudget {
                max_simulations: self.max_simulations,
                max_duration: self
                    .max_seconds
                    .and_then(|s| Duration::try_from_secs_f64(s).ok()),
            })
    }
}

/// CLI configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default simulation horizon in years
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,

    /// Default multiplier from notified cases to true incidence
    #[serde(default = "default_underreporting")]
    pub underreporting: f64,

    /// Parameter values merged over the model defaults
    #[serde(default)]
    pub parameters: ParameterSet,

    /// Calibration settings
    #[serde(default)]
    pub calibration: CalibrationSection,

    /// Environment values that could not be parsed
    #[serde(skip)]
    rejected_env: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_horizon_years() -> u32 {
    10
}

fn default_underreporting() -> f64 {
    1.0
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            horizon_years: default_horizon_years(),
            underreporting: default_underreporting(),
            parameters: ParameterSet::default(),
            calibration: CalibrationSection::default(),
            rejected_env: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`, or return the defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides
    pub fn with_env_override(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        if let Some(years) = lookup(ENV_HORIZON_YEARS) {
            match years.trim().parse() {
                Ok(years) => self.horizon_years = years,
                Err(_) => self
                    .rejected_env
                    .push(format!("{}='{}' is not a whole number of years", ENV_HORIZON_YEARS, years)),
            }
        }

        if let Some(multiplier) = lookup(ENV_UNDERREPORTING) {
            match multiplier.trim().parse() {
                Ok(multiplier) => self.underreporting = multiplier,
                Err(_) => self
                    .rejected_env
                    .push(format!("{}='{}' is not a number", ENV_UNDERREPORTING, multiplier)),
            }
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.rejected_env.clone();

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, VALID_LOG_LEVELS
            ));
        }

        if self.horizon_years == 0 {
            errors.push("horizon_years must be greater than 0".to_string());
        }

        if !(self.underreporting.is_finite() && self.underreporting > 0.0) {
            errors.push(format!(
                "underreporting must be finite and > 0, got {}",
                self.underreporting
            ));
        }

        if let Err(e) = self.parameters.validate() {
            errors.push(format!("[parameters] {}", e));
        }

        if let Err(e) = self.calibration.to_config().validate() {
            errors.push(format!("[calibration] {}", e));
        }

        if let Some(seconds) = self.calibration.max_seconds {
            if Duration::try_from_secs_f64(seconds).is_err() {
                errors.push(format!(
                    "[calibration] max_seconds must be a finite number of seconds >= 0, got {}",
                    seconds
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Configuration error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(String),
    /// Parse error in config file
    #[error("Parse error: {0}")]
    Parse(String),
    /// Validation errors
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
