//! Model parameters.
//!
//! [`ParameterSet`] is an immutable value holding every programme and
//! epidemiological knob of the model. It is built from the documented defaults
//! and changed only through [`ParameterSet::merge`] or [`ParameterSet::with`],
//! both of which return a new set and leave keys that were not supplied at their
//! previous value.
//!
//! ## Default Table
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `contact_rate_multiplier` | 1.0 | Scales the transmission coefficient |
//! | `prop_resistant` | 0.025 | Share of infections and progressions that are drug-resistant |
//! | `sigma` | 0.10 | Annual latent activation rate |
//! | `hiv_prevalence` | 0.02 | HIV-positive share of the latent pool |
//! | `hiv_progression_multiplier` | 5.0 | Progression multiplier for HIV-positive people |
//! | `detection_rate` | 0.70 | Annual detection probability |
//! | `diagnostic_delay_months` | 2.0 | Reporting lag dividing the detection hazard |
//! | `private_sector_fraction` | 0.40 | Share of care sought in the private sector |
//! | `private_notify_frac` | 0.50 | Share of private-sector diagnoses that are notified |
//! | `treatment_initiation_rate` | 0.95 | Annual probability of starting treatment once notified |
//! | `treatment_success_s` / `_r` | 0.89 / 0.87 | Treatment success, susceptible / resistant |
//! | `treatment_duration_months_s` / `_r` | 6 / 9 | Treatment duration in months |
//! | `relapse_rate` | 0.02 | Annual relapse probability after recovery |
//! | `natural_death_rate` | 0.007 | Annual background mortality |
//! | `tb_death_rate_s` / `_r` | 0.05 / 0.12 | Annual disease mortality |
//! | `tpt_coverage` / `tpt_efficacy` | 0.05 / 0.65 | Preventive therapy programme |
//! | `vaccine_coverage` / `vaccine_efficacy` | 0.0 / 0.0 | Vaccination programme |
//! | `malnut_fraction` / `malnut_multiplier` | 0.20 / 1.5 | Malnourished share and its progression multiplier |
//! | `ltfu_rate` | 0.05 | Loss to follow-up during treatment |
//! | `stockout_frac` | 0.0 | Fraction of time with drug stockouts |
//!
//! Preventive therapy is carried for reporting and programme rules; it does not
//! enter the monthly transition.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tbsim_core::types::ConfigurationError;

/// Name of every model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ParameterKey {
    /// Scales the transmission coefficient
    ContactRateMultiplier,
    /// Drug-resistant share of infections and progressions
    PropResistant,
    /// Annual latent activation rate
    Sigma,
    /// HIV prevalence
    HivPrevalence,
    /// Progression multiplier for HIV-positive people
    HivProgressionMultiplier,
    /// Annual detection probability
    DetectionRate,
    /// Diagnostic delay in months
    DiagnosticDelayMonths,
    /// Private-sector share of care seeking
    PrivateSectorFraction,
    /// Notified share of private-sector diagnoses
    PrivateNotifyFrac,
    /// Annual probability of treatment initiation
    TreatmentInitiationRate,
    /// Treatment success, drug-susceptible
    TreatmentSuccessS,
    /// Treatment success, drug-resistant
    TreatmentSuccessR,
    /// Treatment duration in months, drug-susceptible
    TreatmentDurationMonthsS,
    /// Treatment duration in months, drug-resistant
    TreatmentDurationMonthsR,
    /// Annual relapse probability
    RelapseRate,
    /// Annual background mortality
    NaturalDeathRate,
    /// Annual disease mortality, drug-susceptible
    TbDeathRateS,
    /// Annual disease mortality, drug-resistant
    TbDeathRateR,
    /// Preventive therapy coverage
    TptCoverage,
    /// Preventive therapy efficacy
    TptEfficacy,
    /// Vaccine coverage
    VaccineCoverage,
    /// Vaccine efficacy
    VaccineEfficacy,
    /// Malnourished share of the population
    MalnutFraction,
    /// Progression multiplier for malnourished people
    MalnutMultiplier,
    /// Loss to follow-up during treatment
    LtfuRate,
    /// Fraction of time with drug stockouts
    StockoutFrac,
}

/// Value domain a parameter must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDomain {
    /// Closed unit interval `[0, 1]`
    Fraction,
    /// Half-open unit interval `[0, 1)`; annual probabilities converted to hazards
    Rate,
    /// Finite and `>= 0`
    NonNegative,
    /// Finite and `> 0`
    Positive,
}

impl ParameterDomain {
    fn contains(self, value: f64) -> bool {
        match self {
            ParameterDomain::Fraction => (0.0..=1.0).contains(&value),
            ParameterDomain::Rate => (0.0..1.0).contains(&value),
            ParameterDomain::NonNegative => value.is_finite() && value >= 0.0,
            ParameterDomain::Positive => value.is_finite() && value > 0.0,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ParameterDomain::Fraction => "must lie in [0, 1]",
            ParameterDomain::Rate => "must lie in [0, 1)",
            ParameterDomain::NonNegative => "must be finite and >= 0",
            ParameterDomain::Positive => "must be finite and > 0",
        }
    }
}

impl ParameterKey {
    /// Every key, in table order.
    pub const ALL: [ParameterKey; 26] = [
        ParameterKey::ContactRateMultiplier,
        ParameterKey::PropResistant,
        ParameterKey::Sigma,
        ParameterKey::HivPrevalence,
        ParameterKey::HivProgressionMultiplier,
        ParameterKey::DetectionRate,
        ParameterKey::DiagnosticDelayMonths,
        ParameterKey::PrivateSectorFraction,
        ParameterKey::PrivateNotifyFrac,
        ParameterKey::TreatmentInitiationRate,
        ParameterKey::TreatmentSuccessS,
        ParameterKey::TreatmentSuccessR,
        ParameterKey::TreatmentDurationMonthsS,
        ParameterKey::TreatmentDurationMonthsR,
        ParameterKey::RelapseRate,
        ParameterKey::NaturalDeathRate,
        ParameterKey::TbDeathRateS,
        ParameterKey::TbDeathRateR,
        ParameterKey::TptCoverage,
        ParameterKey::TptEfficacy,
        ParameterKey::VaccineCoverage,
        ParameterKey::VaccineEfficacy,
        ParameterKey::MalnutFraction,
        ParameterKey::MalnutMultiplier,
        ParameterKey::LtfuRate,
        ParameterKey::StockoutFrac,
    ];

    /// Snake-case name used in configuration files and override maps.
    pub fn name(self) -> &'static str {
        match self {
            ParameterKey::ContactRateMultiplier => "contact_rate_multiplier",
            ParameterKey::PropResistant => "prop_resistant",
            ParameterKey::Sigma => "sigma",
            ParameterKey::HivPrevalence => "hiv_prevalence",
            ParameterKey::HivProgressionMultiplier => "hiv_progression_multiplier",
            ParameterKey::DetectionRate => "detection_rate",
            ParameterKey::DiagnosticDelayMonths => "diagnostic_delay_months",
            ParameterKey::PrivateSectorFraction => "private_sector_fraction",
            ParameterKey::PrivateNotifyFrac => "private_notify_frac",
            ParameterKey::TreatmentInitiationRate => "treatment_initiation_rate",
            ParameterKey::TreatmentSuccessS => "treatment_success_s",
            ParameterKey::TreatmentSuccessR => "treatment_success_r",
            ParameterKey::TreatmentDurationMonthsS => "treatment_duration_months_s",
            ParameterKey::TreatmentDurationMonthsR => "treatment_duration_months_r",
            ParameterKey::RelapseRate => "relapse_rate",
            ParameterKey::NaturalDeathRate => "natural_death_rate",
            ParameterKey::TbDeathRateS => "tb_death_rate_s",
            ParameterKey::TbDeathRateR => "tb_death_rate_r",
            ParameterKey::TptCoverage => "tpt_coverage",
            ParameterKey::TptEfficacy => "tpt_efficacy",
            ParameterKey::VaccineCoverage => "vaccine_coverage",
            ParameterKey::VaccineEfficacy => "vaccine_efficacy",
            ParameterKey::MalnutFraction => "malnut_fraction",
            ParameterKey::MalnutMultiplier => "malnut_multiplier",
            ParameterKey::LtfuRate => "ltfu_rate",
            ParameterKey::StockoutFrac => "stockout_frac",
        }
    }

    /// One-line human description.
    pub fn description(self) -> &'static str {
        match self {
            ParameterKey::ContactRateMultiplier => "Multiplier on the transmission coefficient",
            ParameterKey::PropResistant => "Drug-resistant share of infections and progressions",
            ParameterKey::Sigma => "Annual latent-to-active progression rate",
            ParameterKey::HivPrevalence => "HIV prevalence (fraction)",
            ParameterKey::HivProgressionMultiplier => "Progression multiplier with HIV",
            ParameterKey::DetectionRate => "Annual case detection probability",
            ParameterKey::DiagnosticDelayMonths => "Diagnostic delay (months)",
            ParameterKey::PrivateSectorFraction => "Private sector initial care fraction",
            ParameterKey::PrivateNotifyFrac => "Private sector notification fraction",
            ParameterKey::TreatmentInitiationRate => "Annual treatment initiation probability",
            ParameterKey::TreatmentSuccessS => "Treatment success (DS-TB)",
            ParameterKey::TreatmentSuccessR => "Treatment success (DR-TB)",
            ParameterKey::TreatmentDurationMonthsS => "Treatment duration in months (DS-TB)",
            ParameterKey::TreatmentDurationMonthsR => "Treatment duration in months (DR-TB)",
            ParameterKey::RelapseRate => "Annual relapse probability after cure",
            ParameterKey::NaturalDeathRate => "Annual background mortality",
            ParameterKey::TbDeathRateS => "Annual TB mortality (DS-TB)",
            ParameterKey::TbDeathRateR => "Annual TB mortality (DR-TB)",
            ParameterKey::TptCoverage => "TB preventive therapy coverage",
            ParameterKey::TptEfficacy => "TB preventive therapy efficacy",
            ParameterKey::VaccineCoverage => "Vaccine coverage",
            ParameterKey::VaccineEfficacy => "Vaccine efficacy against infection",
            ParameterKey::MalnutFraction => "Malnourished population fraction",
            ParameterKey::MalnutMultiplier => "Progression multiplier with malnutrition",
            ParameterKey::LtfuRate => "Loss to follow-up during treatment",
            ParameterKey::StockoutFrac => "Fraction of time with drug stockouts",
        }
    }

    /// Domain enforced by [`ParameterSet::validate`].
    pub fn domain(self) -> ParameterDomain {
        match self {
            ParameterKey::PropResistant
            | ParameterKey::DetectionRate
            | ParameterKey::TreatmentInitiationRate
            | ParameterKey::RelapseRate
            | ParameterKey::NaturalDeathRate
            | ParameterKey::TbDeathRateS
            | ParameterKey::TbDeathRateR => ParameterDomain::Rate,
            ParameterKey::ContactRateMultiplier
            | ParameterKey::Sigma
            | ParameterKey::HivProgressionMultiplier
            | ParameterKey::DiagnosticDelayMonths
            | ParameterKey::MalnutMultiplier => ParameterDomain::NonNegative,
            ParameterKey::TreatmentDurationMonthsS | ParameterKey::TreatmentDurationMonthsR => {
                ParameterDomain::Positive
            }
            _ => ParameterDomain::Fraction,
        }
    }

    /// Documented default value.
    pub fn default_value(self) -> f64 {
        DEFAULT_PARAMETERS.get(self)
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterKey {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ParameterKey::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigurationError::UnknownParameter(wanted.to_string()))
    }
}

/// How [`ParameterOverrides::from_named`] treats names that match no key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeyPolicy {
    /// Fail with [`ConfigurationError::UnknownParameter`].
    #[default]
    Reject,
    /// Skip the entry.
    Ignore,
}

/// A partial mapping from parameter keys to values.
///
/// # Example
///
/// ```
/// use tbsim_models::parameters::{ParameterKey, ParameterOverrides, ParameterSet, UnknownKeyPolicy};
///
/// let overrides = ParameterOverrides::from_named(
///     [("detection_rate", 0.75), ("tpt_coverage", 0.15)],
///     UnknownKeyPolicy::Reject,
/// )
/// .unwrap();
///
/// let params = ParameterSet::default().merge(&overrides);
/// assert_eq!(params.get(ParameterKey::DetectionRate), 0.75);
/// assert_eq!(params.get(ParameterKey::Sigma), 0.10); // untouched
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterOverrides {
    values: BTreeMap<ParameterKey, f64>,
}

impl ParameterOverrides {
    /// Create an empty override map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build overrides from `(name, value)` pairs.
    ///
    /// Later duplicates win.
    pub fn from_named<I, S>(pairs: I, policy: UnknownKeyPolicy) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut overrides = Self::new();
        for (name, value) in pairs {
            match name.as_ref().parse::<ParameterKey>() {
                Ok(key) => overrides.insert(key, value),
                Err(err) => match policy {
                    UnknownKeyPolicy::Reject => return Err(err),
                    UnknownKeyPolicy::Ignore => {
                        tracing::debug!(name = name.as_ref(), "ignoring unknown parameter override");
                    }
                },
            }
        }
        Ok(overrides)
    }

    /// Builder-style insert.
    pub fn set(mut self, key: ParameterKey, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace one value.
    pub fn insert(&mut self, key: ParameterKey, value: f64) {
        self.values.insert(key, value);
    }

    /// Value supplied for `key`, if any.
    pub fn get(&self, key: ParameterKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Number of supplied keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Supplied entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterKey, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(ParameterKey, f64)> for ParameterOverrides {
    fn from_iter<I: IntoIterator<Item = (ParameterKey, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Documented defaults for every parameter.
pub const DEFAULT_PARAMETERS: ParameterSet = ParameterSet {
    contact_rate_multiplier: 1.0,
    prop_resistant: 0.025,
    sigma: 0.10,
    hiv_prevalence: 0.02,
    hiv_progression_multiplier: 5.0,
    detection_rate: 0.70,
    diagnostic_delay_months: 2.0,
    private_sector_fraction: 0.40,
    private_notify_frac: 0.50,
    treatment_initiation_rate: 0.95,
    treatment_success_s: 0.89,
    treatment_success_r: 0.87,
    treatment_duration_months_s: 6.0,
    treatment_duration_months_r: 9.0,
    relapse_rate: 0.02,
    natural_death_rate: 0.007,
    tb_death_rate_s: 0.05,
    tb_death_rate_r: 0.12,
    tpt_coverage: 0.05,
    tpt_efficacy: 0.65,
    vaccine_coverage: 0.0,
    vaccine_efficacy: 0.0,
    malnut_fraction: 0.20,
    malnut_multiplier: 1.5,
    ltfu_rate: 0.05,
    stockout_frac: 0.0,
};

/// Complete, immutable set of model parameters.
///
/// Fields are only readable through [`ParameterSet::get`]; new sets are derived
/// with [`ParameterSet::merge`] and [`ParameterSet::with`]. With the `serde`
/// feature a partial table deserialises over the defaults and unknown fields are
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct ParameterSet {
    pub(crate) contact_rate_multiplier: f64,
    pub(crate) prop_resistant: f64,
    pub(crate) sigma: f64,
    pub(crate) hiv_prevalence: f64,
    pub(crate) hiv_progression_multiplier: f64,
    pub(crate) detection_rate: f64,
    pub(crate) diagnostic_delay_months: f64,
    pub(crate) private_sector_fraction: f64,
    pub(crate) private_notify_frac: f64,
    pub(crate) treatment_initiation_rate: f64,
    pub(crate) treatment_success_s: f64,
    pub(crate) treatment_success_r: f64,
    pub(crate) treatment_duration_months_s: f64,
    pub(crate) treatment_duration_months_r: f64,
    pub(crate) relapse_rate: f64,
    pub(crate) natural_death_rate: f64,
    pub(crate) tb_death_rate_s: f64,
    pub(crate) tb_death_rate_r: f64,
    pub(crate) tpt_coverage: f64,
    pub(crate) tpt_efficacy: f64,
    pub(crate) vaccine_coverage: f64,
    pub(crate) vaccine_efficacy: f64,
    pub(crate) malnut_fraction: f64,
    pub(crate) malnut_multiplier: f64,
    pub(crate) ltfu_rate: f64,
    pub(crate) stockout_frac: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        DEFAULT_PARAMETERS
    }
}

impl ParameterSet {
    /// Value of one parameter.
    pub fn get(&self, key: ParameterKey) -> f64 {
        match key {
            ParameterKey::ContactRateMultiplier => self.contact_rate_multiplier,
            ParameterKey::PropResistant => self.prop_resistant,
            ParameterKey::Sigma => self.sigma,
            ParameterKey::HivPrevalence => self.hiv_prevalence,
            ParameterKey::HivProgressionMultiplier => self.hiv_progression_multiplier,
            ParameterKey::DetectionRate => self.detection_rate,
            ParameterKey::DiagnosticDelayMonths => self.diagnostic_delay_months,
            ParameterKey::PrivateSectorFraction => self.private_sector_fraction,
            ParameterKey::PrivateNotifyFrac => self.private_notify_frac,
            ParameterKey::TreatmentInitiationRate => self.treatment_initiation_rate,
            ParameterKey::TreatmentSuccessS => self.treatment_success_s,
            ParameterKey::TreatmentSuccessR => self.treatment_success_r,
            ParameterKey::TreatmentDurationMonthsS => self.treatment_duration_months_s,
            ParameterKey::TreatmentDurationMonthsR => self.treatment_duration_months_r,
            ParameterKey::RelapseRate => self.relapse_rate,
            ParameterKey::NaturalDeathRate => self.natural_death_rate,
            ParameterKey::TbDeathRateS => self.tb_death_rate_s,
            ParameterKey::TbDeathRateR => self.tb_death_rate_r,
            ParameterKey::TptCoverage => self.tpt_coverage,
            ParameterKey::TptEfficacy => self.tpt_efficacy,
            ParameterKey::VaccineCoverage => self.vaccine_coverage,
            ParameterKey::VaccineEfficacy => self.vaccine_efficacy,
            ParameterKey::MalnutFraction => self.malnut_fraction,
            ParameterKey::MalnutMultiplier => self.malnut_multiplier,
            ParameterKey::LtfuRate => self.ltfu_rate,
            ParameterKey::StockoutFrac => self.stockout_frac,
        }
    }

    fn slot(&mut self, key: ParameterKey) -> &mut f64 {
        match key {
            ParameterKey::ContactRateMultiplier => &mut self.contact_rate_multiplier,
            ParameterKey::PropResistant => &mut self.prop_resistant,
            ParameterKey::Sigma => &mut self.sigma,
            ParameterKey::HivPrevalence => &mut self.hiv_prevalence,
            ParameterKey::HivProgressionMultiplier => &mut self.hiv_progression_multiplier,
            ParameterKey::DetectionRate => &mut self.detection_rate,
            ParameterKey::DiagnosticDelayMonths => &mut self.diagnostic_delay_months,
            ParameterKey::PrivateSectorFraction => &mut self.private_sector_fraction,
            ParameterKey::PrivateNotifyFrac => &mut self.private_notify_frac,
            ParameterKey::TreatmentInitiationRate => &mut self.treatment_initiation_rate,
            ParameterKey::TreatmentSuccessS => &mut self.treatment_success_s,
            ParameterKey::TreatmentSuccessR => &mut self.treatment_success_r,
            ParameterKey::TreatmentDurationMonthsS => &mut self.treatment_duration_months_s,
            ParameterKey::TreatmentDurationMonthsR => &mut self.treatment_duration_months_r,
            ParameterKey::RelapseRate => &mut self.relapse_rate,
            ParameterKey::NaturalDeathRate => &mut self.natural_death_rate,
            ParameterKey::TbDeathRateS => &mut self.tb_death_rate_s,
            ParameterKey::TbDeathRateR => &mut self.tb_death_rate_r,
            ParameterKey::TptCoverage => &mut self.tpt_coverage,
            ParameterKey::TptEfficacy => &mut self.tpt_efficacy,
            ParameterKey::VaccineCoverage => &mut self.vaccine_coverage,
            ParameterKey::VaccineEfficacy => &mut self.vaccine_efficacy,
            ParameterKey::MalnutFraction => &mut self.malnut_fraction,
            ParameterKey::MalnutMultiplier => &mut self.malnut_multiplier,
            ParameterKey::LtfuRate => &mut self.ltfu_rate,
            ParameterKey::StockoutFrac => &mut self.stockout_frac,
        }
    }

    /// New set with one key replaced.
    pub fn with(mut self, key: ParameterKey, value: f64) -> Self {
        *self.slot(key) = value;
        self
    }

    /// New set with every supplied override applied over `self`.
    ///
    /// Keys absent from `overrides` keep their current value.
    pub fn merge(&self, overrides: &ParameterOverrides) -> Self {
        overrides
            .iter()
            .fold(*self, |params, (key, value)| params.with(key, value))
    }

    /// Check every parameter against its [`ParameterDomain`].
    ///
    /// # Errors
    ///
    /// The first violation found, in table order: [`ConfigurationError::RateOutOfRange`]
    /// for rate-domain keys, [`ConfigurationError::InvalidValue`] otherwise.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for key in ParameterKey::ALL {
            let value = self.get(key);
            let domain = key.domain();
            if domain.contains(value) {
                continue;
            }
            return Err(match domain {
                ParameterDomain::Rate => ConfigurationError::rate_out_of_range(key.name(), value),
                _ => ConfigurationError::invalid_value(key.name(), value, domain.describe()),
            });
        }
        Ok(())
    }

    /// `(key, value)` pairs in table order.
    pub fn entries(&self) -> impl Iterator<Item = (ParameterKey, f64)> + '_ {
        ParameterKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Multiplier applied to the latent activation hazard by malnutrition.
    ///
    /// `(1 - malnut_fraction) + malnut_fraction * malnut_multiplier`
    pub fn malnutrition_factor(&self) -> f64 {
        (1.0 - self.malnut_fraction) + self.malnut_fraction * self.malnut_multiplier
    }

    /// Share of detected cases that reach the notified pathway.
    ///
    /// `(1 - private_sector_fraction) + private_sector_fraction * private_notify_frac`
    pub fn notification_fraction(&self) -> f64 {
        (1.0 - self.private_sector_fraction) + self.private_sector_fraction * self.private_notify_frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_validate() {
        assert!(ParameterSet::default().validate().is_ok());
    }

    #[test]
    fn test_all_keys_unique_names() {
        let mut names: Vec<_> = ParameterKey::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ParameterKey::ALL.len());
    }

    #[test]
    fn test_name_round_trip() {
        for key in ParameterKey::ALL {
            assert_eq!(key.name().parse::<ParameterKey>().unwrap(), key);
            assert_eq!(key.to_string(), key.name());
        }
        assert_eq!(
            " Detection_Rate ".parse::<ParameterKey>().unwrap(),
            ParameterKey::DetectionRate
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        match "beta_multiplier".parse::<ParameterKey>() {
            Err(ConfigurationError::UnknownParameter(name)) => assert_eq!(name, "beta_multiplier"),
            other => panic!("Expected UnknownParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_default_values_match_table() {
        assert_eq!(ParameterKey::PropResistant.default_value(), 0.025);
        assert_eq!(ParameterKey::Sigma.default_value(), 0.10);
        assert_eq!(ParameterKey::HivProgressionMultiplier.default_value(), 5.0);
        assert_eq!(ParameterKey::TreatmentDurationMonthsR.default_value(), 9.0);
        assert_eq!(ParameterKey::TbDeathRateR.default_value(), 0.12);
        assert_eq!(ParameterKey::StockoutFrac.default_value(), 0.0);
    }

    // ========================================
    // Merge Semantics
    // ========================================

    #[test]
    fn test_merge_fills_only_given_keys() {
        let overrides = ParameterOverrides::new()
            .set(ParameterKey::DetectionRate, 0.8)
            .set(ParameterKey::MalnutFraction, 0.25);
        let merged = ParameterSet::default().merge(&overrides);

        for (key, value) in merged.entries() {
            match key {
                ParameterKey::DetectionRate => assert_eq!(value, 0.8),
                ParameterKey::MalnutFraction => assert_eq!(value, 0.25),
                _ => assert_eq!(value, key.default_value(), "{} changed", key),
            }
        }
    }

    #[test]
    fn test_merge_over_non_default_base() {
        let base = ParameterSet::default().with(ParameterKey::Sigma, 0.2);
        let merged = base.merge(&ParameterOverrides::new().set(ParameterKey::LtfuRate, 0.1));
        assert_eq!(merged.get(ParameterKey::Sigma), 0.2);
        assert_eq!(merged.get(ParameterKey::LtfuRate), 0.1);
    }

    #[test]
    fn test_merge_leaves_source_untouched() {
        let base = ParameterSet::default();
        let _ = base.merge(&ParameterOverrides::new().set(ParameterKey::Sigma, 0.3));
        assert_eq!(base, DEFAULT_PARAMETERS);
    }

    #[test]
    fn test_empty_merge_is_identity() {
        let base = ParameterSet::default().with(ParameterKey::HivPrevalence, 0.1);
        assert_eq!(base.merge(&ParameterOverrides::new()), base);
    }

    #[test]
    fn test_from_named_policies() {
        let pairs = [("sigma", 0.2), ("not_a_key", 1.0)];

        let rejected = ParameterOverrides::from_named(pairs, UnknownKeyPolicy::Reject);
        assert!(matches!(
            rejected,
            Err(ConfigurationError::UnknownParameter(_))
        ));

        let ignored = ParameterOverrides::from_named(pairs, UnknownKeyPolicy::Ignore).unwrap();
        assert_eq!(ignored.len(), 1);
        assert_eq!(ignored.get(ParameterKey::Sigma), Some(0.2));
    }

    #[test]
    fn test_from_named_last_duplicate_wins() {
        let overrides = ParameterOverrides::from_named(
            vec![("sigma".to_string(), 0.2), ("sigma".to_string(), 0.3)],
            UnknownKeyPolicy::Reject,
        )
        .unwrap();
        assert_eq!(overrides.get(ParameterKey::Sigma), Some(0.3));
    }

    // ========================================
    // Validation
    // ========================================

    #[test]
    fn test_rate_domain_violation() {
        let params = ParameterSet::default().with(ParameterKey::DetectionRate, 1.0);
        match params.validate() {
            Err(ConfigurationError::RateOutOfRange { name, value }) => {
                assert_eq!(name, "detection_rate");
                assert_eq!(value, 1.0);
            }
            other => panic!("Expected RateOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_fraction_domain_allows_one() {
        let params = ParameterSet::default()
            .with(ParameterKey::VaccineCoverage, 1.0)
            .with(ParameterKey::TreatmentSuccessS, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            (ParameterKey::MalnutFraction, 1.2),
            (ParameterKey::HivPrevalence, -0.1),
            (ParameterKey::TreatmentDurationMonthsS, 0.0),
            (ParameterKey::MalnutMultiplier, f64::INFINITY),
            (ParameterKey::Sigma, f64::NAN),
        ];
        for (key, value) in cases {
            let params = ParameterSet::default().with(key, value);
            match params.validate() {
                Err(ConfigurationError::InvalidValue { name, .. }) => assert_eq!(name, key.name()),
                other => panic!("Expected InvalidValue for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_prop_resistant_one_rejected() {
        let params = ParameterSet::default().with(ParameterKey::PropResistant, 1.0);
        assert!(params.validate().is_err());
    }

    // ========================================
    // Derived Quantities
    // ========================================

    #[test]
    fn test_default_malnutrition_factor() {
        assert_relative_eq!(ParameterSet::default().malnutrition_factor(), 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_default_notification_fraction() {
        assert_relative_eq!(ParameterSet::default().notification_fraction(), 0.8, epsilon = 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_merges_over_defaults() {
        let params: ParameterSet =
            serde_json::from_str(r#"{"detection_rate": 0.75, "tpt_coverage": 0.15}"#).unwrap();
        assert_eq!(params.get(ParameterKey::DetectionRate), 0.75);
        assert_eq!(params.get(ParameterKey::TptCoverage), 0.15);
        assert_eq!(params.get(ParameterKey::RelapseRate), 0.02);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_unknown_json_field_rejected() {
        let parsed: Result<ParameterSet, _> = serde_json::from_str(r#"{"beta": 4.0}"#);
        assert!(parsed.is_err());
    }
}
