//! Monthly transition of the compartment state.
//!
//! One call to [`CompartmentStepper::step`] moves the population forward by a
//! month. The flows, all evaluated on the state at month `m`:
//!
//! | Flow | From | To |
//! |------|------|----|
//! | infection | S, V | L |
//! | progression | L | Iu_s, Iu_r |
//! | detection (notified share) | Iu_* | Id_* |
//! | treatment initiation | Id_* | T* |
//! | treatment success | T* | R |
//! | treatment failure | Ts / Tr | Iu_s (10 % of Ts failures to Iu_r) / Iu_r |
//! | relapse | R | L |
//! | disease death | Iu_*, Id_* | removed |
//! | natural death | all | removed; S and V deaths replaced in place |
//!
//! Every compartment is then floored at zero.

use super::{ClampDiagnostics, Compartment, State};
use crate::parameters::ParameterSet;
use tbsim_core::math::hazard::{monthly_detection_hazard, monthly_hazard, monthly_share};
use tbsim_core::types::ConfigurationError;

/// Share of failed drug-susceptible treatment courses that return as resistant disease.
pub const FAIL_TO_RESISTANT: f64 = 0.10;

/// Added to the population total before dividing by it.
pub const POPULATION_EPSILON: f64 = 1e-9;

/// Upper bound on effective treatment success.
const MAX_EFFECTIVE_SUCCESS: f64 = 0.99;

/// Monthly quantities derived once per run from β and a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyRates {
    /// Transmission coefficient per month (`β/12 × contact_rate_multiplier`)
    pub beta: f64,
    /// Latent activation per month (`σ/12`)
    pub sigma: f64,
    /// Detection hazard, already divided by the diagnostic delay
    pub detection: f64,
    /// Treatment initiation hazard
    pub treatment_initiation: f64,
    /// Relapse hazard
    pub relapse: f64,
    /// Background mortality hazard
    pub natural_death: f64,
    /// Disease mortality hazard, drug-susceptible
    pub tb_death_s: f64,
    /// Disease mortality hazard, drug-resistant
    pub tb_death_r: f64,
    /// Drug-resistant share of infections and progressions
    pub prop_resistant: f64,
    /// Protection of the vaccinated against infection
    pub vaccine_efficacy: f64,
    /// Progression multiplier from malnutrition
    pub malnutrition_factor: f64,
    /// HIV prevalence
    pub hiv_prevalence: f64,
    /// Progression multiplier with HIV
    pub hiv_progression_multiplier: f64,
    /// Notified share of detections
    pub notification_fraction: f64,
    /// Treatment duration in months, drug-susceptible
    pub duration_s: f64,
    /// Treatment duration in months, drug-resistant
    pub duration_r: f64,
    /// Success share of completing courses, drug-susceptible
    pub effective_success_s: f64,
    /// Success share of completing courses, drug-resistant
    pub effective_success_r: f64,
}

impl MonthlyRates {
    /// Convert annual parameters into monthly rates.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::InvalidValue` - β negative or not finite, or a parameter
    ///   outside its domain
    /// * `ConfigurationError::RateOutOfRange` - an annual probability outside `[0, 1)`
    pub fn new(beta: f64, params: &ParameterSet) -> Result<Self, ConfigurationError> {
        if !(beta.is_finite() && beta >= 0.0) {
            return Err(ConfigurationError::invalid_value(
                "beta",
                beta,
                "must be finite and >= 0",
            ));
        }
        params.validate()?;

        let effective_success = |success: f64| {
            (success * (1.0 - params.stockout_frac) * (1.0 - params.ltfu_rate))
                .clamp(0.0, MAX_EFFECTIVE_SUCCESS)
        };

        Ok(Self {
            beta: monthly_share(beta) * params.contact_rate_multiplier,
            sigma: monthly_share(params.sigma),
            detection: monthly_detection_hazard(
                params.detection_rate,
                params.diagnostic_delay_months,
            )?,
            treatment_initiation: monthly_hazard(
                "treatment_initiation_rate",
                params.treatment_initiation_rate,
            )?,
            relapse: monthly_hazard("relapse_rate", params.relapse_rate)?,
            natural_death: monthly_hazard("natural_death_rate", params.natural_death_rate)?,
            tb_death_s: monthly_hazard("tb_death_rate_s", params.tb_death_rate_s)?,
            tb_death_r: monthly_hazard("tb_death_rate_r", params.tb_death_rate_r)?,
            prop_resistant: params.prop_resistant,
            vaccine_efficacy: params.vaccine_efficacy,
            malnutrition_factor: params.malnutrition_factor(),
            hiv_prevalence: params.hiv_prevalence,
            hiv_progression_multiplier: params.hiv_progression_multiplier,
            notification_fraction: params.notification_fraction(),
            duration_s: params.treatment_duration_months_s,
            duration_r: params.treatment_duration_months_r,
            effective_success_s: effective_success(params.treatment_success_s),
            effective_success_r: effective_success(params.treatment_success_r),
        })
    }
}

/// Result of one monthly step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// State at month `m + 1`, floored at zero
    pub state: State,
    /// Latent progressions during the month (the incident-case signal)
    pub new_cases: f64,
    /// What the zero floor absorbed this month
    pub clamp: ClampDiagnostics,
}

/// Pure monthly transition function.
#[derive(Debug, Clone, Copy)]
pub struct CompartmentStepper {
    rates: MonthlyRates,
}

impl CompartmentStepper {
    /// Create a stepper over precomputed rates.
    pub fn new(rates: MonthlyRates) -> Self {
        Self { rates }
    }

    /// Returns the monthly rates in use.
    pub fn rates(&self) -> &MonthlyRates {
        &self.rates
    }

    /// Advance `current` by one month.
    pub fn step(&self, current: &State) -> StepOutcome {
        use Compartment::*;

        let r = &self.rates;
        let s = current[Susceptible];
        let v = current[Vaccinated];
        let l = current[Latent];
        let iu_s = current[UndetectedSusceptible];
        let iu_r = current[UndetectedResistant];
        let id_s = current[DetectedSusceptible];
        let id_r = current[DetectedResistant];
        let ts = current[TreatedSusceptible];
        let tr = current[TreatedResistant];
        let rec = current[Recovered];

        let n_current = current.total() + POPULATION_EPSILON;
        let nd = r.natural_death;

        // Infection
        let force = r.beta * current.infectious() / n_current;
        let infections = force * (s + (1.0 - r.vaccine_efficacy) * v);
        let infections_r = infections * r.prop_resistant;
        let infections_s = infections - infections_r;

        // Latent progression
        let mf = r.malnutrition_factor;
        let h = r.hiv_prevalence;
        let progressions = r.sigma * mf * (1.0 - h) * l
            + r.sigma * r.hiv_progression_multiplier * mf * h * l;
        let progressions_r = progressions * r.prop_resistant;
        let progressions_s = progressions - progressions_r;

        // Detection and notification
        let detected_s = r.detection * iu_s;
        let detected_r = r.detection * iu_r;
        let notified_s = detected_s * r.notification_fraction;
        let notified_r = detected_r * r.notification_fraction;

        // Treatment
        let started_s = r.treatment_initiation * notified_s;
        let started_r = r.treatment_initiation * notified_r;
        let completed_s = ts / r.duration_s.max(1.0);
        let completed_r = tr / r.duration_r.max(1.0);
        let success_s = completed_s * r.effective_success_s;
        let failure_s = completed_s - success_s;
        let success_r = completed_r * r.effective_success_r;
        let failure_r = completed_r - success_r;
        let failure_to_resistant = failure_s * FAIL_TO_RESISTANT;

        let relapses = r.relapse * rec;

        let mut next = State::zeros();
        next[Susceptible] = s - infections - nd * s + nd * n_current * (s / n_current);
        next[Vaccinated] = v - (-nd * v + nd * n_current * (v / n_current));
        next[Latent] = l + infections_s + infections_r + relapses - progressions - nd * l;
        next[UndetectedSusceptible] = iu_s
            + progressions_s
            + (detected_s - notified_s)
            + (failure_s - failure_to_resistant)
            - detected_s
            - r.tb_death_s * iu_s
            - nd * iu_s;
        next[UndetectedResistant] = iu_r
            + progressions_r
            + failure_to_resistant
            + (detected_r - notified_r)
            + failure_r
            - detected_r
            - r.tb_death_r * iu_r
            - nd * iu_r;
        next[DetectedSusceptible] = id_s + notified_s - started_s - r.tb_death_s * id_s - nd * id_s;
        next[DetectedResistant] = id_r + notified_r - started_r - r.tb_death_r * id_r - nd * id_r;
        next[TreatedSusceptible] = ts + started_s - completed_s - nd * ts;
        next[TreatedResistant] = tr + started_r - completed_r - nd * tr;
        next[Recovered] = rec + success_s + success_r - relapses - nd * rec;

        let clamp = next.clamp_non_negative();

        StepOutcome {
            state: next,
            new_cases: progressions,
            clamp,
        }
    }
}
