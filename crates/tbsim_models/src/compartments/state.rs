//! Ten-compartment population state.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of compartments in [`State`].
pub const COMPARTMENT_COUNT: usize = 10;

/// Disease and care state of a sub-population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compartment {
    /// Susceptible
    Susceptible,
    /// Vaccinated
    Vaccinated,
    /// Latent infection
    Latent,
    /// Undetected infectious, drug-susceptible
    UndetectedSusceptible,
    /// Undetected infectious, drug-resistant
    UndetectedResistant,
    /// Detected and awaiting treatment, drug-susceptible
    DetectedSusceptible,
    /// Detected and awaiting treatment, drug-resistant
    DetectedResistant,
    /// On treatment, drug-susceptible
    TreatedSusceptible,
    /// On treatment, drug-resistant
    TreatedResistant,
    /// Recovered
    Recovered,
}

impl Compartment {
    /// Every compartment in state-vector order.
    pub const ALL: [Compartment; COMPARTMENT_COUNT] = [
        Compartment::Susceptible,
        Compartment::Vaccinated,
        Compartment::Latent,
        Compartment::UndetectedSusceptible,
        Compartment::UndetectedResistant,
        Compartment::DetectedSusceptible,
        Compartment::DetectedResistant,
        Compartment::TreatedSusceptible,
        Compartment::TreatedResistant,
        Compartment::Recovered,
    ];

    /// Short label used in exported tables (`S`, `V`, `L`, `Iu_s`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Compartment::Susceptible => "S",
            Compartment::Vaccinated => "V",
            Compartment::Latent => "L",
            Compartment::UndetectedSusceptible => "Iu_s",
            Compartment::UndetectedResistant => "Iu_r",
            Compartment::DetectedSusceptible => "Id_s",
            Compartment::DetectedResistant => "Id_r",
            Compartment::TreatedSusceptible => "Ts",
            Compartment::TreatedResistant => "Tr",
            Compartment::Recovered => "R",
        }
    }

    /// Whether the compartment contributes to the force of infection.
    pub fn is_infectious(self) -> bool {
        matches!(
            self,
            Compartment::UndetectedSusceptible
                | Compartment::UndetectedResistant
                | Compartment::DetectedSusceptible
                | Compartment::DetectedResistant
        )
    }

    #[inline]
    fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Population in every compartment at one month.
///
/// Indexed by [`Compartment`]:
///
/// ```
/// use tbsim_models::compartments::{Compartment, State};
///
/// let mut state = State::zeros();
/// state[Compartment::Latent] = 1950.0;
/// assert_eq!(state.total(), 1950.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    values: [f64; COMPARTMENT_COUNT],
}

impl State {
    /// Empty population.
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Build from values in [`Compartment::ALL`] order.
    pub fn from_array(values: [f64; COMPARTMENT_COUNT]) -> Self {
        Self { values }
    }

    /// Values in [`Compartment::ALL`] order.
    pub fn as_array(&self) -> &[f64; COMPARTMENT_COUNT] {
        &self.values
    }

    /// Sum over all compartments.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sum over the infectious compartments.
    pub fn infectious(&self) -> f64 {
        self[Compartment::UndetectedSusceptible]
            + self[Compartment::DetectedSusceptible]
            + self[Compartment::UndetectedResistant]
            + self[Compartment::DetectedResistant]
    }

    /// `(compartment, value)` pairs in state-vector order.
    pub fn iter(&self) -> impl Iterator<Item = (Compartment, f64)> + '_ {
        Compartment::ALL.iter().map(move |&c| (c, self[c]))
    }

    /// Whether every value is `>= 0` and finite.
    pub fn is_non_negative(&self) -> bool {
        self.values.iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Floor every compartment at zero, returning what was absorbed.
    pub fn clamp_non_negative(&mut self) -> ClampDiagnostics {
        let mut diagnostics = ClampDiagnostics::default();
        for value in self.values.iter_mut() {
            if *value < 0.0 {
                diagnostics.events += 1;
                diagnostics.absorbed_mass += -*value;
                *value = 0.0;
            }
        }
        if diagnostics.events > 0 {
            diagnostics.months_affected = 1;
        }
        diagnostics
    }
}

impl Index<Compartment> for State {
    type Output = f64;

    fn index(&self, compartment: Compartment) -> &f64 {
        &self.values[compartment.position()]
    }
}

impl IndexMut<Compartment> for State {
    fn index_mut(&mut self, compartment: Compartment) -> &mut f64 {
        &mut self.values[compartment.position()]
    }
}

/// Record of negative excursions floored to zero.
///
/// Non-zero values usually point at a parameter combination the difference
/// equations cannot follow at a monthly step, e.g. extreme transmission.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClampDiagnostics {
    /// Compartment values that were negative before clamping
    pub events: usize,
    /// Months with at least one clamp
    pub months_affected: usize,
    /// Total population mass added by clamping
    pub absorbed_mass: f64,
}

impl ClampDiagnostics {
    /// Whether any clamp happened.
    pub fn is_clean(&self) -> bool {
        self.events == 0
    }

    /// Fold another record into this one.
    pub fn absorb(&mut self, other: ClampDiagnostics) {
        self.events += other.events;
        self.months_affected += other.months_affected;
        self.absorbed_mass += other.absorbed_mass;
    }
}
