//! Monthly simulation output.

use super::aggregator::{YearBoundary, YearlyAggregator};
use crate::compartments::{ClampDiagnostics, Compartment, State};

/// Output of one simulation run.
///
/// Holds one [`State`] and one new-case value per month from 0 to
/// `years * 12` inclusive. `new_cases[0]` is zero; `new_cases[m + 1]` is the
/// number of latent progressions during month `m`. Built once by the
/// simulator and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSeries {
    beta: f64,
    years: u32,
    population: u64,
    states: Vec<State>,
    new_cases: Vec<f64>,
    clamp: ClampDiagnostics,
}

impl TimeSeries {
    pub(crate) fn new(
        beta: f64,
        years: u32,
        population: u64,
        states: Vec<State>,
        new_cases: Vec<f64>,
        clamp: ClampDiagnostics,
    ) -> Self {
        debug_assert_eq!(states.len(), new_cases.len());
        Self {
            beta,
            years,
            population,
            states,
            new_cases,
            clamp,
        }
    }

    /// Annual transmission coefficient of the run.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Horizon in years.
    pub fn years(&self) -> u32 {
        self.years
    }

    /// Configured population.
    pub fn population(&self) -> u64 {
        self.population
    }

    /// Number of recorded months (`years * 12 + 1`).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false for a series produced by the simulator.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Per-month states.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// State at month `month`, if recorded.
    pub fn state_at(&self, month: usize) -> Option<&State> {
        self.states.get(month)
    }

    /// State after the last month.
    pub fn final_state(&self) -> Option<&State> {
        self.states.last()
    }

    /// Per-month new cases.
    pub fn new_cases(&self) -> &[f64] {
        &self.new_cases
    }

    /// Values of one compartment over time.
    pub fn compartment(&self, compartment: Compartment) -> Vec<f64> {
        self.states.iter().map(|s| s[compartment]).collect()
    }

    /// Population total per month.
    pub fn totals(&self) -> Vec<f64> {
        self.states.iter().map(State::total).collect()
    }

    /// Clamp record accumulated over every month of the run.
    pub fn clamp_diagnostics(&self) -> &ClampDiagnostics {
        &self.clamp
    }

    /// Yearly incidence with the default overlapping window.
    pub fn yearly_incidence(&self) -> Vec<f64> {
        self.yearly_incidence_with(YearBoundary::Overlapping)
    }

    /// Yearly incidence with an explicit year window.
    pub fn yearly_incidence_with(&self, boundary: YearBoundary) -> Vec<f64> {
        YearlyAggregator::new(boundary).aggregate(&self.new_cases, self.years as usize)
    }
}
