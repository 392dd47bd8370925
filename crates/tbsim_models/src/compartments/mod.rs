//! Compartment model.
//!
//! - [`State`]: the ten sub-populations at one month, indexed by [`Compartment`]
//! - [`InitialStateBuilder`]: month-zero split from population and parameters
//! - [`CompartmentStepper`]: pure month `m` to month `m + 1` transition
//!
//! Natural deaths in S and V are replaced in place each month. Other
//! compartments are not renewed, so the population total drifts below N over
//! long horizons; calibration is tuned against this behaviour.

mod initial;
mod state;
mod stepper;

pub use initial::{InitialStateBuilder, BASELINE_INCIDENCE_PER_100K};
pub use state::{ClampDiagnostics, Compartment, State, COMPARTMENT_COUNT};
pub use stepper::{
    CompartmentStepper, MonthlyRates, StepOutcome, FAIL_TO_RESISTANT, POPULATION_EPSILON,
};
