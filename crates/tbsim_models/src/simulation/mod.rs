//! Simulation over a horizon and yearly aggregation.
//!
//! - [`Simulator`] / [`simulate`]: initial state plus `years * 12` monthly steps
//! - [`TimeSeries`]: per-month states, new cases and clamp diagnostics
//! - [`YearlyAggregator`]: monthly new cases to yearly incidence

mod aggregator;
mod series;
mod simulator;

pub use aggregator::{yearly_incidence, YearBoundary, YearlyAggregator};
pub use series::TimeSeries;
pub use simulator::{simulate, Simulator};
