//! Numerical building blocks.
//!
//! - [`hazard`]: conversion of annual probabilities into monthly hazards
//! - [`solvers`]: bracketing root finders

pub mod hazard;
pub mod solvers;
