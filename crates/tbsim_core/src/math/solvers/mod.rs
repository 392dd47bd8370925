//! Root-finding solvers.
//!
//! ## Available Solvers
//!
//! - [`BisectionSolver`]: classic bracketing bisection with optional expansion
//!   of the upper bound when the initial bracket holds no sign change
//!
//! Bisection only needs the sign of the objective, which suits objectives that
//! are expensive black boxes (a full model run per evaluation) and known to be
//! monotone but not differentiable in closed form.
//!
//! ## Configuration
//!
//! [`SolverConfig`] carries:
//! - `tolerance`: absolute residual accepted as a root
//! - `max_iterations`: number of halvings before returning a best estimate
//!
//! ## Example
//!
//! ```
//! use tbsim_core::math::solvers::{BisectionSolver, SolverConfig};
//!
//! let solver = BisectionSolver::new(SolverConfig::classic_bisection())
//!     .with_upper_expansion([500.0, 1000.0]);
//!
//! // Cumulative cases grow with the trial value; find where they reach 975
//! let outcome = solver.find_root(|x: f64| 40.0 * x - 975.0, 0.01, 200.0).unwrap();
//! assert!(outcome.converged);
//! assert!(outcome.residual.abs() <= 1.0);
//! ```

mod bisection;
mod config;

pub use bisection::{BisectionOutcome, BisectionSolver, Bracket};
pub use config::SolverConfig;
