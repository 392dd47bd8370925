//! # tbsim_core: Numerical Foundation for the TB District Model
//!
//! ## Layer 1 (Foundation) Role
//!
//! tbsim_core is the bottom layer of the workspace, providing:
//! - Annual-to-monthly rate conversion (`math::hazard`)
//! - A classic bracketing bisection root finder (`math::solvers`)
//! - Error types: `ConfigurationError`, `SolverError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other tbsim_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use tbsim_core::math::hazard::monthly_hazard;
//! use tbsim_core::math::solvers::{BisectionSolver, SolverConfig};
//!
//! // 70% annual detection probability as a constant monthly hazard
//! let m = monthly_hazard("detection_rate", 0.70_f64).unwrap();
//! assert!((1.0 - (1.0 - m).powi(12) - 0.70).abs() < 1e-12);
//!
//! // Bisection on a monotone function
//! let solver = BisectionSolver::new(SolverConfig::new(1e-9, 100));
//! let outcome = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((outcome.root - std::f64::consts::SQRT_2).abs() < 1e-6);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for error and solver outcome types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
