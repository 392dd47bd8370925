//! # tbsim_models (L2: Epidemiological Model)
//!
//! Deterministic district-level tuberculosis transmission and care-cascade
//! model, stepped monthly, with calibration of the transmission coefficient β.
//!
//! This crate provides:
//! - [`parameters`]: the immutable parameter set, its default table and merge
//! - [`compartments`]: the ten-compartment state, its month-zero split and the
//!   monthly transition
//! - [`simulation`]: multi-year runs and yearly incidence
//! - [`calibration`]: β fitted to a Year-1 incidence target
//! - [`districts`]: batch calibration and simulation over many districts
//!
//! ## Usage Examples
//!
//! ```rust
//! use tbsim_models::calibration::{calibrate, CalibrationConfig};
//! use tbsim_models::parameters::ParameterSet;
//! use tbsim_models::simulation::simulate;
//! use tbsim_models::DEFAULT_BETA;
//!
//! let params = ParameterSet::default();
//!
//! // Ten years at the national default β
//! let series = simulate(DEFAULT_BETA, 10, 1_000_000, &params).unwrap();
//! let incidence = series.yearly_incidence();
//! assert_eq!(incidence.len(), 10);
//!
//! // β for a district with 3000 expected cases in Year 1
//! let result = calibrate(3000.0, 250_000, &params, &CalibrationConfig::default()).unwrap();
//! assert!(result.residual.abs() <= 1.0);
//! ```
//!
//! ## Design Principles
//!
//! - **Pure runs**: every simulation owns its state; no randomness, no shared
//!   mutable data, identical inputs give identical outputs
//! - **Explicit merge**: parameter overrides fill only the keys they name
//!
//! ## Feature Flags
//!
//! - `parallel` (default): process districts on the rayon thread pool
//! - `serde` (default): serialisation for parameters, states and results

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod compartments;
pub mod districts;
pub mod parameters;
pub mod simulation;

/// β to use when calibration is skipped or fails.
pub const DEFAULT_BETA: f64 = 4.4857421875;
