//! Shared error types.
//!
//! # Re-exports
//!
//! For convenience, [`ConfigurationError`] and [`SolverError`] are re-exported at this module level.

pub mod error;

pub use error::{ConfigurationError, SolverError};
