//! Integration tests for module exports.
//!
//! Verify that public modules and types are reachable via absolute paths.

use tbsim_core::math::hazard::{
    annual_probability, monthly_detection_hazard, monthly_hazard, monthly_share, MONTHS_PER_YEAR,
};
use tbsim_core::math::solvers::{BisectionOutcome, BisectionSolver, Bracket, SolverConfig};
use tbsim_core::types::{ConfigurationError, SolverError};

#[test]
fn test_hazard_module_exports() {
    assert_eq!(MONTHS_PER_YEAR, 12);
    let m = monthly_hazard("natural_death_rate", 0.007).unwrap();
    assert!((annual_probability(m) - 0.007).abs() < 1e-12);
    assert!(monthly_detection_hazard(0.7, 2.0).unwrap() > 0.0);
    assert_eq!(monthly_share(12.0), 1.0);
}

#[test]
fn test_solver_module_exports() {
    let solver: BisectionSolver<f64> = BisectionSolver::new(SolverConfig::classic_bisection());
    let outcome: BisectionOutcome<f64> = solver.find_root(|x| x - 10.0, 0.0, 16.0).unwrap();
    assert_eq!(outcome.root, 10.0);
    assert_eq!(outcome.bracket, Bracket::new(8.0, 12.0));
}

#[test]
fn test_error_module_exports() {
    let config_err: ConfigurationError = ConfigurationError::InvalidHorizon(0);
    let solver_err: SolverError = SolverError::NoBracket { a: 0.0, b: 1.0 };
    assert!(!config_err.to_string().is_empty());
    assert!(!solver_err.to_string().is_empty());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn test_hazard_round_trip(a in 0.0_f64..0.999) {
            let m = monthly_hazard("rate", a).unwrap();
            prop_assert!((0.0..1.0).contains(&m));
            prop_assert!((annual_probability(m) - a).abs() < 1e-10);
        }

        #[test]
        fn test_hazard_monotone(a in 0.0_f64..0.99, step in 1e-6_f64..0.009) {
            let lo = monthly_hazard("rate", a).unwrap();
            let hi = monthly_hazard("rate", a + step).unwrap();
            prop_assert!(hi > lo);
        }

        #[test]
        fn test_bisection_finds_linear_root(root in 0.02_f64..1.0e6, slope in 0.1_f64..100.0) {
            let solver = BisectionSolver::new(SolverConfig::new(1e-6, 200))
                .with_upper_expansion([500.0, 1000.0]);
            let outcome = solver.find_root(|x| slope * (x - root), 0.01, 200.0).unwrap();
            prop_assert!(outcome.converged);
            prop_assert!(outcome.residual.abs() <= 1e-6);
        }
    }
}
