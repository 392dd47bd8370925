//! Solver configuration types.

use num_traits::Float;

/// Stopping rule shared by the bracketing solvers.
///
/// # Type Parameters
///
/// * `T` - Floating-point type of the objective (e.g., `f64`)
///
/// # Example
///
/// ```
/// use tbsim_core::math::solvers::SolverConfig;
///
/// // Absolute tolerance of one case, forty halvings
/// let config = SolverConfig::new(1.0_f64, 40);
/// assert_eq!(config.max_iterations, 40);
///
/// let classic: SolverConfig<f64> = SolverConfig::classic_bisection();
/// assert_eq!(classic, config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<T: Float> {
    /// Absolute residual tolerance.
    ///
    /// The solver accepts a trial point `x` once `|f(x)| <= tolerance`.
    pub tolerance: T,

    /// Maximum number of bracket halvings.
    ///
    /// Reaching the limit is not an error: the last midpoint is returned
    /// as a best-effort estimate with `converged == false`.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Tight general-purpose settings: `tolerance = 1e-10`, `max_iterations = 100`.
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-10).unwrap_or_else(T::epsilon),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a new configuration.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance` is not positive or `max_iterations == 0`.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        assert!(tolerance > T::zero(), "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Settings used for β calibration: one case of absolute tolerance and
    /// forty halvings, which shrinks the default β bracket below `1e-9`.
    pub fn classic_bisection() -> Self {
        Self {
            tolerance: T::one(),
            max_iterations: 40,
        }
    }

    /// Replace the tolerance, keeping the iteration limit.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        assert!(tolerance > T::zero(), "tolerance must be positive");
        self.tolerance = tolerance;
        self
    }

    /// Replace the iteration limit, keeping the tolerance.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        assert!(max_iterations > 0, "max_iterations must be > 0");
        self.max_iterations = max_iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config: SolverConfig<f64> = SolverConfig::default();
        assert!((config.tolerance - 1e-10).abs() < 1e-15);
        assert_eq!(config.max_iterations, 100);
    }

    #[test]
    fn test_classic_bisection() {
        let config: SolverConfig<f64> = SolverConfig::classic_bisection();
        assert_eq!(config.tolerance, 1.0);
        assert_eq!(config.max_iterations, 40);
    }

    #[test]
    fn test_builders() {
        let config: SolverConfig<f64> = SolverConfig::classic_bisection()
            .with_tolerance(0.25)
            .with_max_iterations(60);
        assert_eq!(config.tolerance, 0.25);
        assert_eq!(config.max_iterations, 60);
    }

    #[test]
    #[should_panic(expected = "tolerance must be positive")]
    fn test_zero_tolerance_panics() {
        let _: SolverConfig<f64> = SolverConfig::new(0.0, 40);
    }

    #[test]
    #[should_panic(expected = "max_iterations must be > 0")]
    fn test_zero_iterations_panics() {
        let _: SolverConfig<f64> = SolverConfig::classic_bisection().with_max_iterations(0);
    }

    #[test]
    fn test_with_f32() {
        let config: SolverConfig<f32> = SolverConfig::classic_bisection();
        assert_eq!(config.max_iterations, 40);
    }
}
