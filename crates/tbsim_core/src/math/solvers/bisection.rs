//! Classic bracketing bisection with upper-bound expansion.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// A closed search interval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bracket<T> {
    /// Lower end
    pub lower: T,
    /// Upper end
    pub upper: T,
}

impl<T: Float> Bracket<T> {
    /// Create a bracket from its two ends.
    pub fn new(lower: T, upper: T) -> Self {
        Self { lower, upper }
    }

    /// Midpoint of the interval.
    pub fn midpoint(&self) -> T {
        (self.lower + self.upper) / (T::one() + T::one())
    }

    /// Absolute width of the interval.
    pub fn width(&self) -> T {
        (self.upper - self.lower).abs()
    }
}

/// Result of a bisection run.
///
/// Returned both when the tolerance was met (`converged == true`) and when
/// the iteration limit ran out (`converged == false`, `root` is the last midpoint).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BisectionOutcome<T> {
    /// Accepted point (last midpoint evaluated)
    pub root: T,
    /// Objective value at `root`
    pub residual: T,
    /// Bracket in force when `root` was evaluated
    pub bracket: Bracket<T>,
    /// Bracket after any upper-bound expansion, before halving
    pub search: Bracket<T>,
    /// Halvings performed
    pub iterations: usize,
    /// Objective evaluations, including bracketing
    pub evaluations: usize,
    /// Whether `|residual| <= tolerance`
    pub converged: bool,
}

/// Bisection root finder.
///
/// Evaluates both ends of the bracket; when they share a sign the upper end is
/// multiplied by each configured expansion factor in turn until a sign change
/// appears. The bracket is then halved, keeping the half whose end disagrees in
/// sign with the midpoint, until `|f(mid)| <= tolerance` or the iteration
/// limit is reached.
///
/// The objective is assumed continuous and monotone over the search range.
/// Non-monotone objectives can still be bracketed but the returned root is
/// then only one of possibly several sign changes.
///
/// # Example
///
/// ```
/// use tbsim_core::math::solvers::{BisectionSolver, SolverConfig};
///
/// let solver = BisectionSolver::new(SolverConfig::new(1e-9, 200))
///     .with_upper_expansion([10.0, 100.0]);
///
/// // The root at 50 lies outside [0, 2]; expansion moves the upper end to 20, then 2000
/// let outcome = solver.find_root(|x: f64| x - 50.0, 0.0, 2.0).unwrap();
/// assert!(outcome.converged);
/// assert!((outcome.root - 50.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct BisectionSolver<T: Float> {
    config: SolverConfig<T>,
    upper_expansion: Vec<T>,
}

impl<T: Float> BisectionSolver<T> {
    /// Create a solver without bracket expansion.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self {
            config,
            upper_expansion: Vec::new(),
        }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Set the successive factors applied to the upper end while the bracket
    /// has no sign change.
    pub fn with_upper_expansion(mut self, factors: impl IntoIterator<Item = T>) -> Self {
        self.upper_expansion = factors.into_iter().collect();
        self
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Returns the configured expansion factors.
    pub fn upper_expansion(&self) -> &[T] {
        &self.upper_expansion
    }

    /// Find a root of an infallible objective.
    ///
    /// # Errors
    ///
    /// * `SolverError::NoBracket` - no sign change after every expansion
    /// * `SolverError::NumericalInstability` - the objective returned NaN
    pub fn find_root<F>(&self, f: F, lower: T, upper: T) -> Result<BisectionOutcome<T>, SolverError>
    where
        F: Fn(T) -> T,
    {
        self.try_find_root(|x| Ok::<T, SolverError>(f(x)), lower, upper)
    }

    /// Find a root of a fallible objective.
    ///
    /// Errors returned by `f` abort the search and are passed through unchanged.
    /// Solver failures are converted into the caller's error type.
    pub fn try_find_root<F, E>(&self, mut f: F, lower: T, upper: T) -> Result<BisectionOutcome<T>, E>
    where
        F: FnMut(T) -> Result<T, E>,
        E: From<SolverError>,
    {
        let mut evaluations = 0usize;

        let mut bracket = Bracket::new(lower, upper);
        let mut f_low = evaluate(&mut f, bracket.lower, &mut evaluations)?;
        let f_high = evaluate(&mut f, bracket.upper, &mut evaluations)?;

        if same_sign(f_low, f_high) {
            let mut bracketed = false;
            for &factor in &self.upper_expansion {
                bracket.upper = bracket.upper * factor;
                let f_expanded = evaluate(&mut f, bracket.upper, &mut evaluations)?;
                if !same_sign(f_low, f_expanded) {
                    bracketed = true;
                    break;
                }
            }
            if !bracketed {
                return Err(SolverError::NoBracket {
                    a: bracket.lower.to_f64().unwrap_or(f64::NAN),
                    b: bracket.upper.to_f64().unwrap_or(f64::NAN),
                }
                .into());
            }
        }

        let search = bracket;
        let mut root = bracket.midpoint();
        let mut residual = T::nan();
        let mut last_bracket = bracket;

        for iteration in 1..=self.config.max_iterations {
            last_bracket = bracket;
            root = bracket.midpoint();
            residual = evaluate(&mut f, root, &mut evaluations)?;

            if residual.abs() <= self.config.tolerance {
                return Ok(BisectionOutcome {
                    root,
                    residual,
                    bracket: last_bracket,
                    search,
                    iterations: iteration,
                    evaluations,
                    converged: true,
                });
            }

            if same_sign(residual, f_low) {
                bracket.lower = root;
                f_low = residual;
            } else {
                bracket.upper = root;
            }
        }

        Ok(BisectionOutcome {
            root,
            residual,
            bracket: last_bracket,
            search,
            iterations: self.config.max_iterations,
            evaluations,
            converged: false,
        })
    }
}

/// Evaluate the objective, counting the call and rejecting NaN.
fn evaluate<T, F, E>(f: &mut F, x: T, evaluations: &mut usize) -> Result<T, E>
where
    T: Float,
    F: FnMut(T) -> Result<T, E>,
    E: From<SolverError>,
{
    *evaluations += 1;
    let value = f(x)?;
    if value.is_nan() {
        return Err(SolverError::NumericalInstability(format!(
            "objective returned NaN at x = {}",
            x.to_f64().unwrap_or(f64::NAN)
        ))
        .into());
    }
    Ok(value)
}

/// Strictly same sign; a zero on either side counts as a sign change.
#[inline]
fn same_sign<T: Float>(a: T, b: T) -> bool {
    (a > T::zero() && b > T::zero()) || (a < T::zero() && b < T::zero())
}
