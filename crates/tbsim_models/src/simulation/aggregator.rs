//! Monthly new-case flow to yearly incidence.

use tbsim_core::math::hazard::MONTHS_PER_YEAR;

/// Which monthly samples make up a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum YearBoundary {
    /// Indices `[12y, 12y + 12]` inclusive: 13 samples, the last shared with the
    /// next year. Calibrated β values assume this window.
    #[default]
    Overlapping,
    /// Indices `[12y + 1, 12y + 12]`: the 12 months stepped during year `y`.
    Disjoint,
}

/// Reduces a monthly new-case series to one incidence figure per year.
///
/// # Example
///
/// ```
/// use tbsim_models::simulation::{YearBoundary, YearlyAggregator};
///
/// // month 0 carries no cases; every stepped month carries one
/// let mut monthly = vec![1.0; 25];
/// monthly[0] = 0.0;
///
/// let overlapping = YearlyAggregator::default().aggregate(&monthly, 2);
/// assert_eq!(overlapping, vec![12.0, 13.0]);
///
/// let disjoint = YearlyAggregator::new(YearBoundary::Disjoint).aggregate(&monthly, 2);
/// assert_eq!(disjoint, vec![12.0, 12.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearlyAggregator {
    boundary: YearBoundary,
}

impl YearlyAggregator {
    /// Create an aggregator with the given year window.
    pub fn new(boundary: YearBoundary) -> Self {
        Self { boundary }
    }

    /// Returns the year window.
    pub fn boundary(&self) -> YearBoundary {
        self.boundary
    }

    /// Sum `new_cases` per year for `years` years.
    ///
    /// Windows reaching past the end of the series are truncated; a year with
    /// no samples left sums to zero.
    pub fn aggregate(&self, new_cases: &[f64], years: usize) -> Vec<f64> {
        (0..years)
            .map(|year| {
                let (start, end) = match self.boundary {
                    YearBoundary::Overlapping => {
                        (year * MONTHS_PER_YEAR, year * MONTHS_PER_YEAR + MONTHS_PER_YEAR + 1)
                    }
                    YearBoundary::Disjoint => (
                        year * MONTHS_PER_YEAR + 1,
                        year * MONTHS_PER_YEAR + MONTHS_PER_YEAR + 1,
                    ),
                };
                let end = end.min(new_cases.len());
                let start = start.min(end);
                new_cases[start..end].iter().sum()
            })
            .collect()
    }
}

/// Yearly incidence with the default overlapping window.
pub fn yearly_incidence(new_cases: &[f64], years: usize) -> Vec<f64> {
    YearlyAggregator::default().aggregate(new_cases, years)
}
