//! Rule-based programme recommendations.
//!
//! Rules read the parameter set and the projected Year-1 and Year-5 incidence
//! of a district run. Every run yields at least the progress line.

use std::fmt;

use tbsim_models::districts::percent_reduction;
use tbsim_models::parameters::{ParameterKey, ParameterSet};

/// Year-1 to Year-5 reduction, in percent, counted as good progress.
pub const GOOD_PROGRESS_PERCENT: f64 = 30.0;

/// Separator used when recommendations share one CSV cell.
pub const JOIN_SEPARATOR: &str = " || ";

/// One programme recommendation.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Detection below 0.80
    IncreaseDetection,
    /// Preventive therapy coverage below 0.30
    ScaleUpTpt,
    /// Either treatment success below 0.90
    StrengthenTreatment,
    /// Large private sector with weak notification
    EngagePrivateSector,
    /// Malnutrition above 0.20
    AddressNutrition,
    /// HIV prevalence above 0.05
    IntegrateHivServices,
    /// Stockouts above 0.05
    StrengthenSupplyChain,
    /// Reduction at or above [`GOOD_PROGRESS_PERCENT`]
    GoodProgress(f64),
    /// Reduction below [`GOOD_PROGRESS_PERCENT`]
    CombineInterventions(f64),
    /// Year 5 above Year 1
    RisingIncidence,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::IncreaseDetection => write!(
                f,
                "Increase case detection: scale ACF, AI-CXR triage, and private-sector notification."
            ),
            Recommendation::ScaleUpTpt => write!(
                f,
                "Scale up TPT to contacts and high-risk groups (target >=30% annual coverage)."
            ),
            Recommendation::StrengthenTreatment => write!(
                f,
                "Strengthen treatment support: adherence counselling, shorter regimens, reduce LTFU."
            ),
            Recommendation::EngagePrivateSector => write!(
                f,
                "Engage private sector with e-prescription and mandatory notification incentives."
            ),
            Recommendation::AddressNutrition => write!(
                f,
                "Address nutrition: food support for TB households."
            ),
            Recommendation::IntegrateHivServices => write!(
                f,
                "Integrate TB/HIV services: routine screening, ART optimisation, and TPT for PLHIV."
            ),
            Recommendation::StrengthenSupplyChain => {
                write!(f, "Strengthen supply chain to avoid stockouts.")
            }
            Recommendation::GoodProgress(percent) => write!(
                f,
                "Projected reduction Year1->Year5 = {:.1}%: good progress; sustain scale-up.",
                percent
            ),
            Recommendation::CombineInterventions(percent) => write!(
                f,
                "Projected reduction Year1->Year5 = {:.1}%: consider combining the interventions above.",
                percent
            ),
            Recommendation::RisingIncidence => write!(
                f,
                "Warning: incidence rises by Year 5; revisit baseline assumptions and programme coverage."
            ),
        }
    }
}

/// Recommendations for one district run, in rule order.
pub fn recommend(params: &ParameterSet, year1: f64, year5: f64) -> Vec<Recommendation> {
    let p = |key| params.get(key);
    let mut out = Vec::new();

    if p(ParameterKey::DetectionRate) < 0.80 {
        out.push(Recommendation::IncreaseDetection);
    }
    if p(ParameterKey::TptCoverage) < 0.30 {
        out.push(Recommendation::ScaleUpTpt);
    }
    if p(ParameterKey::TreatmentSuccessS) < 0.90 || p(ParameterKey::TreatmentSuccessR) < 0.90 {
        out.push(Recommendation::StrengthenTreatment);
    }
    if p(ParameterKey::PrivateSectorFraction) > 0.3 && p(ParameterKey::PrivateNotifyFrac) < 0.8 {
        out.push(Recommendation::EngagePrivateSector);
    }
    if p(ParameterKey::MalnutFraction) > 0.2 {
        out.push(Recommendation::AddressNutrition);
    }
    if p(ParameterKey::HivPrevalence) > 0.05 {
        out.push(Recommendation::IntegrateHivServices);
    }
    if p(ParameterKey::StockoutFrac) > 0.05 {
        out.push(Recommendation::StrengthenSupplyChain);
    }

    let percent = percent_reduction(year1, year5);
    if percent >= GOOD_PROGRESS_PERCENT {
        out.push(Recommendation::GoodProgress(percent));
    } else {
        out.push(Recommendation::CombineInterventions(percent));
    }

    if year5 > year1 {
        out.push(Recommendation::RisingIncidence);
    }
    out
}

/// Recommendations joined into one line.
pub fn joined(recommendations: &[Recommendation]) -> String {
    recommendations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(JOIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_programme() -> ParameterSet {
        ParameterSet::default()
            .with(ParameterKey::DetectionRate, 0.9)
            .with(ParameterKey::TptCoverage, 0.5)
            .with(ParameterKey::TreatmentSuccessS, 0.95)
            .with(ParameterKey::TreatmentSuccessR, 0.95)
            .with(ParameterKey::PrivateSectorFraction, 0.2)
            .with(ParameterKey::MalnutFraction, 0.1)
    }

    #[test]
    fn test_defaults_trigger_programme_gaps() {
        // Defaults: detection 0.70, TPT 0.05, success 0.89/0.87, private 0.40 at 0.50
        let recs = recommend(&ParameterSet::default(), 2442.0, 17517.0);
        assert_eq!(
            &recs[..4],
            &[
                Recommendation::IncreaseDetection,
                Recommendation::ScaleUpTpt,
                Recommendation::StrengthenTreatment,
                Recommendation::EngagePrivateSector,
            ]
        );
        // malnut_fraction 0.20 is not above the threshold
        assert!(!recs.contains(&Recommendation::AddressNutrition));
        assert!(matches!(recs[4], Recommendation::CombineInterventions(p) if p < 0.0));
        assert_eq!(recs.last(), Some(&Recommendation::RisingIncidence));
    }

    #[test]
    fn test_strong_programme_good_progress() {
        let recs = recommend(&strong_programme(), 1000.0, 600.0);
        assert_eq!(recs, vec![Recommendation::GoodProgress(40.0)]);
    }

    #[test]
    fn test_progress_threshold_is_inclusive() {
        let recs = recommend(&strong_programme(), 1000.0, 700.0);
        assert!(matches!(recs[0], Recommendation::GoodProgress(_)));

        let recs = recommend(&strong_programme(), 1000.0, 701.0);
        assert!(matches!(recs[0], Recommendation::CombineInterventions(_)));
    }

    #[test]
    fn test_risk_factor_rules() {
        let params = strong_programme()
            .with(ParameterKey::MalnutFraction, 0.3)
            .with(ParameterKey::HivPrevalence, 0.08)
            .with(ParameterKey::StockoutFrac, 0.1);
        let recs = recommend(&params, 1000.0, 900.0);
        assert_eq!(
            &recs[..3],
            &[
                Recommendation::AddressNutrition,
                Recommendation::IntegrateHivServices,
                Recommendation::StrengthenSupplyChain,
            ]
        );
    }

    #[test]
    fn test_zero_year1_reports_no_reduction() {
        let recs = recommend(&strong_programme(), 0.0, 0.0);
        assert_eq!(recs, vec![Recommendation::CombineInterventions(0.0)]);
    }

    #[test]
    fn test_joined() {
        let line = joined(&[
            Recommendation::StrengthenSupplyChain,
            Recommendation::GoodProgress(42.31),
        ]);
        assert_eq!(
            line,
            "Strengthen supply chain to avoid stockouts. || \
             Projected reduction Year1->Year5 = 42.3%: good progress; sustain scale-up."
        );
    }
}
