//! Population templates per scoring method

use octofhir_qm_model::{MeasureScoring, PopulationType};

const COHORT: &[PopulationType] = &[PopulationType::InitialPopulation];

const PROPORTION: &[PopulationType] = &[
    PopulationType::InitialPopulation,
    PopulationType::Denominator,
    PopulationType::DenominatorExclusion,
    PopulationType::DenominatorException,
    PopulationType::Numerator,
    PopulationType::NumeratorExclusion,
];

const RATIO: &[PopulationType] = &[
    PopulationType::InitialPopulation,
    PopulationType::Denominator,
    PopulationType::DenominatorExclusion,
    PopulationType::Numerator,
    PopulationType::NumeratorExclusion,
];

const CONTINUOUS_VARIABLE: &[PopulationType] = &[
    PopulationType::InitialPopulation,
    PopulationType::MeasurePopulation,
    PopulationType::MeasurePopulationExclusion,
];

/// Ordered population slots expected for a scoring method
pub fn template_for(scoring: MeasureScoring) -> &'static [PopulationType] {
    match scoring {
        MeasureScoring::Cohort => COHORT,
        MeasureScoring::Proportion => PROPORTION,
        MeasureScoring::Ratio => RATIO,
        MeasureScoring::ContinuousVariable => CONTINUOUS_VARIABLE,
    }
}

/// Template for a scoring display name; unknown names get no slots
pub fn template_for_name(scoring: Option<&str>) -> &'static [PopulationType] {
    scoring
        .and_then(MeasureScoring::from_name)
        .map(template_for)
        .unwrap_or(&[])
}

/// Population type an observation refers to when it names no valid population
pub fn observed_population(scoring: Option<MeasureScoring>) -> PopulationType {
    match scoring {
        Some(MeasureScoring::Ratio) => PopulationType::Denominator,
        _ => PopulationType::MeasurePopulation,
    }
}
