//! Static code tables
//!
//! Vocabulary lookups shared by both dialects. Every function here is total:
//! unrecognized input maps to a documented default instead of failing.

use octofhir_qm_model::{BaseConfigurationType, MeasureDetails, MeasureGroupType, MeasureType, PopulationType};

/// Coding system of FHIR measure population codes
pub const POPULATION_CODING_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/measure-population";

/// Map a population code to its canonical type.
///
/// Accepts the FHIR kebab-case codes (`numerator-exclusion`) and the QDM
/// camelCase clause types (`numeratorExclusion`). Anything else is treated as
/// an initial population.
pub fn population_code_to_type(code: &str) -> PopulationType {
    match code.trim() {
        "initial-population" | "initialPopulation" => PopulationType::InitialPopulation,
        "numerator" => PopulationType::Numerator,
        "numerator-exclusion" | "numeratorExclusion" => PopulationType::NumeratorExclusion,
        "denominator" => PopulationType::Denominator,
        "denominator-exclusion" | "denominatorExclusion" => PopulationType::DenominatorExclusion,
        "denominator-exception" | "denominatorException" => PopulationType::DenominatorException,
        "measure-population" | "measurePopulation" => PopulationType::MeasurePopulation,
        "measure-population-exclusion" | "measurePopulationExclusion" => {
            PopulationType::MeasurePopulationExclusion
        }
        "measure-observation" | "measureObservation" => PopulationType::MeasureObservation,
        _ => PopulationType::InitialPopulation,
    }
}

/// Whether a code names a population kind at all (as opposed to a stratum,
/// stratification or some other clause type)
pub fn is_population_code(code: &str) -> bool {
    matches!(
        code.trim(),
        "initial-population"
            | "initialPopulation"
            | "numerator"
            | "numerator-exclusion"
            | "numeratorExclusion"
            | "denominator"
            | "denominator-exclusion"
            | "denominatorExclusion"
            | "denominator-exception"
            | "denominatorException"
            | "measure-population"
            | "measurePopulation"
            | "measure-population-exclusion"
            | "measurePopulationExclusion"
    )
}

/// Map a measure type description to a group type, defaulting to Outcome
pub fn measure_type_to_group_type(description: &str) -> MeasureGroupType {
    match description.trim() {
        "Appropriate Use Process" | "Process" => MeasureGroupType::Process,
        "Cost/Resource Use" | "Efficiency" | "Structure" => MeasureGroupType::Structure,
        "Patient Engagement/Experience" | "Patient Reported Outcome Performance" => {
            MeasureGroupType::PatientReportedOutcome
        }
        _ => MeasureGroupType::Outcome,
    }
}

/// Map selected measure types to group types, deduplicated in first-seen order
pub fn measure_group_types(selected: &[MeasureType]) -> Vec<MeasureGroupType> {
    let mut types = Vec::new();
    for measure_type in selected {
        let group_type = measure_type_to_group_type(measure_type.description.as_deref().unwrap_or(""));
        if !types.contains(&group_type) {
            types.push(group_type);
        }
    }
    types
}

/// Map a measure type description to its base configuration type, defaulting to Outcome
pub fn measure_type_to_base_configuration(description: &str) -> BaseConfigurationType {
    match description.trim() {
        "Appropriate Use Process" => BaseConfigurationType::AppropriateUseProcess,
        "Cost/Resource Use" => BaseConfigurationType::CostResourceUse,
        "Efficiency" => BaseConfigurationType::Efficiency,
        "Intermediate Clinical Outcome" => BaseConfigurationType::IntermediateClinicalOutcome,
        "Patient Engagement/Experience" => BaseConfigurationType::PatientEngagementExperience,
        "Patient Reported Outcome Performance" | "Patient Reported Outcome" => {
            BaseConfigurationType::PatientReportedOutcome
        }
        "Process" => BaseConfigurationType::Process,
        "Structure" => BaseConfigurationType::Structure,
        _ => BaseConfigurationType::Outcome,
    }
}

/// One base configuration type per selected measure type, in selection order.
///
/// A measure with nothing selected is an Outcome measure.
pub fn base_configuration_types(selected: &[MeasureType]) -> Vec<BaseConfigurationType> {
    if selected.is_empty() {
        return vec![BaseConfigurationType::Outcome];
    }
    selected
        .iter()
        .map(|t| measure_type_to_base_configuration(t.description.as_deref().unwrap_or("")))
        .collect()
}

/// Free-text description of a population type, taken from the measure details
pub fn population_description(population_type: PopulationType, details: &MeasureDetails) -> Option<String> {
    let description = match population_type {
        PopulationType::InitialPopulation => &details.initial_pop,
        PopulationType::Numerator => &details.numerator,
        PopulationType::NumeratorExclusion => &details.numerator_exclusions,
        PopulationType::Denominator => &details.denominator,
        PopulationType::DenominatorExclusion => &details.denominator_exclusions,
        PopulationType::DenominatorException => &details.denominator_exceptions,
        PopulationType::MeasurePopulation => &details.measure_population,
        PopulationType::MeasurePopulationExclusion => &details.measure_population_exclusions,
        PopulationType::MeasureObservation => &details.measure_observations,
    };
    description.clone()
}
