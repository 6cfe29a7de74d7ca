//! Target measure model accepted by the measure authoring service
//!
//! Field names serialize in camelCase to match the service's JSON contract.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Enumerations
// ============================================================================

/// Target data model of a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "QI-Core v4.1.1")]
    QiCore,
    #[serde(rename = "QDM v5.6")]
    Qdm56,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::QiCore => write!(f, "QI-Core v4.1.1"),
            Model::Qdm56 => write!(f, "QDM v5.6"),
        }
    }
}

/// Measure state in the authoring service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeasureState {
    #[default]
    Draft,
    Versioned,
}

/// Statistical scoring method of a measure or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureScoring {
    Cohort,
    Proportion,
    Ratio,
    #[serde(rename = "Continuous Variable")]
    ContinuousVariable,
}

impl MeasureScoring {
    /// Parse a scoring display name such as "Continuous Variable"
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Cohort" => Some(Self::Cohort),
            "Proportion" => Some(Self::Proportion),
            "Ratio" => Some(Self::Ratio),
            "Continuous Variable" => Some(Self::ContinuousVariable),
            _ => None,
        }
    }

    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cohort => "Cohort",
            Self::Proportion => "Proportion",
            Self::Ratio => "Ratio",
            Self::ContinuousVariable => "Continuous Variable",
        }
    }
}

impl fmt::Display for MeasureScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical population type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PopulationType {
    InitialPopulation,
    Numerator,
    NumeratorExclusion,
    Denominator,
    DenominatorExclusion,
    DenominatorException,
    MeasurePopulation,
    MeasurePopulationExclusion,
    MeasureObservation,
}

impl PopulationType {
    /// camelCase code used by the service and by QDM clause types
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InitialPopulation => "initialPopulation",
            Self::Numerator => "numerator",
            Self::NumeratorExclusion => "numeratorExclusion",
            Self::Denominator => "denominator",
            Self::DenominatorExclusion => "denominatorExclusion",
            Self::DenominatorException => "denominatorException",
            Self::MeasurePopulation => "measurePopulation",
            Self::MeasurePopulationExclusion => "measurePopulationExclusion",
            Self::MeasureObservation => "measureObservation",
        }
    }
}

impl fmt::Display for PopulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which ratio component an initial population feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationType {
    Numerator,
    Denominator,
}

/// Measure type carried on the measure itself, one per selected source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseConfigurationType {
    #[serde(rename = "Appropriate Use Process")]
    AppropriateUseProcess,
    #[serde(rename = "Cost/Resource Use")]
    CostResourceUse,
    Efficiency,
    #[serde(rename = "Intermediate Clinical Outcome")]
    IntermediateClinicalOutcome,
    Outcome,
    #[serde(rename = "Patient Engagement/Experience")]
    PatientEngagementExperience,
    #[serde(rename = "Patient Reported Outcome")]
    PatientReportedOutcome,
    Process,
    Structure,
}

/// Coarse measure type category attached to each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureGroupType {
    Process,
    Structure,
    Outcome,
    #[serde(rename = "Patient Reported Outcome")]
    PatientReportedOutcome,
}

// ============================================================================
// Measure
// ============================================================================

/// Target measure record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_set_id: Option<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<String>,
    pub state: MeasureState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cql_library_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecqm_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_basis: Option<bool>,
    pub measurement_period_start: String,
    pub measurement_period_end: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cms_id: Option<String>,
    pub measure_meta_data: MeasureMetadata,
    pub groups: Vec<Group>,
    pub base_configuration_types: Vec<BaseConfigurationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplemental_data: Option<Vec<DefDescPair>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplemental_data_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_adjustments: Option<Vec<DefDescPair>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_adjustment_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_aggregation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_notation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
}

/// A CQL definition paired with a description (supplemental data, risk adjustment)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefDescPair {
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Metadata
// ============================================================================

/// Measure metadata block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steward: Option<Organization>,
    pub developers: Vec<Organization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_recommendation: Option<String>,
    pub references: Vec<Reference>,
    pub endorsements: Vec<Endorsement>,
    pub measure_definitions: Vec<MeasureDefinition>,
    pub experimental: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_format: Option<String>,
}

/// Steward or developer organization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
}

/// Literature or guideline reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub id: String,
    pub reference_text: String,
}

/// Measure endorsement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endorsement {
    pub endorser: String,
    pub endorser_system_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endorsement_id: Option<String>,
}

/// Glossary term of a measure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDefinition {
    pub id: String,
    pub term: String,
    pub definition: String,
}

// ============================================================================
// Groups
// ============================================================================

/// Measure group (one scoring unit)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring: Option<String>,
    pub populations: Vec<Population>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_observations: Option<Vec<MeasureObservation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stratifications: Option<Vec<Stratification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring_unit: Option<ScoringUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population_basis: Option<String>,
    pub measure_group_types: Vec<MeasureGroupType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_aggregation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_notation: Option<String>,
}

impl Group {
    /// Find a population by id
    pub fn population(&self, id: &str) -> Option<&Population> {
        self.populations.iter().find(|p| p.id == id)
    }

    /// Observations of this group, empty when there are none
    pub fn observations(&self) -> &[MeasureObservation] {
        self.measure_observations.as_deref().unwrap_or(&[])
    }
}

/// Population slot within a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Population {
    pub id: String,
    pub name: PopulationType,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association_type: Option<AssociationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Population {
    /// A population with no definition
    pub fn empty(id: impl Into<String>, name: PopulationType) -> Self {
        Self {
            id: id.into(),
            name,
            definition: String::new(),
            association_type: None,
            description: None,
        }
    }
}

/// Aggregation over a referenced population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureObservation {
    pub id: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of a population in the same group
    pub criteria_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_method: Option<String>,
}

/// Stratification of a population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stratification {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cql_definition: String,
    pub association: PopulationType,
}

/// Scoring unit: display label plus unit descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringUnit {
    pub label: String,
    pub value: UnitDescriptor,
}

/// Canonical unit descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    pub code: String,
    pub guidance: Option<String>,
    pub name: String,
    pub system: String,
}
