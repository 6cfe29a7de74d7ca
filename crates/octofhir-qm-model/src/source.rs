//! Source measure record as exported by the legacy authoring tool
//!
//! One record describes exactly one measure. The measure content travels in
//! one of two shapes: a FHIR measure resource plus library bundle (both JSON
//! text), or a QDM "simple measure" XML document with the CQL embedded next
//! to it. [`MatMeasure::payload`] turns the record into a [`MeasurePayload`]
//! so callers match on the dialect instead of probing fields.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

// ============================================================================
// Record
// ============================================================================

/// Source measure record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatMeasure {
    /// Submitting user id (HARP id)
    #[serde(default)]
    pub harp_id: Option<String>,
    /// Address notified about the outcome of the transfer
    #[serde(default)]
    pub email_id: Option<String>,
    /// Measure details block
    #[serde(default)]
    pub manage_measure_detail_model: Option<MeasureDetails>,
    /// FHIR measure resource (JSON text)
    #[serde(default)]
    pub fhir_measure_resource_json: Option<String>,
    /// FHIR library bundle (JSON text)
    #[serde(default)]
    pub fhir_library_resources_json: Option<String>,
    /// QDM simple measure (XML text)
    #[serde(default)]
    pub simple_xml: Option<String>,
    /// QDM measure CQL
    #[serde(default)]
    pub cql: Option<String>,
    /// QDM measure CQL library name
    #[serde(default)]
    pub cql_library_name: Option<String>,
}

impl MatMeasure {
    /// Measure details, if the record has any
    pub fn details(&self) -> Option<&MeasureDetails> {
        self.manage_measure_detail_model.as_ref()
    }

    /// Dialect-specific payload, discriminated by the details' model field
    pub fn payload(&self) -> MeasurePayload<'_> {
        let model = self
            .details()
            .map(MeasureDetails::source_model)
            .unwrap_or(SourceModel::Fhir);

        match model {
            SourceModel::Fhir => MeasurePayload::Fhir(FhirPayload {
                measure_resource_json: self.fhir_measure_resource_json.as_deref().unwrap_or(""),
                library_resources_json: self.fhir_library_resources_json.as_deref().unwrap_or(""),
            }),
            SourceModel::Qdm => MeasurePayload::Qdm(QdmPayload {
                simple_xml: self.simple_xml.as_deref().unwrap_or(""),
                cql: self.cql.as_deref().unwrap_or(""),
                cql_library_name: self.cql_library_name.as_deref(),
            }),
        }
    }
}

/// Source dialect of a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceModel {
    /// FHIR measure resource with JSON library bundle
    Fhir,
    /// QDM simple measure XML
    Qdm,
}

/// Dialect payload borrowed from a [`MatMeasure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurePayload<'a> {
    Fhir(FhirPayload<'a>),
    Qdm(QdmPayload<'a>),
}

/// FHIR-dialect payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FhirPayload<'a> {
    pub measure_resource_json: &'a str,
    pub library_resources_json: &'a str,
}

/// QDM-dialect payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QdmPayload<'a> {
    pub simple_xml: &'a str,
    pub cql: &'a str,
    pub cql_library_name: Option<&'a str>,
}

// ============================================================================
// Measure Details
// ============================================================================

/// Measure details block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureDetails {
    pub id: Option<String>,
    pub measure_name: Option<String>,
    /// Model name, "QDM" or "FHIR"
    pub measure_model: Option<String>,
    pub fhir: Option<bool>,
    pub short_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub version_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub revision_number: Option<String>,
    pub measure_id: Option<String>,
    pub measure_set_id: Option<String>,
    pub draft: Option<bool>,
    #[serde(rename = "cqllibraryName")]
    pub cql_library_name: Option<String>,
    pub meas_scoring: Option<String>,
    pub patient_based: Option<bool>,
    pub meas_from_period: Option<String>,
    pub meas_to_period: Option<String>,
    #[serde(rename = "eMeasureId")]
    pub e_measure_id: Option<i64>,
    pub experimental: Option<bool>,

    // Stewardship and authorship
    pub steward_value: Option<String>,
    pub steward_selected_list: Option<Vec<MeasureSteward>>,
    pub author_selected_list: Option<Vec<Author>>,
    pub measure_type_selected_list: Option<Vec<MeasureType>>,
    pub references_list: Option<Vec<String>>,

    // Endorsement
    #[serde(rename = "endorseByNQF")]
    pub endorse_by_nqf: Option<bool>,
    pub nqf_id: Option<String>,
    pub endorsement: Option<String>,
    pub endorsement_id: Option<String>,

    // Narrative
    pub description: Option<String>,
    pub copyright: Option<String>,
    pub disclaimer: Option<String>,
    pub rationale: Option<String>,
    pub guidance: Option<String>,
    pub clinical_recomms: Option<String>,
    pub definitions: Option<String>,
    pub transmission_format: Option<String>,
    pub supplemental_data: Option<String>,
    pub risk_adjustment: Option<String>,
    pub rate_aggregation: Option<String>,
    pub improv_notations: Option<String>,
    pub stratification: Option<String>,

    // Population descriptions
    pub initial_pop: Option<String>,
    pub denominator: Option<String>,
    pub denominator_exclusions: Option<String>,
    pub denominator_exceptions: Option<String>,
    pub numerator: Option<String>,
    pub numerator_exclusions: Option<String>,
    pub measure_population: Option<String>,
    pub measure_population_exclusions: Option<String>,
    pub measure_observations: Option<String>,
}

impl MeasureDetails {
    /// Dialect selected by the model discriminator.
    ///
    /// Only an explicit "QDM" model selects the XML dialect; everything else,
    /// including a missing model, is treated as FHIR.
    pub fn source_model(&self) -> SourceModel {
        match self.measure_model.as_deref().map(str::trim) {
            Some(model) if model.eq_ignore_ascii_case("QDM") && self.fhir != Some(true) => {
                SourceModel::Qdm
            }
            _ => SourceModel::Fhir,
        }
    }
}

/// Selected measure author (developer)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub id: Option<String>,
    pub author_name: Option<String>,
    pub org_id: Option<String>,
}

/// Selected measure steward
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureSteward {
    pub id: Option<String>,
    pub org_name: Option<String>,
    pub org_oid: Option<String>,
}

/// Selected measure type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureType {
    pub id: Option<String>,
    pub description: Option<String>,
    pub abbr_name: Option<String>,
}

/// Accept strings, numbers and booleans for fields the exporter is loose about
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(s)) => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
