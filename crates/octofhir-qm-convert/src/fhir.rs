//! FHIR dialect extraction
//!
//! Reads the subset of a FHIR Measure resource and its Library bundle that
//! the conversion needs: identifiers, scoring, groups and the CQL attachment
//! of the main library.

use crate::assemble::{AssemblyContext, GroupParts, PendingObservation, assemble_group};
use crate::codes::{POPULATION_CODING_SYSTEM, population_code_to_type, population_description};
use crate::config::ConverterConfig;
use base64::{Engine as _, engine::general_purpose};
use log::debug;
use octofhir_qm_diagnostics::{Payload, QM0100, QM0101, QM0103, QM0200, QM0201, QM0202, Result, TransferError};
use octofhir_qm_model::{Group, MeasureScoring, Population, PopulationType, Stratification};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

const EXT_SCORING: &str = "cqfm-scoring";
const EXT_SCORING_UNIT: &str = "cqfm-scoringUnit";
const EXT_CRITERIA_REFERENCE: &str = "cqfm-criteriaReference";
const EXT_AGGREGATE_METHOD: &str = "cqfm-aggregateMethod";

/// Content type of the CQL attachment in a Library
pub const CQL_CONTENT_TYPE: &str = "text/cql";

static USING_FHIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"using\s+FHIR\s+version\s+'[^']*'").expect("literal using-header pattern"));

// ============================================================================
// Resource subset
// ============================================================================

/// FHIR Measure resource (fields read by the converter)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureResource {
    pub name: Option<String>,
    pub identifier: Vec<Identifier>,
    pub library: Vec<String>,
    pub scoring: Option<CodeableConcept>,
    pub group: Vec<MeasureGroup>,
}

impl MeasureResource {
    /// Display name of the measure-level scoring
    pub fn scoring_display(&self) -> Option<&str> {
        self.scoring.as_ref().and_then(CodeableConcept::display)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Identifier {
    pub system: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Display of the first coding
    pub fn display(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.display.as_deref())
    }

    /// Code of the first coding
    pub fn code(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.code.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Coding {
    pub system: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extension {
    pub url: String,
    pub value_codeable_concept: Option<CodeableConcept>,
    pub value_coding: Option<Coding>,
    pub value_code: Option<String>,
    pub value_string: Option<String>,
}

impl Extension {
    fn is(&self, name: &str) -> bool {
        self.url.rsplit('/').next() == Some(name)
    }

    fn code(&self) -> Option<&str> {
        self.value_codeable_concept
            .as_ref()
            .and_then(CodeableConcept::code)
            .or_else(|| self.value_coding.as_ref().and_then(|c| c.code.as_deref()))
            .or(self.value_code.as_deref())
    }

    fn display(&self) -> Option<&str> {
        self.value_codeable_concept
            .as_ref()
            .and_then(CodeableConcept::display)
            .or_else(|| self.value_coding.as_ref().and_then(|c| c.display.as_deref()))
    }
}

fn find_extension<'a>(extensions: &'a [Extension], name: &str) -> Option<&'a Extension> {
    extensions.iter().find(|e| e.is(name))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Expression {
    pub language: Option<String>,
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeasureGroup {
    pub id: Option<String>,
    pub description: Option<String>,
    pub extension: Vec<Extension>,
    pub population: Vec<GroupPopulation>,
    pub stratifier: Vec<Stratifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupPopulation {
    pub id: Option<String>,
    pub code: Option<CodeableConcept>,
    pub criteria: Option<Expression>,
    pub extension: Vec<Extension>,
}

impl GroupPopulation {
    /// Population code, preferring the measure-population coding system
    fn population_code(&self) -> Option<&str> {
        let coding = &self.code.as_ref()?.coding;
        coding
            .iter()
            .find(|c| c.system.as_deref() == Some(POPULATION_CODING_SYSTEM))
            .or_else(|| coding.first())
            .and_then(|c| c.code.as_deref())
    }

    fn expression(&self) -> String {
        self.criteria
            .as_ref()
            .and_then(|c| c.expression.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Stratifier {
    pub id: Option<String>,
    pub description: Option<String>,
    pub criteria: Option<Expression>,
}

/// Library bundle
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibraryBundle {
    pub entry: Vec<BundleEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BundleEntry {
    pub resource: Option<LibraryResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibraryResource {
    pub url: Option<String>,
    pub name: Option<String>,
    pub content: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attachment {
    pub content_type: Option<String>,
    pub data: Option<String>,
}

/// Main library of a measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FhirLibrary {
    pub name: Option<String>,
    pub cql: String,
}

// ============================================================================
// Parsing
// ============================================================================

pub fn parse_measure_resource(json: &str) -> Result<MeasureResource> {
    serde_json::from_str(json).map_err(|e| TransferError::malformed(QM0100, Payload::MeasureResource, e.to_string()))
}

pub fn parse_library_bundle(json: &str) -> Result<LibraryBundle> {
    serde_json::from_str(json).map_err(|e| TransferError::malformed(QM0101, Payload::LibraryBundle, e.to_string()))
}

// ============================================================================
// Groups
// ============================================================================

/// Extract groups from measure resource JSON.
///
/// Empty resource text yields no groups. Continuous Variable measures are
/// not translated for this dialect and also yield no groups.
pub fn extract_groups(resource_json: &str, ctx: &AssemblyContext<'_>) -> Result<Vec<Group>> {
    if resource_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let resource = parse_measure_resource(resource_json)?;
    Ok(groups_from_resource(&resource, ctx))
}

/// Extract groups from an already parsed measure resource
pub fn groups_from_resource(resource: &MeasureResource, ctx: &AssemblyContext<'_>) -> Vec<Group> {
    let measure_scoring = resource
        .scoring_display()
        .or(ctx.details.meas_scoring.as_deref())
        .map(str::to_string);

    if measure_scoring.as_deref().and_then(MeasureScoring::from_name) == Some(MeasureScoring::ContinuousVariable) {
        debug!("Skipping groups of Continuous Variable FHIR measure");
        return Vec::new();
    }

    resource
        .group
        .iter()
        .map(|group| assemble_group(group_parts(group, measure_scoring.as_deref(), ctx), ctx))
        .collect()
}

fn group_parts(group: &MeasureGroup, measure_scoring: Option<&str>, ctx: &AssemblyContext<'_>) -> GroupParts {
    let scoring = find_extension(&group.extension, EXT_SCORING)
        .and_then(Extension::display)
        .or(measure_scoring)
        .map(str::to_string);

    let mut populations = Vec::new();
    let mut observations = Vec::new();

    for entry in &group.population {
        let population_type = population_code_to_type(entry.population_code().unwrap_or_default());
        let id = entry.id.clone().unwrap_or_else(|| ctx.next_id());

        if population_type == PopulationType::MeasureObservation {
            observations.push(PendingObservation {
                id,
                definition: entry.expression(),
                description: ctx.details.measure_observations.clone(),
                criteria_reference: find_extension(&entry.extension, EXT_CRITERIA_REFERENCE)
                    .and_then(|e| e.value_string.clone()),
                aggregate_method: find_extension(&entry.extension, EXT_AGGREGATE_METHOD)
                    .and_then(Extension::code)
                    .map(str::to_string),
            });
        } else {
            populations.push(Population {
                id,
                name: population_type,
                definition: entry.expression(),
                association_type: None,
                description: population_description(population_type, ctx.details),
            });
        }
    }

    let stratifications = group
        .stratifier
        .iter()
        .map(|stratifier| Stratification {
            id: stratifier.id.clone().unwrap_or_else(|| ctx.next_id()),
            description: stratifier
                .description
                .clone()
                .or_else(|| ctx.details.stratification.clone()),
            cql_definition: stratifier
                .criteria
                .as_ref()
                .and_then(|c| c.expression.clone())
                .unwrap_or_default(),
            association: PopulationType::InitialPopulation,
        })
        .collect();

    GroupParts {
        id: group.id.clone(),
        scoring,
        populations,
        observations,
        stratifications,
        scoring_unit_code: find_extension(&group.extension, EXT_SCORING_UNIT)
            .and_then(Extension::code)
            .map(str::to_string),
        rate_aggregation: None,
        improvement_notation: None,
    }
}

// ============================================================================
// Library
// ============================================================================

/// Locate the measure's main library in the bundle and decode its CQL.
///
/// The main library is the bundle entry whose URL contains the measure's
/// first library reference. The `using FHIR` header of the CQL is rewritten
/// to the configured QI-Core header.
pub fn extract_library(
    resource: &MeasureResource,
    library_json: &str,
    config: &ConverterConfig,
) -> Result<FhirLibrary> {
    let reference = resource
        .library
        .first()
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| TransferError::missing_reference(QM0202, "Measure resource declares no library"))?;

    let bundle = parse_library_bundle(library_json)?;
    let library = bundle
        .entry
        .iter()
        .filter_map(|entry| entry.resource.as_ref())
        .find(|library| library.url.as_deref().is_some_and(|url| url.contains(reference.as_str())))
        .ok_or_else(|| {
            TransferError::missing_reference_to(QM0200, "No library entry matches the measure library", reference)
        })?;

    let data = library
        .content
        .iter()
        .find(|c| c.content_type.as_deref() == Some(CQL_CONTENT_TYPE))
        .and_then(|c| c.data.as_deref())
        .ok_or_else(|| TransferError::missing_reference_to(QM0201, "Main library has no CQL attachment", reference))?;

    let bytes = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| TransferError::malformed(QM0103, Payload::CqlContent, e.to_string()))?;
    let cql = String::from_utf8_lossy(&bytes);

    Ok(FhirLibrary {
        name: library.name.clone(),
        cql: rewrite_using_header(&cql, &config.using_header),
    })
}

/// Replace the first `using FHIR version '...'` declaration with `header`
pub fn rewrite_using_header(cql: &str, header: &str) -> String {
    USING_FHIR.replace(cql, regex::NoExpand(header)).into_owned()
}
