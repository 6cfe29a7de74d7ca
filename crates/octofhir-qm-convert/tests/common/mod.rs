//! Shared fixtures for conversion tests
//!
//! QDM documents are read from `tests/fixtures`; FHIR resources are built
//! inline with `json!` so each test shows the resource shape it depends on.

#![allow(dead_code)]

use base64::{Engine as _, engine::general_purpose};
use octofhir_qm_convert::{ConverterConfig, MeasureConverter, Result, SequentialIdGenerator, UnitTable};
use octofhir_qm_model::{MatMeasure, Measure, MeasureDetails, MeasureType};
use serde_json::{Value, json};
use std::path::PathBuf;

pub const MEASURE_LIBRARY_URL: &str = "http://ecqi.healthit.gov/ecqms/Library/TestMeasure";
pub const TEST_YEAR: i32 = 2023;

pub const FHIR_CQL: &str = "library TestMeasure version '0.0.000'\n\
using FHIR version '4.0.1'\n\
include FHIRHelpers version '4.0.001' called FHIRHelpers\n\
define \"Initial Population\": true\n";

/// Read a fixture file
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}

/// Convert with the bundled units, sequential ids and a pinned year
pub fn convert(record: &MatMeasure) -> Result<Measure> {
    let units = UnitTable::bundled()?;
    let ids = SequentialIdGenerator::new("gen");
    MeasureConverter::new(&units, &ids, ConverterConfig::default().with_reference_year(TEST_YEAR)).convert(record)
}

pub fn details(model: &str, scoring: &str) -> MeasureDetails {
    MeasureDetails {
        id: Some("8a4d8c817e9d4c8a017ea4e0a1a5001a".to_string()),
        measure_name: Some(format!("{} {}", model, scoring)),
        measure_model: Some(model.to_string()),
        fhir: Some(model == "FHIR"),
        short_name: Some("TM".to_string()),
        version_number: Some("0.0".to_string()),
        revision_number: Some("1".to_string()),
        measure_set_id: Some("2c7dd2d5-7a7c-4e74-8d7b-7a2b6c2e1234".to_string()),
        draft: Some(true),
        meas_scoring: Some(scoring.to_string()),
        patient_based: Some(true),
        e_measure_id: Some(1175),
        steward_value: Some("SemanticBits".to_string()),
        measure_type_selected_list: Some(vec![MeasureType {
            id: Some("1".to_string()),
            description: Some("Process".to_string()),
            abbr_name: Some("PROCESS".to_string()),
        }]),
        references_list: Some(vec!["Reference A".to_string()]),
        endorse_by_nqf: Some(true),
        nqf_id: Some("0101".to_string()),
        definitions: Some("Definitions text".to_string()),
        supplemental_data: Some("SDE description".to_string()),
        risk_adjustment: Some("RA description".to_string()),
        rate_aggregation: Some("This is Example of RA".to_string()),
        improv_notations: Some("Increased score indicates improvement".to_string()),
        stratification: Some("Stratified by age".to_string()),
        initial_pop: Some("All patients".to_string()),
        denominator: Some("Equals initial population".to_string()),
        numerator: Some("Patients meeting criteria".to_string()),
        measure_population: Some("Patients with encounters".to_string()),
        measure_observations: Some("Encounter duration".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// FHIR
// ============================================================================

pub fn population(id: &str, code: &str, expression: &str) -> Value {
    json!({
        "id": id,
        "code": {"coding": [{
            "system": "http://terminology.hl7.org/CodeSystem/measure-population",
            "code": code,
            "display": code
        }]},
        "criteria": {"language": "text/cql-identifier", "expression": expression}
    })
}

pub fn observation(id: &str, expression: &str, reference: &str, aggregate: &str) -> Value {
    let mut value = population(id, "measure-observation", expression);
    value["extension"] = json!([
        {
            "url": "http://hl7.org/fhir/us/cqfmeasures/StructureDefinition/cqfm-criteriaReference",
            "valueString": reference
        },
        {
            "url": "http://hl7.org/fhir/us/cqfmeasures/StructureDefinition/cqfm-aggregateMethod",
            "valueCodeableConcept": {"coding": [{"code": aggregate}]}
        }
    ]);
    value
}

pub fn measure_resource(scoring: &str, groups: Vec<Value>, identifiers: Vec<Value>) -> Value {
    json!({
        "resourceType": "Measure",
        "name": "TestMeasure",
        "identifier": identifiers,
        "library": [MEASURE_LIBRARY_URL],
        "scoring": {"coding": [{
            "system": "http://terminology.hl7.org/CodeSystem/measure-scoring",
            "code": scoring.to_lowercase(),
            "display": scoring
        }]},
        "group": groups
    })
}

pub fn library_bundle(url: &str, cql: &str) -> Value {
    json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": [
            {"resource": {
                "resourceType": "Library",
                "url": "http://ecqi.healthit.gov/ecqms/Library/FHIRHelpers",
                "name": "FHIRHelpers",
                "content": [{"contentType": "text/cql", "data": general_purpose::STANDARD.encode("library FHIRHelpers")}]
            }},
            {"resource": {
                "resourceType": "Library",
                "url": url,
                "name": "TestMeasure",
                "content": [{"contentType": "text/cql", "data": general_purpose::STANDARD.encode(cql)}]
            }}
        ]
    })
}

pub fn fhir_record(details: MeasureDetails, resource: &Value, bundle: &Value) -> MatMeasure {
    MatMeasure {
        harp_id: Some("test.user".to_string()),
        email_id: Some("test.user@example.com".to_string()),
        manage_measure_detail_model: Some(details),
        fhir_measure_resource_json: Some(resource.to_string()),
        fhir_library_resources_json: Some(bundle.to_string()),
        ..Default::default()
    }
}

/// A FHIR record with one proportion group selecting three populations
pub fn fhir_proportion_record() -> MatMeasure {
    let resource = measure_resource(
        "Proportion",
        vec![json!({
            "id": "group-1",
            "population": [
                population("ipp", "initial-population", "Initial Population"),
                population("den", "denominator", "Denominator"),
                population("num", "numerator", "Numerator"),
            ],
            "stratifier": [{"id": "strat-1", "criteria": {"expression": "Stratification 1"}}]
        })],
        vec![],
    );
    fhir_record(
        details("FHIR", "Proportion"),
        &resource,
        &library_bundle(MEASURE_LIBRARY_URL, FHIR_CQL),
    )
}

// ============================================================================
// QDM
// ============================================================================

pub fn qdm_record(scoring: &str, fixture_name: &str) -> MatMeasure {
    MatMeasure {
        harp_id: Some("test.user".to_string()),
        email_id: Some("test.user@example.com".to_string()),
        manage_measure_detail_model: Some(details("QDM", scoring)),
        simple_xml: Some(fixture(fixture_name)),
        cql: Some("library QdmMeasure version '0.0.001'\nusing QDM version '5.6'\n".to_string()),
        cql_library_name: Some("QdmMeasure".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Every observation references a population of its own group
pub fn assert_observations_reference_populations(measure: &Measure) {
    for group in &measure.groups {
        for observation in group.observations() {
            assert!(
                group.population(&observation.criteria_reference).is_some(),
                "observation {} in group {} references missing population {}",
                observation.id,
                group.id,
                observation.criteria_reference
            );
        }
    }
}

/// Serialized measure with every generated or source identifier blanked
pub fn without_ids(measure: &Measure) -> Value {
    fn strip(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if key == "id" || key == "criteriaReference" {
                        *child = Value::Null;
                    } else {
                        strip(child);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(strip),
            _ => {}
        }
    }

    let mut value = serde_json::to_value(measure).unwrap_or(Value::Null);
    strip(&mut value);
    value
}
