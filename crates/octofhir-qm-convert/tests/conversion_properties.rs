//! Properties that hold for every conversion, whichever dialect the record uses

mod common;

use common::*;
use octofhir_qm_convert::{ConverterConfig, MatMeasure, MeasureConverter, TransferError, UnitTable, UuidIdGenerator};
use octofhir_qm_model::Measure;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn all_records() -> Vec<(&'static str, MatMeasure)> {
    vec![
        ("fhir proportion", fhir_proportion_record()),
        ("qdm ratio", qdm_record("Ratio", "qdm_ratio.xml")),
        ("qdm continuous variable", qdm_record("Continuous Variable", "qdm_continuous_variable.xml")),
        ("qdm proportion", qdm_record("Proportion", "qdm_proportion.xml")),
        ("qdm units", qdm_record("Cohort", "qdm_ucum_units.xml")),
    ]
}

fn convert_with_random_ids(record: &MatMeasure) -> Measure {
    let units = UnitTable::bundled().unwrap();
    MeasureConverter::new(
        &units,
        &UuidIdGenerator,
        ConverterConfig::default().with_reference_year(TEST_YEAR),
    )
    .convert(record)
    .unwrap()
}

#[test]
fn test_conversion_is_deterministic_up_to_ids() {
    for (name, record) in all_records() {
        let first = convert(&record).unwrap();
        let second = convert_with_random_ids(&record);
        assert_eq!(without_ids(&first), without_ids(&second), "{}", name);
    }
}

#[test]
fn test_observations_always_reference_group_populations() {
    for (_, record) in all_records() {
        let measure = convert(&record).unwrap();
        assert_observations_reference_populations(&measure);
    }
}

#[test]
fn test_every_population_has_an_id() {
    for (name, record) in all_records() {
        let measure = convert(&record).unwrap();
        for group in &measure.groups {
            assert!(!group.id.is_empty(), "{}: group without id", name);
            for population in &group.populations {
                assert!(!population.id.is_empty(), "{}: population without id", name);
            }
        }
    }
}

#[test]
fn test_generated_ids_are_unique_within_a_measure() {
    for (name, record) in all_records() {
        let measure = convert(&record).unwrap();
        let mut ids: Vec<&str> = measure
            .groups
            .iter()
            .flat_map(|g| g.populations.iter().map(|p| p.id.as_str()))
            .filter(|id| id.starts_with("gen-"))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total, "{}", name);
    }
}

#[test]
fn test_serialized_record_converts_like_the_record() {
    let units = UnitTable::bundled().unwrap();
    for (name, record) in all_records() {
        let json = serde_json::to_string(&record).unwrap();
        let ids = octofhir_qm_convert::SequentialIdGenerator::new("gen");
        let from_json = MeasureConverter::new(&units, &ids, ConverterConfig::default().with_reference_year(TEST_YEAR))
            .convert_json(&json)
            .unwrap();

        assert_eq!(from_json, convert(&record).unwrap(), "{}", name);
    }
}

#[test]
fn test_empty_record_is_rejected() {
    let err = convert(&MatMeasure::default()).unwrap_err();
    assert!(matches!(err, TransferError::EmptyInput { .. }));
    assert!(err.is_conversion_error());
}

#[rstest]
#[case(Some("0.0"), Some("1"), "0.0.1")]
#[case(Some("1.2"), Some("7"), "1.2.7")]
#[case(None, None, "0.0.0")]
fn test_version_string(#[case] version: Option<&str>, #[case] revision: Option<&str>, #[case] expected: &str) {
    let mut record = qdm_record("Cohort", "qdm_ucum_units.xml");
    if let Some(details) = record.manage_measure_detail_model.as_mut() {
        details.version_number = version.map(str::to_string);
        details.revision_number = revision.map(str::to_string);
    }
    assert_eq!(convert(&record).unwrap().version, expected);
}

#[test]
fn test_malformed_version_aborts() {
    let mut record = qdm_record("Cohort", "qdm_ucum_units.xml");
    if let Some(details) = record.manage_measure_detail_model.as_mut() {
        details.version_number = Some("1.x".to_string());
    }
    let err = convert(&record).unwrap_err();
    assert!(matches!(err, TransferError::Format { .. }));
}

#[test]
fn test_measurement_period_follows_source_dates() {
    let mut record = fhir_proportion_record();
    if let Some(details) = record.manage_measure_detail_model.as_mut() {
        details.meas_from_period = Some("01/01/2024".to_string());
        details.meas_to_period = Some("2024-06-30".to_string());
    }
    let measure = convert(&record).unwrap();

    assert_eq!(measure.measurement_period_start, "2024-01-01T00:00:00.000Z");
    assert_eq!(measure.measurement_period_end, "2024-06-30T23:59:59.999Z");
}
