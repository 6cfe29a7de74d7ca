//! Measure metadata block

use crate::config::ConverterConfig;
use crate::ids::IdGenerator;
use octofhir_qm_model::{
    Endorsement, MeasureDefinition, MeasureDetails, MeasureMetadata, Organization, Reference,
};

/// Build the metadata block from the measure details
pub fn map_metadata(details: &MeasureDetails, config: &ConverterConfig, ids: &dyn IdGenerator) -> MeasureMetadata {
    MeasureMetadata {
        steward: steward(details),
        developers: developers(details),
        description: details.description.clone(),
        copyright: details.copyright.clone(),
        disclaimer: details.disclaimer.clone(),
        rationale: details.rationale.clone(),
        guidance: details.guidance.clone(),
        clinical_recommendation: details.clinical_recomms.clone(),
        references: references(details, ids),
        endorsements: endorsements(details, config),
        measure_definitions: measure_definitions(details, ids),
        experimental: details.experimental.unwrap_or(false),
        transmission_format: details.transmission_format.clone(),
    }
}

/// Selected steward organization, or the free-text steward name
fn steward(details: &MeasureDetails) -> Option<Organization> {
    let selected = details
        .steward_selected_list
        .as_deref()
        .and_then(<[_]>::first)
        .and_then(|steward| {
            Some(Organization {
                name: steward.org_name.clone()?,
                oid: steward.org_oid.clone(),
            })
        });

    selected.or_else(|| {
        details.steward_value.as_ref().map(|name| Organization {
            name: name.clone(),
            oid: None,
        })
    })
}

fn developers(details: &MeasureDetails) -> Vec<Organization> {
    details
        .author_selected_list
        .iter()
        .flatten()
        .filter_map(|author| author.author_name.clone())
        .map(|name| Organization { name, oid: None })
        .collect()
}

fn references(details: &MeasureDetails, ids: &dyn IdGenerator) -> Vec<Reference> {
    details
        .references_list
        .iter()
        .flatten()
        .map(|text| Reference {
            id: ids.next_id(),
            reference_text: text.clone(),
        })
        .collect()
}

/// At most one endorsement, present only when the measure is endorsed
fn endorsements(details: &MeasureDetails, config: &ConverterConfig) -> Vec<Endorsement> {
    if details.endorse_by_nqf != Some(true) {
        return Vec::new();
    }
    vec![Endorsement {
        endorser: config.endorser.clone(),
        endorser_system_id: config.endorser_system_id.clone(),
        endorsement_id: details.nqf_id.clone().or_else(|| details.endorsement_id.clone()),
    }]
}

fn measure_definitions(details: &MeasureDetails, ids: &dyn IdGenerator) -> Vec<MeasureDefinition> {
    match details.definitions.as_deref().map(str::trim) {
        Some(definition) if !definition.is_empty() => vec![MeasureDefinition {
            id: ids.next_id(),
            term: String::new(),
            definition: definition.to_string(),
        }],
        _ => Vec::new(),
    }
}
