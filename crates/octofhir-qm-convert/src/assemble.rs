//! Group assembly shared by both dialects
//!
//! Dialect extractors hand over a [`GroupParts`] holding what the source
//! actually selected. Assembly lines the populations up against the scoring
//! template, fills missing slots with placeholders, resolves observation
//! references against the final population list and attaches the scoring
//! unit.

use crate::codes::measure_group_types;
use crate::config::ConverterConfig;
use crate::ids::IdGenerator;
use crate::template::{observed_population, template_for_name};
use crate::units::UnitTable;
use log::{debug, warn};
use octofhir_qm_model::{
    Group, MeasureDetails, MeasureObservation, MeasureScoring, Population, PopulationType, Stratification,
};

/// Everything a dialect extractor needs besides its payload
#[derive(Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub details: &'a MeasureDetails,
    pub units: &'a UnitTable,
    pub config: &'a ConverterConfig,
    pub ids: &'a dyn IdGenerator,
}

impl AssemblyContext<'_> {
    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }

    /// `"boolean"` for patient-based measures
    pub fn population_basis(&self) -> Option<String> {
        (self.details.patient_based == Some(true)).then(|| "boolean".to_string())
    }
}

/// An observation whose population reference is not yet checked
#[derive(Debug, Clone, PartialEq)]
pub struct PendingObservation {
    pub id: String,
    pub definition: String,
    pub description: Option<String>,
    /// Population id declared by the source, if any
    pub criteria_reference: Option<String>,
    pub aggregate_method: Option<String>,
}

/// A group as extracted from the source, before template reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupParts {
    pub id: Option<String>,
    pub scoring: Option<String>,
    pub populations: Vec<Population>,
    pub observations: Vec<PendingObservation>,
    pub stratifications: Vec<Stratification>,
    pub scoring_unit_code: Option<String>,
    pub rate_aggregation: Option<String>,
    pub improvement_notation: Option<String>,
}

/// Line selected populations up against a template.
///
/// Each slot takes the next selected population of its type, or a fresh
/// placeholder when none is left. After the last consecutive slot of a type,
/// any remaining populations of that type follow it, so a Ratio group with
/// two initial populations keeps both. Selected types absent from the
/// template are dropped.
pub fn reconcile_populations(
    template: &[PopulationType],
    selected: Vec<Population>,
    ids: &dyn IdGenerator,
) -> Vec<Population> {
    let mut pool: Vec<Option<Population>> = selected.into_iter().map(Some).collect();
    let mut populations = Vec::with_capacity(template.len());

    for (index, &slot) in template.iter().enumerate() {
        let taken = pool
            .iter_mut()
            .find(|p| matches!(p, Some(p) if p.name == slot))
            .and_then(Option::take);

        match taken {
            Some(population) => populations.push(population),
            None => {
                let placeholder = Population::empty(ids.next_id(), slot);
                debug!("Generated placeholder {} for {}", placeholder.id, slot);
                populations.push(placeholder);
            }
        }

        if template.get(index + 1) != Some(&slot) {
            populations.extend(
                pool.iter_mut()
                    .filter(|p| matches!(p, Some(p) if p.name == slot))
                    .filter_map(Option::take),
            );
        }
    }

    for dropped in pool.into_iter().flatten() {
        debug!("Dropped {} population {} not used by the scoring template", dropped.name, dropped.id);
    }

    populations
}

/// Turn pending observations into observations that reference a population
/// of `populations`.
///
/// A missing or dangling reference falls back to the first population of the
/// scoring's observed type; observations that still cannot be anchored are
/// dropped.
pub fn resolve_observations(
    populations: &[Population],
    observations: Vec<PendingObservation>,
    scoring: Option<MeasureScoring>,
) -> Vec<MeasureObservation> {
    let fallback = populations
        .iter()
        .find(|p| p.name == observed_population(scoring))
        .map(|p| p.id.clone());

    observations
        .into_iter()
        .filter_map(|observation| {
            let declared = observation
                .criteria_reference
                .filter(|reference| populations.iter().any(|p| &p.id == reference));

            let Some(criteria_reference) = declared.or_else(|| fallback.clone()) else {
                warn!(
                    "Dropping observation {}: no population in its group to reference",
                    observation.id
                );
                return None;
            };

            Some(MeasureObservation {
                id: observation.id,
                definition: observation.definition,
                description: observation.description,
                criteria_reference,
                aggregate_method: observation.aggregate_method,
            })
        })
        .collect()
}

/// Assemble a target group from extracted parts
pub fn assemble_group(parts: GroupParts, ctx: &AssemblyContext<'_>) -> Group {
    let id = parts.id.unwrap_or_else(|| ctx.next_id());
    let scoring = parts.scoring.as_deref().and_then(MeasureScoring::from_name);
    let template = template_for_name(parts.scoring.as_deref());

    let populations = reconcile_populations(template, parts.populations, ctx.ids);
    let observations = resolve_observations(&populations, parts.observations, scoring);

    let scoring_unit = parts.scoring_unit_code.as_deref().and_then(|code| {
        let unit = ctx.units.resolve(code, &ctx.config.units_system);
        if unit.is_none() && !code.trim().is_empty() {
            warn!("Scoring unit '{}' of group {} is not a known unit", code, id);
        }
        unit
    });

    debug!(
        "Assembled group {} ({}): {} populations, {} observations, {} stratifications",
        id,
        parts.scoring.as_deref().unwrap_or("no scoring"),
        populations.len(),
        observations.len(),
        parts.stratifications.len()
    );

    Group {
        id,
        scoring: parts.scoring,
        populations,
        measure_observations: (!observations.is_empty()).then_some(observations),
        stratifications: (!parts.stratifications.is_empty()).then_some(parts.stratifications),
        scoring_unit,
        population_basis: ctx.population_basis(),
        measure_group_types: measure_group_types(ctx.details.measure_type_selected_list.as_deref().unwrap_or(&[])),
        rate_aggregation: parts.rate_aggregation,
        improvement_notation: parts.improvement_notation,
    }
}
