//! QDM group, supplemental data and risk adjustment extraction

use super::xml::XmlElement;
use crate::assemble::{AssemblyContext, GroupParts, PendingObservation, assemble_group};
use crate::codes::{is_population_code, population_code_to_type, population_description};
use log::debug;
use octofhir_qm_model::{
    AssociationType, DefDescPair, Group, MeasureScoring, Population, PopulationType, Stratification,
};
use std::collections::HashMap;

const TYPE_MEASURE_OBSERVATION: &str = "measureObservation";
const TYPE_STRATIFICATION: &str = "stratification";
const TYPE_STRATUM: &str = "stratum";

/// A document clause, reduced to what groups refer to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Clause<'a> {
    /// CQL definition or function name
    definition: Option<&'a str>,
    /// Aggregate function of an observation
    aggregate: Option<&'a str>,
    associated_population: Option<&'a str>,
}

/// Document-wide lookups, built once per document
struct ClauseIndex<'a> {
    clauses: HashMap<&'a str, Clause<'a>>,
    stratifications: HashMap<&'a str, &'a XmlElement>,
    package_clauses: Vec<&'a XmlElement>,
}

impl<'a> ClauseIndex<'a> {
    fn build(root: &'a XmlElement) -> Self {
        let mut clauses = HashMap::new();
        let mut stratifications = HashMap::new();
        let mut package_clauses = Vec::new();

        for element in root.descendants() {
            match element.name.as_str() {
                "clause" => {
                    if let Some(uuid) = element.attr("uuid") {
                        clauses.entry(uuid).or_insert_with(|| Clause {
                            definition: clause_definition(element),
                            aggregate: element.find("cqlaggfunction").and_then(|f| f.attr("displayName")),
                            associated_population: element.attr("associatedPopulationUUID"),
                        });
                    }
                }
                "stratification" => {
                    if let Some(uuid) = element.attr("uuid") {
                        stratifications.entry(uuid).or_insert(element);
                    }
                }
                "packageClause" => package_clauses.push(element),
                _ => {}
            }
        }

        Self {
            clauses,
            stratifications,
            package_clauses,
        }
    }

    fn clause(&self, uuid: &str) -> Option<&Clause<'a>> {
        self.clauses.get(uuid)
    }

    fn definition(&self, uuid: &str) -> Option<&'a str> {
        self.clause(uuid).and_then(|c| c.definition)
    }
}

/// Definition name of a clause: its CQL definition, else its CQL function
fn clause_definition(clause: &XmlElement) -> Option<&str> {
    clause
        .find("cqldefinition")
        .or_else(|| clause.find("cqlfunction"))
        .and_then(|d| d.attr("displayName"))
}

/// Extract all groups of a simple measure document, ordered by sequence
pub fn extract_groups(root: &XmlElement, ctx: &AssemblyContext<'_>) -> Vec<Group> {
    let index = ClauseIndex::build(root);

    let mut groupings: Vec<&XmlElement> = root
        .child("measureGrouping")
        .map(|grouping| grouping.children_named("group").collect())
        .unwrap_or_default();
    groupings.sort_by_key(|group| {
        group
            .attr("sequence")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(i64::MAX)
    });

    groupings
        .into_iter()
        .map(|group| assemble_group(group_parts(group, &index, ctx), ctx))
        .collect()
}

fn group_parts(group: &XmlElement, index: &ClauseIndex<'_>, ctx: &AssemblyContext<'_>) -> GroupParts {
    let scoring_name = ctx.details.meas_scoring.clone();
    let scoring = scoring_name.as_deref().and_then(MeasureScoring::from_name);
    let package: Vec<&XmlElement> = group.children_named("packageClause").collect();

    let mut populations: Vec<Population> = package
        .iter()
        .filter(|clause| clause.attr("type").is_some_and(is_population_code))
        .filter_map(|clause| {
            let uuid = clause.attr("uuid")?;
            let kind = population_code_to_type(clause.attr("type").unwrap_or_default());
            Some(Population {
                id: uuid.to_string(),
                name: kind,
                definition: index.definition(uuid).unwrap_or_default().to_string(),
                association_type: None,
                description: population_description(kind, ctx.details),
            })
        })
        .collect();

    resolve_initial_population_associations(&mut populations, &package, index);

    let observations = package
        .iter()
        .filter(|clause| clause.attr("type") == Some(TYPE_MEASURE_OBSERVATION))
        .map(|clause| observation(clause, &package, index, scoring, ctx))
        .collect();

    let stratifications = stratifications(&package, &populations, index, ctx);

    GroupParts {
        id: None,
        scoring: scoring_name,
        populations,
        observations,
        stratifications,
        scoring_unit_code: group.attr("ucum").map(str::to_string),
        rate_aggregation: ctx.details.rate_aggregation.clone(),
        improvement_notation: ctx.details.improv_notations.clone(),
    }
}

/// Tag each of two initial populations as feeding the numerator or the
/// denominator.
///
/// A denominator or numerator clause names the initial population it draws
/// from through `associatedPopulationUUID`; the group's own package clauses
/// are searched first, then the rest of the document. When only one side is
/// found the other initial population takes the opposite side, and when
/// neither is found they are taken in template order (denominator first).
fn resolve_initial_population_associations(
    populations: &mut [Population],
    package: &[&XmlElement],
    index: &ClauseIndex<'_>,
) {
    let positions: Vec<usize> = populations
        .iter()
        .enumerate()
        .filter(|(_, p)| p.name == PopulationType::InitialPopulation)
        .map(|(i, _)| i)
        .collect();
    let &[first, second] = positions.as_slice() else {
        return;
    };

    let lookup = |ip: &str| -> Option<AssociationType> {
        package
            .iter()
            .chain(index.package_clauses.iter())
            .filter(|clause| clause.attr("associatedPopulationUUID") == Some(ip))
            .find_map(|clause| match clause.attr("type") {
                Some("denominator") => Some(AssociationType::Denominator),
                Some("numerator") => Some(AssociationType::Numerator),
                _ => None,
            })
    };

    let (a, b) = match (lookup(populations[first].id.as_str()), lookup(populations[second].id.as_str())) {
        (Some(a), Some(b)) if a != b => (a, b),
        (Some(a), _) => (a, opposite(a)),
        (None, Some(b)) => (opposite(b), b),
        (None, None) => {
            debug!("No association declared for initial populations; using template order");
            (AssociationType::Denominator, AssociationType::Numerator)
        }
    };
    populations[first].association_type = Some(a);
    populations[second].association_type = Some(b);
}

fn opposite(association: AssociationType) -> AssociationType {
    match association {
        AssociationType::Numerator => AssociationType::Denominator,
        AssociationType::Denominator => AssociationType::Numerator,
    }
}

fn observation(
    clause: &XmlElement,
    package: &[&XmlElement],
    index: &ClauseIndex<'_>,
    scoring: Option<MeasureScoring>,
    ctx: &AssemblyContext<'_>,
) -> PendingObservation {
    let document_clause = clause.attr("uuid").and_then(|uuid| index.clause(uuid));

    let criteria_reference = match scoring {
        Some(MeasureScoring::Ratio) => clause
            .attr("associatedPopulationUUID")
            .or_else(|| document_clause.and_then(|c| c.associated_population)),
        _ => package
            .iter()
            .find(|c| c.attr("type") == Some("measurePopulation"))
            .and_then(|c| c.attr("uuid")),
    };

    PendingObservation {
        id: ctx.next_id(),
        definition: document_clause
            .and_then(|c| c.definition)
            .unwrap_or_default()
            .to_string(),
        description: ctx.details.measure_observations.clone(),
        criteria_reference: criteria_reference.map(str::to_string),
        aggregate_method: document_clause.and_then(|c| c.aggregate).map(str::to_string),
    }
}

/// Stratifications of a group.
///
/// A stratum's association is the type of the group population whose CQL
/// definition has the same name. Two populations sharing one definition
/// resolve to whichever comes first.
fn stratifications(
    package: &[&XmlElement],
    populations: &[Population],
    index: &ClauseIndex<'_>,
    ctx: &AssemblyContext<'_>,
) -> Vec<Stratification> {
    let mut strata: Vec<(&str, Option<&str>)> = Vec::new();

    for clause in package {
        let Some(uuid) = clause.attr("uuid") else {
            continue;
        };
        match clause.attr("type") {
            Some(TYPE_STRATIFICATION) => {
                if let Some(stratification) = index.stratifications.get(uuid) {
                    for stratum in stratification.children_named("clause") {
                        if stratum.attr("type") != Some(TYPE_STRATUM) {
                            continue;
                        }
                        if let Some(stratum_uuid) = stratum.attr("uuid") {
                            strata.push((stratum_uuid, clause_definition(stratum)));
                        }
                    }
                }
            }
            Some(TYPE_STRATUM) => strata.push((uuid, index.definition(uuid))),
            _ => {}
        }
    }

    strata
        .into_iter()
        .map(|(uuid, definition)| {
            let definition = definition.unwrap_or_default();
            let association = populations
                .iter()
                .find(|p| !definition.is_empty() && p.definition == definition)
                .map(|p| p.name)
                .unwrap_or(PopulationType::InitialPopulation);

            Stratification {
                id: uuid.to_string(),
                description: ctx.details.stratification.clone(),
                cql_definition: definition.to_string(),
                association,
            }
        })
        .collect()
}

/// CQL definitions listed under `container` (supplemental data, risk adjustment)
pub fn definition_list(root: &XmlElement, container: &str) -> Option<Vec<DefDescPair>> {
    let definitions: Vec<DefDescPair> = root
        .child(container)
        .into_iter()
        .flat_map(|c| c.children_named("cqldefinition"))
        .filter_map(|d| d.attr("displayName"))
        .map(|name| DefDescPair {
            definition: name.to_string(),
            description: None,
        })
        .collect();

    (!definitions.is_empty()).then_some(definitions)
}
