//! CMS identifier resolution

use crate::fhir::Identifier;
use log::warn;

/// CMS id of a FHIR measure.
///
/// Reads the identifier whose system is `system`; otherwise synthesizes
/// `"{eMeasureId}FHIR"` from a nonzero eMeasure id. `None` when neither is
/// available.
pub fn fhir_cms_id(identifiers: &[Identifier], system: &str, e_measure_id: Option<i64>) -> Option<String> {
    let declared = identifiers
        .iter()
        .filter(|id| id.system.as_deref() == Some(system))
        .find_map(|id| id.value.as_deref().map(str::trim).filter(|v| !v.is_empty()))
        .map(str::to_string);

    let cms_id = declared.or_else(|| nonzero(e_measure_id).map(|id| format!("{}FHIR", id)));
    if cms_id.is_none() {
        warn!("No CMS id: measure has no CMS identifier and no eMeasure id");
    }
    cms_id
}

/// CMS id of a QDM measure: the plain eMeasure id
pub fn qdm_cms_id(e_measure_id: Option<i64>) -> Option<String> {
    let cms_id = nonzero(e_measure_id).map(|id| id.to_string());
    if cms_id.is_none() {
        warn!("No CMS id: measure has no eMeasure id");
    }
    cms_id
}

fn nonzero(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id != 0)
}
