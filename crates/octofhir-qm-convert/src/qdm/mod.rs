//! QDM dialect extraction
//!
//! The QDM export describes the measure in a "simple measure" XML document:
//! population clauses live in per-kind containers under `populations`, and
//! each `measureGrouping/group` selects clauses by uuid through
//! `packageClause` elements. CQL and its library name travel next to the
//! document in the source record.

mod extract;
pub mod xml;

pub use extract::{definition_list, extract_groups};
pub use xml::{XmlElement, parse_document};

use crate::assemble::AssemblyContext;
use octofhir_qm_diagnostics::Result;
use octofhir_qm_model::{DefDescPair, Group};

pub const SUPPLEMENTAL_DATA_ELEMENTS: &str = "supplementalDataElements";
pub const RISK_ADJUSTMENT_VARIABLES: &str = "riskAdjustmentVariables";

/// Everything read from a simple measure document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QdmContent {
    pub groups: Vec<Group>,
    pub supplemental_data: Option<Vec<DefDescPair>>,
    pub risk_adjustments: Option<Vec<DefDescPair>>,
}

/// Parse a simple measure document and extract its groups and definition lists
pub fn extract(simple_xml: &str, ctx: &AssemblyContext<'_>) -> Result<QdmContent> {
    let root = parse_document(simple_xml)?;
    Ok(QdmContent {
        groups: extract_groups(&root, ctx),
        supplemental_data: definition_list(&root, SUPPLEMENTAL_DATA_ELEMENTS),
        risk_adjustments: definition_list(&root, RISK_ADJUSTMENT_VARIABLES),
    })
}
