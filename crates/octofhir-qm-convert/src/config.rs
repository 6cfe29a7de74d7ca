//! Converter configuration
//!
//! Resolved once by whoever owns the process (CLI, pipeline) and handed to
//! the converter. The engine itself never reads the environment.

use serde::{Deserialize, Serialize};

/// CQL header every converted FHIR library is rewritten to
pub const QICORE_USING_HEADER: &str = "using QICore version '4.1.1'";

/// Identifier system of CMS ids in FHIR measure resources
pub const CMS_IDENTIFIER_SYSTEM: &str = "http://hl7.org/fhir/cqi/ecqm/Measure/Identifier/cms";

pub const DEFAULT_ENDORSER: &str = "CMS Consensus Based Entity";
pub const DEFAULT_ENDORSER_SYSTEM_ID: &str = "https://www.qualityforum.org";
pub const DEFAULT_UNITS_SYSTEM: &str = "https://clinicaltables.nlm.nih.gov/";

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    /// Replacement for the `using FHIR version '...'` CQL header
    pub using_header: String,
    /// Identifier system matched when reading the CMS id
    pub cms_identifier_system: String,
    /// Endorser name on emitted endorsements
    pub endorser: String,
    /// Endorser system id on emitted endorsements
    pub endorser_system_id: String,
    /// System attached to resolved scoring units
    pub units_system: String,
    /// Year used for default measurement period bounds; current UTC year when unset
    pub reference_year: Option<i32>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            using_header: QICORE_USING_HEADER.to_string(),
            cms_identifier_system: CMS_IDENTIFIER_SYSTEM.to_string(),
            endorser: DEFAULT_ENDORSER.to_string(),
            endorser_system_id: DEFAULT_ENDORSER_SYSTEM_ID.to_string(),
            units_system: DEFAULT_UNITS_SYSTEM.to_string(),
            reference_year: None,
        }
    }
}

impl ConverterConfig {
    /// Pin the year used for default measurement periods
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }
}
