//! Unit command implementation

use super::output;
use anyhow::{Result, bail};
use octofhir_qm_convert::{UnitTable, resolve_unit};
use std::path::PathBuf;

/// Configuration for unit command
pub struct UnitConfig {
    pub code: String,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Resolve a unit code against the bundled units table and print its descriptor
pub async fn unit(config: UnitConfig) -> Result<()> {
    let units = UnitTable::bundled()?;
    let Some(unit) = resolve_unit(&units, &config.code) else {
        bail!("Unit code '{}' is not in the units table", config.code.trim());
    };

    let content = output::format_json(&unit, config.pretty)?;
    output::write_output(&content, config.output_file.as_deref())
}
