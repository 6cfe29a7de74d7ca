//! Convert command implementation

use super::output;
use anyhow::{Context, Result};
use log::debug;
use octofhir_qm_convert::{
    ConverterConfig, IdGenerator, MeasureConverter, SequentialIdGenerator, UnitTable, UuidIdGenerator,
};
use octofhir_qm_model::Measure;
use std::fs;
use std::path::PathBuf;

const DETERMINISTIC_ID_PREFIX: &str = "id";

/// Configuration for convert command
pub struct ConvertConfig {
    pub file: PathBuf,
    pub pretty: bool,
    pub deterministic_ids: bool,
    pub reference_year: Option<i32>,
    pub output_file: Option<PathBuf>,
}

/// Convert a source record file and write the target measure JSON
pub async fn convert(config: ConvertConfig) -> Result<()> {
    let measure = convert_file(&config)?;
    if measure.groups.is_empty() {
        eprintln!("{}", output::format_warning("Converted measure has no groups"));
    }

    let content = output::format_json(&measure, config.pretty)?;
    output::write_output(&content, config.output_file.as_deref())
}

/// Read and convert a source record file
pub fn convert_file(config: &ConvertConfig) -> Result<Measure> {
    let record = fs::read_to_string(&config.file)
        .with_context(|| format!("Failed to read measure record: {}", config.file.display()))?;
    debug!("Loaded {} bytes from {}", record.len(), config.file.display());

    let units = UnitTable::bundled()?;
    let ids: Box<dyn IdGenerator> = if config.deterministic_ids {
        Box::new(SequentialIdGenerator::new(DETERMINISTIC_ID_PREFIX))
    } else {
        Box::new(UuidIdGenerator)
    };

    let mut converter_config = ConverterConfig::default();
    if let Some(year) = config.reference_year {
        converter_config = converter_config.with_reference_year(year);
    }

    MeasureConverter::new(&units, ids.as_ref(), converter_config)
        .convert_json(&record)
        .with_context(|| format!("Failed to convert measure record: {}", config.file.display()))
}
