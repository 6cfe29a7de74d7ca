//! Conversion orchestrator

use crate::assemble::AssemblyContext;
use crate::cms_id::{fhir_cms_id, qdm_cms_id};
use crate::codes::base_configuration_types;
use crate::config::ConverterConfig;
use crate::ids::IdGenerator;
use crate::metadata::map_metadata;
use crate::properties::{PropertyContext, map_measure_properties};
use crate::units::UnitTable;
use crate::{fhir, qdm};
use log::{debug, info};
use octofhir_qm_diagnostics::{Payload, QM0002, QM0203, Result, TransferError};
use octofhir_qm_model::{FhirPayload, MatMeasure, Measure, MeasureDetails, MeasurePayload, QdmPayload};

const EMPTY_MEASURE: &str = "Empty Measure";

/// Converts source measure records into target measures.
///
/// Holds borrowed, read-only resources only, so one converter can serve any
/// number of conversions.
pub struct MeasureConverter<'a> {
    units: &'a UnitTable,
    ids: &'a dyn IdGenerator,
    config: ConverterConfig,
}

impl<'a> MeasureConverter<'a> {
    pub fn new(units: &'a UnitTable, ids: &'a dyn IdGenerator, config: ConverterConfig) -> Self {
        Self { units, ids, config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a source record given as JSON text.
    ///
    /// Blank text and JSON `null` are empty input.
    pub fn convert_json(&self, json: &str) -> Result<Measure> {
        self.convert(&parse_record(json)?)
    }

    /// Convert a source record
    pub fn convert(&self, record: &MatMeasure) -> Result<Measure> {
        let details = record
            .details()
            .ok_or_else(|| TransferError::empty_input(EMPTY_MEASURE))?;

        let ctx = AssemblyContext {
            details,
            units: self.units,
            config: &self.config,
            ids: self.ids,
        };

        let mut measure = Measure::default();
        map_measure_properties(&mut measure, details, &PropertyContext::new(self.config.reference_year))?;
        measure.measure_meta_data = map_metadata(details, &self.config, self.ids);
        measure.base_configuration_types =
            base_configuration_types(details.measure_type_selected_list.as_deref().unwrap_or(&[]));

        match record.payload() {
            MeasurePayload::Fhir(payload) => self.convert_fhir(&mut measure, payload, &ctx)?,
            MeasurePayload::Qdm(payload) => self.convert_qdm(&mut measure, payload, &ctx)?,
        }

        measure.active = true;
        measure.created_by = record.harp_id.clone();
        measure.last_modified_by = record.harp_id.clone();

        info!(
            "Converted measure '{}' version {} ({} groups)",
            measure.measure_name.as_deref().unwrap_or_default(),
            measure.version,
            measure.groups.len()
        );
        Ok(measure)
    }

    fn convert_fhir(&self, measure: &mut Measure, payload: FhirPayload<'_>, ctx: &AssemblyContext<'_>) -> Result<()> {
        if payload.measure_resource_json.trim().is_empty() {
            return Err(TransferError::missing_reference(
                QM0203,
                "FHIR measure record carries no measure resource",
            ));
        }
        debug!("Converting FHIR measure");

        let resource = fhir::parse_measure_resource(payload.measure_resource_json)?;
        let library = fhir::extract_library(&resource, payload.library_resources_json, &self.config)?;

        measure.groups = fhir::groups_from_resource(&resource, ctx);
        measure.cql = Some(library.cql);
        measure.cql_library_name = ctx.details.cql_library_name.clone().or(library.name);
        measure.cms_id = fhir_cms_id(
            &resource.identifier,
            &self.config.cms_identifier_system,
            ctx.details.e_measure_id,
        );
        Ok(())
    }

    fn convert_qdm(&self, measure: &mut Measure, payload: QdmPayload<'_>, ctx: &AssemblyContext<'_>) -> Result<()> {
        if payload.simple_xml.trim().is_empty() {
            return Err(TransferError::missing_reference(
                QM0203,
                "QDM measure record carries no simple XML",
            ));
        }
        debug!("Converting QDM measure");

        let content = qdm::extract(payload.simple_xml, ctx)?;
        let details: &MeasureDetails = ctx.details;

        measure.groups = content.groups;
        measure.supplemental_data = content.supplemental_data;
        measure.risk_adjustments = content.risk_adjustments;
        measure.supplemental_data_description = details.supplemental_data.clone();
        measure.risk_adjustment_description = details.risk_adjustment.clone();
        measure.rate_aggregation = details.rate_aggregation.clone();
        measure.improvement_notation = details.improv_notations.clone();
        measure.cql = Some(payload.cql.to_string());
        measure.cql_library_name = payload
            .cql_library_name
            .map(str::to_string)
            .or_else(|| details.cql_library_name.clone());
        measure.cms_id = qdm_cms_id(details.e_measure_id);
        Ok(())
    }
}

/// Read a source record from JSON text.
///
/// Blank text and JSON `null` are empty input; anything else that does not
/// deserialize is a malformed source record.
pub fn parse_record(json: &str) -> Result<MatMeasure> {
    let json = json.trim();
    if json.is_empty() || json == "null" {
        return Err(TransferError::empty_input(EMPTY_MEASURE));
    }
    serde_json::from_str(json).map_err(|e| TransferError::malformed(QM0002, Payload::SourceRecord, e.to_string()))
}

/// Convert one record with the bundled units table and random ids
pub fn convert_to_measure(record: &MatMeasure) -> Result<Measure> {
    let units = UnitTable::bundled()?;
    let ids = crate::ids::UuidIdGenerator;
    MeasureConverter::new(&units, &ids, ConverterConfig::default()).convert(record)
}
