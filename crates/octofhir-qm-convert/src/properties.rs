//! Top-level measure properties
//!
//! A fixed table of `(source field, target field, setter)` rows evaluated in
//! order. Each setter reads one detail field, applies its transform and
//! writes the target field, so every transform can be tested on its own.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use octofhir_qm_diagnostics::{QM0301, Result, TransferError};
use octofhir_qm_model::{Measure, MeasureDetails, MeasureState, Model, SourceModel};

/// Values shared by all setters of one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyContext {
    /// Year used when a measurement period bound is absent
    pub reference_year: i32,
}

impl PropertyContext {
    pub fn new(reference_year: Option<i32>) -> Self {
        Self {
            reference_year: reference_year.unwrap_or_else(|| Utc::now().year()),
        }
    }
}

type Setter = fn(&mut Measure, &MeasureDetails, &PropertyContext) -> Result<()>;

/// One row of the property table
#[derive(Clone, Copy)]
pub struct PropertyMapping {
    /// Source field name in the measure details
    pub source: &'static str,
    /// Target field name in the measure
    pub target: &'static str,
    apply: Setter,
}

impl std::fmt::Debug for PropertyMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

pub const MEASURE_PROPERTY_MAPPINGS: &[PropertyMapping] = &[
    PropertyMapping {
        source: "measureSetId",
        target: "measureSetId",
        apply: |m, d, _| {
            m.measure_set_id = d.measure_set_id.clone();
            Ok(())
        },
    },
    PropertyMapping {
        source: "versionNumber",
        target: "version",
        apply: |m, d, _| {
            m.version = build_version(d.version_number.as_deref(), d.revision_number.as_deref())?;
            Ok(())
        },
    },
    PropertyMapping {
        source: "revisionNumber",
        target: "revisionNumber",
        apply: |m, d, _| {
            m.revision_number = d.revision_number.clone();
            Ok(())
        },
    },
    PropertyMapping {
        source: "draft",
        target: "state",
        apply: |m, d, _| {
            m.state = measure_state(d.draft);
            Ok(())
        },
    },
    PropertyMapping {
        source: "measureName",
        target: "measureName",
        apply: |m, d, _| {
            m.measure_name = d.measure_name.clone();
            Ok(())
        },
    },
    PropertyMapping {
        source: "cqllibraryName",
        target: "cqlLibraryName",
        apply: |m, d, _| {
            m.cql_library_name = d.cql_library_name.clone();
            Ok(())
        },
    },
    PropertyMapping {
        source: "shortName",
        target: "ecqmTitle",
        apply: |m, d, _| {
            m.ecqm_title = d.short_name.clone();
            Ok(())
        },
    },
    PropertyMapping {
        source: "measScoring",
        target: "scoring",
        apply: |m, d, _| {
            m.scoring = d.meas_scoring.clone();
            Ok(())
        },
    },
    PropertyMapping {
        source: "fhir",
        target: "model",
        apply: |m, d, _| {
            m.model = Some(infer_model(d));
            Ok(())
        },
    },
    PropertyMapping {
        source: "patientBased",
        target: "patientBasis",
        apply: |m, d, _| {
            m.patient_basis = d.patient_based;
            Ok(())
        },
    },
    PropertyMapping {
        source: "measFromPeriod",
        target: "measurementPeriodStart",
        apply: |m, d, ctx| {
            m.measurement_period_start =
                period_bound(d.meas_from_period.as_deref(), PeriodBound::Start, ctx.reference_year)?;
            Ok(())
        },
    },
    PropertyMapping {
        source: "measToPeriod",
        target: "measurementPeriodEnd",
        apply: |m, d, ctx| {
            m.measurement_period_end =
                period_bound(d.meas_to_period.as_deref(), PeriodBound::End, ctx.reference_year)?;
            Ok(())
        },
    },
];

/// Apply every property mapping to `measure`, in table order
pub fn map_measure_properties(
    measure: &mut Measure,
    details: &MeasureDetails,
    ctx: &PropertyContext,
) -> Result<()> {
    for mapping in MEASURE_PROPERTY_MAPPINGS {
        (mapping.apply)(measure, details, ctx)?;
    }
    Ok(())
}

/// Target model of a measure; everything that is not QDM converts to QI-Core
pub fn infer_model(details: &MeasureDetails) -> Model {
    match details.source_model() {
        SourceModel::Qdm => Model::Qdm56,
        SourceModel::Fhir => Model::QiCore,
    }
}

/// Draft unless the source explicitly says otherwise
pub fn measure_state(draft: Option<bool>) -> MeasureState {
    match draft {
        Some(false) => MeasureState::Versioned,
        _ => MeasureState::Draft,
    }
}

/// Build `{major}.{minor}.{revision}` from a dotted source version.
///
/// The minor component is normalized as an integer (`"000"` becomes `0`).
/// An absent version is read as `"0.0"`; an absent revision as `"0"`.
pub fn build_version(version: Option<&str>, revision: Option<&str>) -> Result<String> {
    let version = version.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("0.0");
    let mut components = version.split('.');

    let (Some(major), Some(minor)) = (components.next(), components.next()) else {
        return Err(TransferError::version_format(version));
    };
    let major = major.trim();
    let minor: u64 = minor
        .trim()
        .parse()
        .map_err(|_| TransferError::version_format(version))?;
    if major.is_empty() {
        return Err(TransferError::version_format(version));
    }

    let revision = revision.map(str::trim).filter(|r| !r.is_empty()).unwrap_or("0");
    Ok(format!("{}.{}.{}", major, minor, revision))
}

/// Which end of the measurement period a date belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodBound {
    Start,
    End,
}

impl PeriodBound {
    fn time_of_day(self) -> &'static str {
        match self {
            PeriodBound::Start => "T00:00:00.000Z",
            PeriodBound::End => "T23:59:59.999Z",
        }
    }
}

/// Normalize a measurement period date to an ISO-8601 instant.
///
/// Absent dates default to January 1st / December 31st of `reference_year`.
pub fn period_bound(value: Option<&str>, bound: PeriodBound, reference_year: i32) -> Result<String> {
    let date = match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse_date(value)?,
        None => {
            let (month, day) = match bound {
                PeriodBound::Start => (1, 1),
                PeriodBound::End => (12, 31),
            };
            NaiveDate::from_ymd_opt(reference_year, month, day).ok_or_else(|| {
                TransferError::format(QM0301, "Invalid measurement period year", reference_year.to_string())
            })?
        }
    };
    Ok(format!("{}{}", date.format("%Y-%m-%d"), bound.time_of_day()))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.date_naive());
    }
    ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| TransferError::format(QM0301, "Unrecognized measurement period date", value))
}
