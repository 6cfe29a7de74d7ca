//! Quality measure transfer
//!
//! Moves measures exported by the legacy authoring tool into the new measure
//! model. This crate provides:
//! - Conversion of FHIR and QDM measure exports (re-exported from
//!   `octofhir-qm-convert`)
//! - The transfer pipeline: convert, submit, notify
//! - The `qm-transfer` command-line tool (with the `cli` feature)
//!
//! # Example
//!
//! ```no_run
//! use octofhir_qm::convert_to_measure;
//! use octofhir_qm::model::MatMeasure;
//!
//! let json = std::fs::read_to_string("measure.json")?;
//! let record: MatMeasure = serde_json::from_str(&json)?;
//! let measure = convert_to_measure(&record)?;
//! println!("{} groups", measure.groups.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use octofhir_qm_convert as convert;
pub use octofhir_qm_diagnostics as diagnostics;
pub use octofhir_qm_model as model;

pub use octofhir_qm_convert::{
    ConverterConfig, IdGenerator, MeasureConverter, SequentialIdGenerator, UnitTable, UuidIdGenerator,
    convert_to_measure, parse_record,
};
pub use octofhir_qm_diagnostics::{Result, TransferError};
pub use octofhir_qm_model::{MatMeasure, Measure};

pub mod transfer;

pub use transfer::{MeasureSubmitter, Notifier, SubmissionError, TransferOutcome, TransferPipeline, parse_error};

#[cfg(feature = "cli")]
pub mod cli;
