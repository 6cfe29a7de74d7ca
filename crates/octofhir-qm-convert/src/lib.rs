//! Measure conversion engine
//!
//! Converts a legacy measure export ([`MatMeasure`]) into the target
//! [`Measure`] model. The export carries its content either as a FHIR
//! measure resource with a library bundle, or as a QDM simple XML document;
//! both converge on the same target shape.
//!
//! # Example
//!
//! ```no_run
//! use octofhir_qm_convert::{ConverterConfig, MeasureConverter, SequentialIdGenerator, UnitTable};
//!
//! let units = UnitTable::bundled()?;
//! let ids = SequentialIdGenerator::new("id");
//! let converter = MeasureConverter::new(&units, &ids, ConverterConfig::default());
//!
//! let record = std::fs::read_to_string("measure.json")?;
//! let measure = converter.convert_json(&record)?;
//! println!("{}", measure.version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assemble;
pub mod cms_id;
pub mod codes;
pub mod config;
pub mod converter;
pub mod fhir;
pub mod ids;
pub mod metadata;
pub mod properties;
pub mod qdm;
pub mod template;
pub mod units;

pub use config::ConverterConfig;
pub use converter::{MeasureConverter, convert_to_measure, parse_record};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use units::{UnitTable, resolve_unit};

pub use octofhir_qm_diagnostics::{Result, TransferError};
pub use octofhir_qm_model::{MatMeasure, Measure};
