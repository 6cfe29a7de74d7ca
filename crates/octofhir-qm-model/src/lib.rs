//! Quality measure representations
//!
//! This crate provides:
//! - The source measure record exported by the legacy authoring tool, in
//!   either its FHIR (JSON) or QDM (simple XML) flavor
//! - The target measure model accepted by the measure authoring service

pub mod source;
pub mod target;

pub use source::*;
pub use target::*;
