//! Unit code resolution
//!
//! The units database is a JSON array of `{code, name, guidance}` entries.
//! Some codes in it carry stray whitespace (`"g/kg "`), so keys are trimmed
//! once at load time while the descriptor keeps the code exactly as listed.

use crate::config::DEFAULT_UNITS_SYSTEM;
use octofhir_qm_diagnostics::{Payload, QM0104, Result, TransferError};
use octofhir_qm_model::{ScoringUnit, UnitDescriptor};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Units database embedded at compile time
pub const BUNDLED_UNITS_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/ucum-units.json"));

static BUNDLED: Lazy<Result<UnitTable>> = Lazy::new(|| UnitTable::from_json(BUNDLED_UNITS_JSON));

/// One row of the units database
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub guidance: Option<String>,
}

/// Read-only unit lookup keyed by trimmed code
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    entries: HashMap<String, UnitEntry>,
}

impl UnitTable {
    /// The bundled units database
    pub fn bundled() -> Result<Self> {
        BUNDLED.clone()
    }

    /// Load a units database from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<UnitEntry> = serde_json::from_str(json)
            .map_err(|e| TransferError::malformed(QM0104, Payload::UnitsTable, e.to_string()))?;
        Ok(rows.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw database row for a code
    pub fn get(&self, code: &str) -> Option<&UnitEntry> {
        self.entries.get(code.trim())
    }

    /// Resolve a unit code to a scoring unit tagged with `system`.
    ///
    /// Blank and unknown codes yield `None`; callers treat that as "no
    /// scoring unit".
    pub fn resolve(&self, code: &str, system: &str) -> Option<ScoringUnit> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let entry = self.entries.get(code)?;
        Some(ScoringUnit {
            label: format!("{} {}", entry.code, entry.name),
            value: UnitDescriptor {
                code: entry.code.clone(),
                guidance: entry.guidance.clone(),
                name: entry.name.clone(),
                system: system.to_string(),
            },
        })
    }
}

impl FromIterator<UnitEntry> for UnitTable {
    fn from_iter<I: IntoIterator<Item = UnitEntry>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|entry| (entry.code.trim().to_string(), entry))
            .collect();
        Self { entries }
    }
}

/// Resolve a unit code against `units` with the default units system
pub fn resolve_unit(units: &UnitTable, code: &str) -> Option<ScoringUnit> {
    units.resolve(code, DEFAULT_UNITS_SYSTEM)
}
