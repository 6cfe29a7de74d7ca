//! Identifier generation
//!
//! Placeholder populations, references and observations get fresh ids during
//! assembly. The generator is injected so tests and reproducible runs can use
//! predictable ids.

use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Source of fresh identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier, distinct from all previously produced ones
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Counter-based ids: `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicUsize,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicUsize::new(0),
        }
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
