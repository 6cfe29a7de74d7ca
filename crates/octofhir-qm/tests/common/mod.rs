//! Common test utilities for the transfer pipeline and CLI
//!
//! - Recording collaborator mocks
//! - Source record builders

#![allow(dead_code)]

pub mod mocks;
pub mod records;

pub use mocks::*;
pub use records::*;
