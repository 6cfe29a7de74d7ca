//! Quality measure transfer diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the
//! conversion engine and the transfer pipeline: structured error codes,
//! the error taxonomy, and diagnostic reporting.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for measure transfer operations
pub type Result<T> = std::result::Result<T, TransferError>;
