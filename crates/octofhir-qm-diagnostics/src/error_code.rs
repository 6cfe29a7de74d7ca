//! Measure transfer error codes following a structured numbering system
//!
//! Error code ranges:
//! - QM0001-QM0099: Input errors (missing or empty source record)
//! - QM0100-QM0199: Malformed payloads (JSON, XML, base64)
//! - QM0200-QM0299: Missing cross-document references
//! - QM0300-QM0399: Format errors (versions, dates)
//! - QM0400-QM0499: Collaborator errors (submission, notification)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QM{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Input errors (0001-0099)
    map.insert(1, ErrorInfo::new("Empty measure")
        .with_help("The source record is missing, null, or has no measure details"));
    map.insert(2, ErrorInfo::new("Unreadable source record"));

    // Malformed payloads (0100-0199)
    map.insert(100, ErrorInfo::new("Malformed FHIR measure resource"));
    map.insert(101, ErrorInfo::new("Malformed FHIR library bundle"));
    map.insert(102, ErrorInfo::new("Malformed QDM simple XML"));
    map.insert(103, ErrorInfo::new("Malformed CQL attachment")
        .with_help("Library content must be base64 encoded"));
    map.insert(104, ErrorInfo::new("Malformed units table"));

    // Missing references (0200-0299)
    map.insert(200, ErrorInfo::new("Measure library not found in bundle")
        .with_help("The bundle must contain a library whose url contains the measure's first library reference"));
    map.insert(201, ErrorInfo::new("Library has no CQL attachment"));
    map.insert(202, ErrorInfo::new("Measure declares no library"));
    map.insert(203, ErrorInfo::new("Dialect payload missing")
        .with_help("FHIR measures need a measure resource, QDM measures need simple XML"));

    // Format errors (0300-0399)
    map.insert(300, ErrorInfo::new("Malformed version number")
        .with_help("Expected a dotted version such as 1.000"));
    map.insert(301, ErrorInfo::new("Malformed measurement period date"));

    // Collaborator errors (0400-0499)
    map.insert(402, ErrorInfo::new("Submission rejected"));
    map.insert(403, ErrorInfo::new("Submission transport failure"));
    map.insert(404, ErrorInfo::new("Notification failed"));

    map
});

// Input errors
pub const QM0001: ErrorCode = ErrorCode::new(1);
pub const QM0002: ErrorCode = ErrorCode::new(2);

// Malformed payloads
pub const QM0100: ErrorCode = ErrorCode::new(100);
pub const QM0101: ErrorCode = ErrorCode::new(101);
pub const QM0102: ErrorCode = ErrorCode::new(102);
pub const QM0103: ErrorCode = ErrorCode::new(103);
pub const QM0104: ErrorCode = ErrorCode::new(104);

// Missing references
pub const QM0200: ErrorCode = ErrorCode::new(200);
pub const QM0201: ErrorCode = ErrorCode::new(201);
pub const QM0202: ErrorCode = ErrorCode::new(202);
pub const QM0203: ErrorCode = ErrorCode::new(203);

// Format errors
pub const QM0300: ErrorCode = ErrorCode::new(300);
pub const QM0301: ErrorCode = ErrorCode::new(301);

// Collaborator errors
pub const QM0402: ErrorCode = ErrorCode::new(402);
pub const QM0403: ErrorCode = ErrorCode::new(403);
pub const QM0404: ErrorCode = ErrorCode::new(404);
