//! Measure transfer error types

use crate::{ErrorCode, QM0001, QM0300, QM0404};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The embedded payload a parse failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payload {
    /// The source measure record itself
    SourceRecord,
    /// FHIR measure resource JSON
    MeasureResource,
    /// FHIR library bundle JSON
    LibraryBundle,
    /// Base64 CQL attachment inside a library
    CqlContent,
    /// QDM simple measure XML
    SimpleXml,
    /// Units database JSON
    UnitsTable,
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::SourceRecord => write!(f, "source record"),
            Payload::MeasureResource => write!(f, "measure resource"),
            Payload::LibraryBundle => write!(f, "library bundle"),
            Payload::CqlContent => write!(f, "CQL content"),
            Payload::SimpleXml => write!(f, "simple XML"),
            Payload::UnitsTable => write!(f, "units table"),
        }
    }
}

/// An error diagnostic ready for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            help: None,
        }
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} - {}", self.code, self.message)?;
        if let Some(help) = &self.help {
            write!(f, " ({})", help)?;
        }
        Ok(())
    }
}

/// Main measure transfer error type
#[derive(Debug, Clone, Error)]
pub enum TransferError {
    /// Source record missing or empty
    #[error("{code}: {message}")]
    EmptyInput { code: ErrorCode, message: String },

    /// JSON/XML/base64 failure inside an embedded payload
    #[error("{code}: malformed {payload}: {message}")]
    MalformedPayload {
        code: ErrorCode,
        message: String,
        payload: Payload,
    },

    /// A required cross-document reference could not be resolved
    #[error("{code}: {message}")]
    MissingReference {
        code: ErrorCode,
        message: String,
        reference: Option<String>,
    },

    /// A source value does not have the expected shape
    #[error("{code}: {message} (got '{value}')")]
    Format {
        code: ErrorCode,
        message: String,
        value: String,
    },

    /// The downstream service refused or could not receive the measure
    #[error("{code}: {message}")]
    Submission {
        code: ErrorCode,
        message: String,
        status: Option<u16>,
    },

    /// The notification collaborator failed
    #[error("{code}: {message}")]
    Notification { code: ErrorCode, message: String },
}

impl TransferError {
    /// Create an empty input error
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            code: QM0001,
            message: message.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed(code: ErrorCode, payload: Payload, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            code,
            message: message.into(),
            payload,
        }
    }

    /// Create a missing reference error
    pub fn missing_reference(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::MissingReference {
            code,
            message: message.into(),
            reference: None,
        }
    }

    /// Create a missing reference error naming the unresolved reference
    pub fn missing_reference_to(
        code: ErrorCode,
        message: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::MissingReference {
            code,
            message: message.into(),
            reference: Some(reference.into()),
        }
    }

    /// Create a format error
    pub fn format(code: ErrorCode, message: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Format {
            code,
            message: message.into(),
            value: value.into(),
        }
    }

    /// Create a version format error
    pub fn version_format(value: impl Into<String>) -> Self {
        Self::format(QM0300, "Malformed version number", value)
    }

    /// Create a submission error
    pub fn submission(code: ErrorCode, message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Submission {
            code,
            message: message.into(),
            status,
        }
    }

    /// Create a notification error
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            code: QM0404,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyInput { code, .. } => *code,
            Self::MalformedPayload { code, .. } => *code,
            Self::MissingReference { code, .. } => *code,
            Self::Format { code, .. } => *code,
            Self::Submission { code, .. } => *code,
            Self::Notification { code, .. } => *code,
        }
    }

    /// Whether the error belongs to the conversion engine rather than a collaborator
    pub fn is_conversion_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput { .. }
                | Self::MalformedPayload { .. }
                | Self::MissingReference { .. }
                | Self::Format { .. }
        )
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = self.code();
        let message = match self {
            Self::MalformedPayload { message, payload, .. } => {
                format!("malformed {}: {}", payload, message)
            }
            Self::MissingReference {
                message,
                reference: Some(reference),
                ..
            } => format!("{} ({})", message, reference),
            Self::Format { message, value, .. } => format!("{} (got '{}')", message, value),
            Self::EmptyInput { message, .. }
            | Self::MissingReference { message, .. }
            | Self::Submission { message, .. }
            | Self::Notification { message, .. } => message.clone(),
        };

        let diag = Diagnostic::error(code, message);
        match code.info().help {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}
