//! Transfer pipeline
//!
//! A transfer takes one exported record through conversion, submission to the
//! measure service, and a notification to the user who exported it. The
//! measure service and the mail transport sit behind [`MeasureSubmitter`] and
//! [`Notifier`]; the pipeline owns the ordering. Nothing is submitted once
//! conversion fails, and each run sends at most one notification.

use async_trait::async_trait;
use indexmap::IndexMap;
use log::{info, warn};
use octofhir_qm_convert::{ConverterConfig, IdGenerator, MeasureConverter, UnitTable, UuidIdGenerator, parse_record};
use octofhir_qm_diagnostics::{QM0402, QM0403, Result, TransferError};
use octofhir_qm_model::{MatMeasure, Measure};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const UNNAMED_MEASURE: &str = "(unnamed)";

// ============================================================================
// Collaborators
// ============================================================================

/// Submission failure reported by the measure service client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Submission rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Submission transport failure: {0}")]
    Transport(String),
}

impl SubmissionError {
    /// Human-readable cause, with validation errors unpacked from the body
    pub fn message(&self) -> String {
        match self {
            Self::Rejected { body, .. } => parse_error(body),
            Self::Transport(message) => message.clone(),
        }
    }
}

impl From<SubmissionError> for TransferError {
    fn from(err: SubmissionError) -> Self {
        match &err {
            SubmissionError::Rejected { status, .. } => TransferError::submission(QM0402, err.message(), Some(*status)),
            SubmissionError::Transport(_) => TransferError::submission(QM0403, err.message(), None),
        }
    }
}

/// Measure service client: stores a converted measure on behalf of a user
#[async_trait]
pub trait MeasureSubmitter: Send + Sync {
    async fn submit(&self, measure: &Measure, user_id: &str) -> std::result::Result<(), SubmissionError>;
}

/// Delivers a transfer summary to the user who exported the measure
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, summary: &str) -> Result<()>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    validation_errors: IndexMap<String, Value>,
}

/// Human-readable text of an error body returned by the measure service.
///
/// A JSON body with a non-empty `validationErrors` map yields its single
/// message, or a numbered list when there are several; any other body is
/// returned as is.
pub fn parse_error(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return body.to_string();
    };

    let messages: Vec<String> = parsed
        .validation_errors
        .values()
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    match messages.as_slice() {
        [] => body.to_string(),
        [only] => only.clone(),
        _ => messages
            .iter()
            .enumerate()
            .map(|(i, message)| format!("{}. {}", i + 1, message))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// How a transfer ended
#[derive(Debug)]
pub enum TransferOutcome {
    /// Converted and accepted by the measure service
    Transferred(Box<Measure>),
    /// Conversion failed; nothing was submitted
    ConversionFailed(TransferError),
    /// Converted, but the measure service refused it or could not be reached
    SubmissionFailed(TransferError),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Transferred(_))
    }

    pub fn error(&self) -> Option<&TransferError> {
        match self {
            Self::Transferred(_) => None,
            Self::ConversionFailed(err) | Self::SubmissionFailed(err) => Some(err),
        }
    }

    /// Notification text for this outcome
    pub fn summary(&self, measure_name: &str) -> String {
        match self {
            Self::Transferred(measure) => format!(
                "Measure '{}' version {} was transferred successfully.",
                measure_name, measure.version
            ),
            Self::ConversionFailed(err) => format!(
                "Measure '{}' could not be converted: {}",
                measure_name,
                err.to_diagnostic().message
            ),
            Self::SubmissionFailed(err) => format!(
                "Measure '{}' could not be transferred: {}",
                measure_name,
                err.to_diagnostic().message
            ),
        }
    }
}

/// Convert, submit, notify
pub struct TransferPipeline<S, N> {
    submitter: S,
    notifier: N,
    units: Arc<UnitTable>,
    ids: Arc<dyn IdGenerator>,
    config: ConverterConfig,
}

impl<S: MeasureSubmitter, N: Notifier> TransferPipeline<S, N> {
    /// Pipeline using the bundled units table and random ids
    pub fn new(submitter: S, notifier: N) -> Result<Self> {
        Ok(Self {
            submitter,
            notifier,
            units: Arc::new(UnitTable::bundled()?),
            ids: Arc::new(UuidIdGenerator),
            config: ConverterConfig::default(),
        })
    }

    pub fn with_units(mut self, units: Arc<UnitTable>) -> Self {
        self.units = units;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_config(mut self, config: ConverterConfig) -> Self {
        self.config = config;
        self
    }

    /// Transfer a source record given as JSON text
    pub async fn run(&self, record_json: &str) -> TransferOutcome {
        match parse_record(record_json) {
            Ok(record) => self.transfer(&record).await,
            Err(err) => {
                warn!("Source record could not be read: {}", err);
                self.conclude(None, TransferOutcome::ConversionFailed(err)).await
            }
        }
    }

    /// Transfer a source record
    pub async fn transfer(&self, record: &MatMeasure) -> TransferOutcome {
        let converted = MeasureConverter::new(self.units.as_ref(), self.ids.as_ref(), self.config.clone()).convert(record);

        let outcome = match converted {
            Err(err) => {
                warn!("Conversion failed: {}", err);
                TransferOutcome::ConversionFailed(err)
            }
            Ok(measure) => {
                let user_id = record.harp_id.as_deref().unwrap_or_default();
                match self.submitter.submit(&measure, user_id).await {
                    Ok(()) => {
                        info!("Measure version {} submitted for {}", measure.version, user_id);
                        TransferOutcome::Transferred(Box::new(measure))
                    }
                    Err(err) => {
                        warn!("{}", err);
                        TransferOutcome::SubmissionFailed(err.into())
                    }
                }
            }
        };

        self.conclude(Some(record), outcome).await
    }

    async fn conclude(&self, record: Option<&MatMeasure>, outcome: TransferOutcome) -> TransferOutcome {
        let measure_name = record
            .and_then(MatMeasure::details)
            .and_then(|d| d.measure_name.as_deref())
            .unwrap_or(UNNAMED_MEASURE);
        let summary = outcome.summary(measure_name);

        let recipient = record
            .and_then(|r| r.email_id.as_deref())
            .map(str::trim)
            .filter(|r| !r.is_empty());

        match recipient {
            Some(recipient) => {
                if let Err(err) = self.notifier.notify(recipient, &summary).await {
                    warn!("Could not notify {}: {}", recipient, err);
                }
            }
            None => warn!("No recipient for transfer summary: {}", summary),
        }
        outcome
    }
}
