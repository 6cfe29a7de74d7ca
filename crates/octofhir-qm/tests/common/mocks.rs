//! Recording collaborator mocks
//!
//! Each mock keeps its calls behind an `Arc`, so a test can hand a clone to
//! the pipeline and inspect the original afterwards.

use async_trait::async_trait;
use octofhir_qm::{MeasureSubmitter, Notifier, Result, SubmissionError, TransferError};
use octofhir_qm::model::Measure;
use parking_lot::Mutex;
use std::sync::Arc;

/// Submitter that records every call and answers with a configured result
#[derive(Clone, Default)]
pub struct RecordingSubmitter {
    submissions: Arc<Mutex<Vec<(Measure, String)>>>,
    failure: Option<SubmissionError>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: SubmissionError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Submitted measures with the user id they were submitted for
    pub fn submissions(&self) -> Vec<(Measure, String)> {
        self.submissions.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.submissions.lock().len()
    }
}

#[async_trait]
impl MeasureSubmitter for RecordingSubmitter {
    async fn submit(&self, measure: &Measure, user_id: &str) -> std::result::Result<(), SubmissionError> {
        self.submissions.lock().push((measure.clone(), user_id.to_string()));
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Notifier that records every summary it is asked to deliver
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the call, then reports a delivery failure
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Delivered `(recipient, summary)` pairs
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }

    /// The only summary sent; panics unless exactly one was sent
    pub fn single_summary(&self) -> String {
        let notifications = self.notifications.lock();
        assert_eq!(notifications.len(), 1, "expected exactly one notification");
        notifications[0].1.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, summary: &str) -> Result<()> {
        self.notifications
            .lock()
            .push((recipient.to_string(), summary.to_string()));
        if self.fail {
            Err(TransferError::notification("mail transport unavailable"))
        } else {
            Ok(())
        }
    }
}
