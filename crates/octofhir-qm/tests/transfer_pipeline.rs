//! Transfer pipeline tests: ordering of conversion, submission and notification

mod common;

use common::*;
use octofhir_qm::diagnostics::{QM0001, QM0102, QM0402, QM0403};
use octofhir_qm::model::{Model, PopulationType};
use octofhir_qm::{ConverterConfig, SequentialIdGenerator, SubmissionError, TransferOutcome, TransferPipeline};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn pipeline(
    submitter: &RecordingSubmitter,
    notifier: &RecordingNotifier,
) -> TransferPipeline<RecordingSubmitter, RecordingNotifier> {
    TransferPipeline::new(submitter.clone(), notifier.clone())
        .unwrap()
        .with_id_generator(Arc::new(SequentialIdGenerator::new("t")))
        .with_config(ConverterConfig::default().with_reference_year(2023))
}

#[tokio::test]
async fn test_successful_transfer_submits_and_notifies_once() {
    let submitter = RecordingSubmitter::new();
    let notifier = RecordingNotifier::new();

    let outcome = pipeline(&submitter, &notifier)
        .run(&qdm_cohort_record().to_string())
        .await;

    let TransferOutcome::Transferred(measure) = outcome else {
        panic!("expected a successful transfer");
    };
    assert_eq!(measure.version, "1.0.3");
    assert_eq!(measure.model, Some(Model::Qdm56));

    let submissions = submitter.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].1, USER_ID);
    assert_eq!(submissions[0].0, *measure);

    assert_eq!(
        notifier.notifications(),
        vec![(
            RECIPIENT.to_string(),
            "Measure 'CohortMeasure' version 1.0.3 was transferred successfully.".to_string()
        )]
    );
}

#[tokio::test]
async fn test_conversion_failure_never_submits() {
    let submitter = RecordingSubmitter::new();
    let notifier = RecordingNotifier::new();

    let record = qdm_record_with_xml("<measure><populations></measure>");
    let outcome = pipeline(&submitter, &notifier).run(&record.to_string()).await;

    assert!(matches!(outcome, TransferOutcome::ConversionFailed(_)));
    assert_eq!(outcome.error().map(|e| e.code()), Some(QM0102));
    assert_eq!(submitter.count(), 0);

    let summary = notifier.single_summary();
    assert!(summary.starts_with("Measure 'CohortMeasure' could not be converted: malformed simple XML"));
}

#[tokio::test]
async fn test_record_without_details_is_reported() {
    let submitter = RecordingSubmitter::new();
    let notifier = RecordingNotifier::new();

    let record = serde_json::json!({"harpId": USER_ID, "emailId": RECIPIENT});
    let outcome = pipeline(&submitter, &notifier).run(&record.to_string()).await;

    assert_eq!(outcome.error().map(|e| e.code()), Some(QM0001));
    assert_eq!(submitter.count(), 0);
    assert_eq!(
        notifier.single_summary(),
        "Measure '(unnamed)' could not be converted: Empty Measure"
    );
}

#[tokio::test]
async fn test_unreadable_record_has_no_recipient() {
    let submitter = RecordingSubmitter::new();
    let notifier = RecordingNotifier::new();

    let outcome = pipeline(&submitter, &notifier).run("").await;

    assert_eq!(outcome.error().map(|e| e.code()), Some(QM0001));
    assert_eq!(submitter.count(), 0);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_rejected_submission_reports_validation_errors() {
    let submitter = RecordingSubmitter::failing(SubmissionError::Rejected {
        status: 400,
        body: r#"{"status":400,"error":"Bad Request","validationErrors":{"cqlLibraryName":"CQL library with given name already exists.","measureName":"Measure with given name already exists."}}"#.to_string(),
    });
    let notifier = RecordingNotifier::new();

    let outcome = pipeline(&submitter, &notifier)
        .run(&qdm_cohort_record().to_string())
        .await;

    assert!(matches!(outcome, TransferOutcome::SubmissionFailed(_)));
    assert_eq!(outcome.error().map(|e| e.code()), Some(QM0402));
    assert_eq!(submitter.count(), 1);
    assert_eq!(
        notifier.single_summary(),
        "Measure 'CohortMeasure' could not be transferred: 1. CQL library with given name already exists.\n2. Measure with given name already exists."
    );
}

#[tokio::test]
async fn test_transport_failure() {
    let submitter = RecordingSubmitter::failing(SubmissionError::Transport("Connection error".to_string()));
    let notifier = RecordingNotifier::new();

    let outcome = pipeline(&submitter, &notifier)
        .run(&qdm_cohort_record().to_string())
        .await;

    assert_eq!(outcome.error().map(|e| e.code()), Some(QM0403));
    assert_eq!(
        notifier.single_summary(),
        "Measure 'CohortMeasure' could not be transferred: Connection error"
    );
}

#[tokio::test]
async fn test_notification_failure_keeps_outcome() {
    let submitter = RecordingSubmitter::new();
    let notifier = RecordingNotifier::failing();

    let outcome = pipeline(&submitter, &notifier)
        .run(&qdm_cohort_record().to_string())
        .await;

    assert!(outcome.is_success());
    assert_eq!(submitter.count(), 1);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_submitted_measure_content() {
    let submitter = RecordingSubmitter::new();
    let notifier = RecordingNotifier::new();

    pipeline(&submitter, &notifier)
        .run(&qdm_cohort_record().to_string())
        .await;

    let (measure, _) = submitter.submissions().remove(0);
    assert_eq!(measure.cms_id.as_deref(), Some("1179"));
    assert_eq!(measure.measurement_period_start, "2023-01-01T00:00:00.000Z");
    assert_eq!(measure.measurement_period_end, "2023-12-31T23:59:59.999Z");
    assert_eq!(measure.groups.len(), 1);

    let group = &measure.groups[0];
    assert_eq!(group.populations.len(), 1);
    assert_eq!(group.populations[0].name, PopulationType::InitialPopulation);
    assert_eq!(group.populations[0].id, "ip-1");
    assert!(group.id.starts_with("t-"));
    assert_eq!(group.scoring_unit.as_ref().map(|u| u.value.code.as_str()), Some("mg/dL"));
}

#[tokio::test]
async fn test_concurrent_transfers_share_one_pipeline() {
    let submitter = RecordingSubmitter::new();
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(&submitter, &notifier);

    let good = qdm_cohort_record().to_string();
    let bad = qdm_record_with_xml("not xml at all <").to_string();
    let (first, second) = tokio::join!(pipeline.run(&good), pipeline.run(&bad));

    assert!(first.is_success());
    assert!(!second.is_success());
    assert_eq!(submitter.count(), 1);
    assert_eq!(notifier.count(), 2);
}
