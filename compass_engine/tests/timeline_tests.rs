//! Integration tests for the delivery-timeline state machine

mod common;

use chrono::Duration;

use compass_core::domain::BusinessDomain;
use compass_core::errors::EngineError;
use compass_core::gap::{AssessmentGap, GapCategory};
use compass_core::store::AssessmentStore;
use compass_core::timeline::{ExtensionType, TimelineStatus};

use common::{engine_with_store, new_assessment};

fn critical_gap(assessment_id: compass_core::assessment::AssessmentId) -> AssessmentGap {
    AssessmentGap::new(
        assessment_id,
        BusinessDomain::FinancialManagement,
        GapCategory::Critical,
        "Cash runway unanswered",
        9,
    )
}

#[tokio::test]
async fn test_resume_requires_every_affected_gap() {
    let (_store, engine) = engine_with_store();
    let assessment = new_assessment();
    engine.submit_assessment(&assessment).unwrap();

    let gap_a = critical_gap(assessment.id);
    let gap_b = critical_gap(assessment.id);
    let gap_c = critical_gap(assessment.id);
    engine
        .pause_for_critical_gaps(
            assessment.id,
            &[gap_a.clone(), gap_b.clone(), gap_c.clone()],
            "system",
        )
        .await
        .unwrap();

    assert!(!engine
        .resume_after_gap_resolution(assessment.id, &[gap_a.id, gap_b.id], "founder")
        .await
        .unwrap());
    assert!(engine
        .resume_after_gap_resolution(assessment.id, &[gap_a.id, gap_b.id, gap_c.id], "founder")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_fourth_extension_always_rejected() {
    let (_store, engine) = engine_with_store();
    let assessment = new_assessment();
    engine.submit_assessment(&assessment).unwrap();

    for hours in [1, 2, 3] {
        engine
            .request_extension(
                assessment.id,
                ExtensionType::Clarification,
                Duration::hours(hours),
                "more clarification time",
                "founder",
            )
            .await
            .unwrap();
    }

    let err = engine
        .request_extension(
            assessment.id,
            ExtensionType::GapResolution,
            Duration::minutes(5),
            "one more",
            "founder",
        )
        .await
        .unwrap_err();
    match err {
        EngineError::BusinessRule(msg) => {
            assert_eq!(msg, "Maximum timeline extensions reached");
        }
        other => panic!("Expected BusinessRule, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pause_rejected_once_extensions_exhausted() {
    let (_store, engine) = engine_with_store();
    let assessment = new_assessment();
    engine.submit_assessment(&assessment).unwrap();

    for _ in 0..3 {
        engine
            .request_extension(
                assessment.id,
                ExtensionType::GapResolution,
                Duration::hours(1),
                "gap recovery",
                "system",
            )
            .await
            .unwrap();
    }

    let err = engine
        .pause_for_critical_gaps(assessment.id, &[critical_gap(assessment.id)], "system")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BusinessRule(_)));
}

#[tokio::test]
async fn test_extension_shifts_deadlines_atomically() {
    let (store, engine) = engine_with_store();
    let assessment = new_assessment();
    engine.submit_assessment(&assessment).unwrap();
    let before = assessment.schedule.clone();

    let extension = engine
        .request_extension(
            assessment.id,
            ExtensionType::GapResolution,
            Duration::hours(5),
            "gap recovery",
            "system",
        )
        .await
        .unwrap();
    assert_eq!(extension.approved_by.as_deref(), Some("system"));
    assert!(extension.approved_at.is_some());

    let after = store
        .get_assessment(assessment.id)
        .unwrap()
        .unwrap()
        .schedule;
    for (new, old) in [
        (after.executive_summary_due, before.executive_summary_due),
        (after.detailed_report_due, before.detailed_report_due),
        (after.implementation_kit_due, before.implementation_kit_due),
    ] {
        assert_eq!(new - old, Duration::hours(5));
    }
    assert_eq!(
        engine.timeline_status(assessment.id).unwrap(),
        TimelineStatus::Extended
    );
}

#[tokio::test]
async fn test_extension_beyond_type_cap_rejected() {
    let (_store, engine) = engine_with_store();
    let assessment = new_assessment();
    engine.submit_assessment(&assessment).unwrap();

    let err = engine
        .request_extension(
            assessment.id,
            ExtensionType::GapResolution,
            Duration::hours(25),
            "too long",
            "founder",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BusinessRule(_)));

    let err = engine
        .request_extension(
            assessment.id,
            ExtensionType::Clarification,
            Duration::hours(13),
            "too long",
            "founder",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BusinessRule(_)));
}

#[tokio::test]
async fn test_pause_estimate_weights_critical_gaps() {
    let (store, engine) = engine_with_store();
    let assessment = new_assessment();
    engine.submit_assessment(&assessment).unwrap();

    // Two critical gaps at 60 minutes each, weighted 1.5.
    let gaps = vec![critical_gap(assessment.id), critical_gap(assessment.id)];
    let event = engine
        .pause_for_critical_gaps(assessment.id, &gaps, "system")
        .await
        .unwrap();
    assert_eq!(event.estimated_resolution_minutes, 180);
    assert_eq!(event.paused_by, "system");
    assert!(event.resume_by > event.paused_at);

    let stored = store.active_pause(assessment.id).unwrap().unwrap();
    assert_eq!(stored.id, event.id);
}

#[tokio::test]
async fn test_second_concurrent_pause_is_rejected() {
    let (_store, engine) = engine_with_store();
    let assessment = new_assessment();
    engine.submit_assessment(&assessment).unwrap();

    engine
        .pause_for_critical_gaps(assessment.id, &[critical_gap(assessment.id)], "system")
        .await
        .unwrap();
    let err = engine
        .pause_for_critical_gaps(assessment.id, &[critical_gap(assessment.id)], "system")
        .await
        .unwrap_err();
    match err {
        EngineError::BusinessRule(msg) => assert!(msg.contains("already paused")),
        other => panic!("Expected BusinessRule, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_assessment_rejected() {
    let (_store, engine) = engine_with_store();
    let phantom = compass_core::assessment::AssessmentId::new();

    let err = engine
        .pause_for_critical_gaps(phantom, &[critical_gap(phantom)], "system")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .request_extension(
            phantom,
            ExtensionType::Clarification,
            Duration::hours(1),
            "x",
            "founder",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
