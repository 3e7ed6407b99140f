//! Integration tests for gap analysis

mod common;

use compass_core::assessment::{Assessment, QuestionResponse};
use compass_core::domain::{
    BusinessDomain, IndustryProfile, IndustrySector, RegulatoryTier,
};
use compass_core::errors::EngineError;
use compass_core::gap::{ComplianceLevel, GapCategory};
use compass_core::store::AssessmentStore;
use compass_core::timeline::TimelineStatus;
use compass_engine::{AnalysisDepth, AnalysisOptions, AssessmentEngine};

use common::{answer_domain_fully, engine_with_store, new_assessment, submit_empty_domain};

fn scenario_a_assessment() -> Assessment {
    let mut assessment = new_assessment();
    answer_domain_fully(&mut assessment, BusinessDomain::MarketPosition);
    answer_domain_fully(&mut assessment, BusinessDomain::CustomerExperience);
    submit_empty_domain(&mut assessment, BusinessDomain::FinancialManagement);
    assessment
}

#[tokio::test]
async fn test_empty_domain_yields_single_whole_domain_gap() {
    let (store, engine) = engine_with_store();
    let assessment = scenario_a_assessment();
    engine.submit_assessment(&assessment).unwrap();

    let outcome = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    let analysis = &outcome.analysis;

    // Exactly one gap: the whole-domain critical for financial-management.
    assert_eq!(analysis.total_count, 1);
    assert_eq!(analysis.critical_count, 1);
    let gap = &analysis.gaps[0];
    assert_eq!(gap.category, GapCategory::Critical);
    assert_eq!(gap.domain, BusinessDomain::FinancialManagement);
    assert_eq!(gap.priority, 10);
    assert!(gap.question_id.is_none());

    // The two answered domains score 100, the empty one 0; the weighted
    // average is dragged well below 100 by the heavier empty domain.
    assert_eq!(
        analysis.domain_scores[&BusinessDomain::MarketPosition].score,
        100.0
    );
    assert_eq!(
        analysis.domain_scores[&BusinessDomain::FinancialManagement].score,
        0.0
    );
    assert!(analysis.overall_score < 60.0);
    assert!(analysis.overall_score > 40.0);

    // A pause event was created and the timeline derives as paused.
    assert!(store.active_pause(assessment.id).unwrap().is_some());
    assert_eq!(
        engine.timeline_status(assessment.id).unwrap(),
        TimelineStatus::Paused
    );

    // Gap records are individually addressable.
    let stored = store.gaps_for_assessment(assessment.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, gap.id);
}

#[tokio::test]
async fn test_cached_analysis_is_served_bit_identical() {
    let (_store, engine) = engine_with_store();
    let assessment = scenario_a_assessment();
    engine.submit_assessment(&assessment).unwrap();

    let first = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    let second = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();

    assert_eq!(first.analysis, second.analysis);
    // The cache hit performs no side effects but still carries fresh
    // recommendations.
    assert!(second.side_effects.is_empty());
    assert!(!second.recommendations.is_empty());
}

#[tokio::test]
async fn test_force_reanalysis_bypasses_cache() {
    let (_store, engine) = engine_with_store();
    let assessment = scenario_a_assessment();
    engine.submit_assessment(&assessment).unwrap();

    let first = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    let forced = engine
        .analyze(
            assessment.id,
            AnalysisOptions {
                force_reanalysis: true,
                ..AnalysisOptions::default()
            },
        )
        .await
        .unwrap();

    // A fresh run recomputes the snapshot (new timestamp, same shape).
    assert!(forced.analysis.analyzed_at >= first.analysis.analyzed_at);
    assert_eq!(forced.analysis.total_count, first.analysis.total_count);
    assert!(!forced.side_effects.is_empty());
}

#[tokio::test]
async fn test_missing_critical_question_gap() {
    let (_store, engine) = engine_with_store();
    let mut assessment = new_assessment();
    // Answer one of market-position's two critical questions.
    assessment.record_response(
        BusinessDomain::MarketPosition,
        QuestionResponse::text(
            "target-market",
            "Mid-market manufacturers, because they are underserved",
        ),
    );
    engine.submit_assessment(&assessment).unwrap();

    let outcome = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();

    let missing: Vec<_> = outcome
        .analysis
        .gaps
        .iter()
        .filter(|g| g.question_id.as_deref() == Some("positioning"))
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].category, GapCategory::Critical);
    assert_eq!(missing[0].priority, 9);
}

#[tokio::test]
async fn test_whitespace_answer_counts_as_missing() {
    let (_store, engine) = engine_with_store();
    let mut assessment = new_assessment();
    assessment.record_response(
        BusinessDomain::MarketPosition,
        QuestionResponse::text("target-market", "   "),
    );
    assessment.record_response(
        BusinessDomain::MarketPosition,
        QuestionResponse::text(
            "positioning",
            "Premium consulting because clients value expertise",
        ),
    );
    engine.submit_assessment(&assessment).unwrap();

    let outcome = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    assert!(outcome
        .analysis
        .gaps
        .iter()
        .any(|g| g.question_id.as_deref() == Some("target-market")
            && g.category == GapCategory::Critical));
}

#[tokio::test]
async fn test_quick_depth_skips_quality_analysis() {
    let (_store, engine) = engine_with_store();
    let mut assessment = new_assessment();
    // Shallow answers everywhere.
    for question in BusinessDomain::MarketPosition.critical_questions() {
        assessment.record_response(
            BusinessDomain::MarketPosition,
            QuestionResponse::text(*question, "yes"),
        );
    }
    engine.submit_assessment(&assessment).unwrap();

    let quick = engine
        .analyze(
            assessment.id,
            AnalysisOptions {
                depth: AnalysisDepth::Quick,
                force_reanalysis: true,
                ..AnalysisOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(quick
        .analysis
        .gaps
        .iter()
        .all(|g| g.category != GapCategory::Important));

    let standard = engine
        .analyze(
            assessment.id,
            AnalysisOptions {
                depth: AnalysisDepth::Standard,
                force_reanalysis: true,
                ..AnalysisOptions::default()
            },
        )
        .await
        .unwrap();
    // The shallow answers now produce important gaps with follow-ups.
    let important: Vec<_> = standard
        .analysis
        .gaps
        .iter()
        .filter(|g| g.category == GapCategory::Important)
        .collect();
    assert_eq!(important.len(), 2);
    assert!(important.iter().all(|g| !g.suggested_questions.is_empty()));
}

#[tokio::test]
async fn test_conflicting_answers_become_a_gap() {
    let (_store, engine) = engine_with_store();
    let mut assessment = new_assessment();
    assessment.record_response(
        BusinessDomain::RevenueEngine,
        QuestionResponse::text(
            "growth-strategy",
            "Aggressive expansion because two competitors folded",
        ),
    );
    assessment.record_response(
        BusinessDomain::FinancialManagement,
        QuestionResponse::text(
            "budget-constraints",
            "Spending is severely limited because of last year's losses",
        ),
    );
    engine.submit_assessment(&assessment).unwrap();

    let outcome = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    assert!(outcome
        .analysis
        .gaps
        .iter()
        .any(|g| g.category == GapCategory::Critical && g.description.contains("growth")));
}

#[tokio::test]
async fn test_heavily_regulated_financial_gets_compliance_gap() {
    let (_store, engine) = engine_with_store();
    let mut assessment = Assessment::new(
        "Sterling Capital",
        "ops@sterling.test",
        IndustryProfile::new(
            IndustrySector::FinancialServices,
            RegulatoryTier::HeavilyRegulated,
        ),
    );
    answer_domain_fully(&mut assessment, BusinessDomain::MarketPosition);
    engine.submit_assessment(&assessment).unwrap();

    let outcome = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    let analysis = &outcome.analysis;

    assert_eq!(analysis.compliance_gaps.len(), 1);
    assert_eq!(analysis.compliance_gaps[0].level, ComplianceLevel::Missing);
    assert!(analysis.compliance_gaps[0].requirement.contains("FCA"));
    assert!(analysis
        .gaps
        .iter()
        .any(|g| g.domain == BusinessDomain::RiskCompliance));
}

#[tokio::test]
async fn test_non_regulated_sector_gets_no_compliance_gap() {
    let (_store, engine) = engine_with_store();
    let assessment = scenario_a_assessment();
    engine.submit_assessment(&assessment).unwrap();

    let outcome = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    assert!(outcome.analysis.compliance_gaps.is_empty());
}

#[tokio::test]
async fn test_gaps_are_globally_ordered() {
    let (_store, engine) = engine_with_store();
    let mut assessment = new_assessment();
    submit_empty_domain(&mut assessment, BusinessDomain::FinancialManagement);
    // A partially answered domain with one shallow answer.
    assessment.record_response(
        BusinessDomain::MarketPosition,
        QuestionResponse::text("target-market", "shops"),
    );
    engine.submit_assessment(&assessment).unwrap();

    let outcome = engine
        .analyze(assessment.id, AnalysisOptions::default())
        .await
        .unwrap();
    let priorities: Vec<u8> = outcome.analysis.gaps.iter().map(|g| g.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
    assert_eq!(priorities[0], 10);
}

#[tokio::test]
async fn test_missing_assessment_is_a_hard_error() {
    let engine = AssessmentEngine::in_memory();
    let err = engine
        .analyze(
            compass_core::assessment::AssessmentId::new(),
            AnalysisOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
