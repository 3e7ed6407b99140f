//! Shared helpers for engine integration tests

use std::sync::Arc;

use compass_core::assessment::{Assessment, DomainResponse, QuestionResponse};
use compass_core::completion::StaticCompletion;
use compass_core::config::EngineConfig;
use compass_core::domain::{BusinessDomain, IndustryProfile, IndustrySector, RegulatoryTier};
use compass_core::notify::NoopNotifier;
use compass_core::store::InMemoryStore;
use compass_engine::AssessmentEngine;

/// Engine over a shared in-memory store, so tests can inspect records.
pub fn engine_with_store() -> (Arc<InMemoryStore>, AssessmentEngine) {
    let store = Arc::new(InMemoryStore::new());
    let engine = AssessmentEngine::new(
        store.clone(),
        Arc::new(StaticCompletion::default()),
        Arc::new(NoopNotifier),
        EngineConfig::default(),
    );
    (store, engine)
}

pub fn tech_profile() -> IndustryProfile {
    IndustryProfile::new(IndustrySector::Technology, RegulatoryTier::NonRegulated)
}

pub fn new_assessment() -> Assessment {
    Assessment::new("Acme Ltd", "founder@acme.test", tech_profile())
}

/// Answer every critical question of a domain with a substantive,
/// depth-carrying response.
pub fn answer_domain_fully(assessment: &mut Assessment, domain: BusinessDomain) {
    for question in domain.critical_questions() {
        assessment.record_response(
            domain,
            QuestionResponse::text(
                *question,
                format!(
                    "A considered answer for {question}, chosen because it reflects our current plan"
                ),
            ),
        );
    }
}

/// Register a domain with zero answers.
pub fn submit_empty_domain(assessment: &mut Assessment, domain: BusinessDomain) {
    assessment
        .domain_responses
        .insert(domain, DomainResponse::default());
}
