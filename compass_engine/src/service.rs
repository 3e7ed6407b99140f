//! Assessment engine facade
//!
//! Wires the detector, lifecycle manager, triage validator, and timeline
//! over one store and configuration, and exposes the engine operations as
//! single request/response calls.

use std::sync::Arc;

use chrono::Utc;

use compass_core::assessment::{Assessment, AssessmentId};
use compass_core::completion::{CompletionClient, StaticCompletion};
use compass_core::config::EngineConfig;
use compass_core::errors::{EngineError, Result};
use compass_core::gap::{AssessmentGap, GapId};
use compass_core::notify::{NoopNotifier, Notifier};
use compass_core::store::{AssessmentStore, InMemoryStore};
use compass_core::timeline::{ExtensionType, TimelineExtension, TimelinePauseEvent, TimelineStatus};

use crate::detector::{AnalysisOptions, AnalysisOutcome, GapDetector};
use crate::lifecycle::{
    BulkResolutionItem, BulkResolutionReport, GapLifecycleManager, GapResolutionOutcome,
    GapResolutionRequest,
};
use crate::timeline::TimelineManager;
use crate::triage::{TriageAnalysis, TriageValidationOutcome, TriageValidator};

/// Health check status
#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: String,
}

/// Facade over the assessment engine components.
pub struct AssessmentEngine {
    store: Arc<dyn AssessmentStore>,
    detector: GapDetector,
    lifecycle: GapLifecycleManager,
    validator: TriageValidator,
    timeline: Arc<TimelineManager>,
}

impl AssessmentEngine {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        completion: Arc<dyn CompletionClient>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        let timeline = Arc::new(TimelineManager::new(
            store.clone(),
            notifier.clone(),
            config.timeline.clone(),
        ));
        let detector = GapDetector::new(
            store.clone(),
            completion,
            notifier,
            timeline.clone(),
            config.clone(),
        );
        let lifecycle = GapLifecycleManager::new(store.clone(), timeline.clone(), config.clone());
        let validator = TriageValidator::new(config.triage);

        Self {
            store,
            detector,
            lifecycle,
            validator,
            timeline,
        }
    }

    /// In-memory engine with canned completions, for tests and offline use.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(StaticCompletion::default()),
            Arc::new(NoopNotifier),
            EngineConfig::default(),
        )
    }

    /// Register a freshly submitted assessment.
    pub fn submit_assessment(&self, assessment: &Assessment) -> Result<()> {
        self.store.put_assessment(assessment)
    }

    pub fn assessment(&self, id: AssessmentId) -> Result<Assessment> {
        self.store
            .get_assessment(id)?
            .ok_or_else(|| EngineError::NotFound(format!("Assessment {id} not found")))
    }

    pub fn gaps_for(&self, id: AssessmentId) -> Result<Vec<AssessmentGap>> {
        self.store.gaps_for_assessment(id)
    }

    /// Run (or serve a cached) gap analysis.
    pub async fn analyze(
        &self,
        id: AssessmentId,
        options: AnalysisOptions,
    ) -> Result<AnalysisOutcome> {
        self.detector.analyze(id, options).await
    }

    /// Resolve a single gap.
    pub async fn resolve_gap(
        &self,
        gap_id: GapId,
        request: GapResolutionRequest,
    ) -> Result<GapResolutionOutcome> {
        self.lifecycle.resolve(gap_id, request).await
    }

    /// Resolve a batch of gaps with per-item failure isolation.
    pub async fn resolve_gaps_bulk(
        &self,
        assessment_id: AssessmentId,
        items: Vec<BulkResolutionItem>,
    ) -> Result<BulkResolutionReport> {
        self.lifecycle.resolve_bulk(assessment_id, items).await
    }

    /// Validate an AI triage analysis, repairing it when necessary.
    pub fn validate_triage(
        &self,
        assessment_id: AssessmentId,
        analysis: TriageAnalysis,
    ) -> Result<TriageValidationOutcome> {
        let assessment = self.assessment(assessment_id)?;
        Ok(self.validator.validate(&assessment, analysis))
    }

    /// Pause the delivery timeline for a set of critical gaps.
    pub async fn pause_for_critical_gaps(
        &self,
        assessment_id: AssessmentId,
        critical_gaps: &[AssessmentGap],
        paused_by: &str,
    ) -> Result<TimelinePauseEvent> {
        self.timeline
            .pause_for_critical_gaps(assessment_id, critical_gaps, paused_by)
            .await
    }

    /// Resume the timeline once every affected gap is resolved.
    pub async fn resume_after_gap_resolution(
        &self,
        assessment_id: AssessmentId,
        resolved_gap_ids: &[GapId],
        resumed_by: &str,
    ) -> Result<bool> {
        self.timeline
            .resume_after_gap_resolution(assessment_id, resolved_gap_ids, resumed_by)
            .await
    }

    /// Request a bounded timeline extension.
    pub async fn request_extension(
        &self,
        assessment_id: AssessmentId,
        extension_type: ExtensionType,
        duration: chrono::Duration,
        justification: &str,
        requested_by: &str,
    ) -> Result<TimelineExtension> {
        self.timeline
            .request_extension(
                assessment_id,
                extension_type,
                duration,
                justification,
                requested_by,
            )
            .await
    }

    /// Derived delivery-timeline status right now.
    pub fn timeline_status(&self, assessment_id: AssessmentId) -> Result<TimelineStatus> {
        self.timeline.derive_status(assessment_id, Utc::now())
    }

    /// Health check against the backing store.
    pub fn health_check(&self) -> HealthStatus {
        match self.store.get_assessment(AssessmentId::new()) {
            Ok(_) => HealthStatus {
                healthy: true,
                message: "Engine is healthy".to_string(),
            },
            Err(e) => HealthStatus {
                healthy: false,
                message: format!("Store error: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::domain::{IndustryProfile, IndustrySector, RegulatoryTier};

    #[tokio::test]
    async fn test_engine_basic() {
        let engine = AssessmentEngine::in_memory();
        assert!(engine.health_check().healthy);

        let assessment = Assessment::new(
            "Acme",
            "founder@acme.test",
            IndustryProfile::new(IndustrySector::Technology, RegulatoryTier::NonRegulated),
        );
        engine.submit_assessment(&assessment).unwrap();

        let loaded = engine.assessment(assessment.id).unwrap();
        assert_eq!(loaded.company_name, "Acme");
        assert_eq!(
            engine.timeline_status(assessment.id).unwrap(),
            TimelineStatus::OnTrack
        );
    }

    #[tokio::test]
    async fn test_missing_assessment_surfaces_not_found() {
        let engine = AssessmentEngine::in_memory();
        let err = engine.assessment(AssessmentId::new()).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));

        let err = engine
            .analyze(AssessmentId::new(), AnalysisOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
