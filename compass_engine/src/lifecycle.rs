//! Gap lifecycle manager
//!
//! Owns gap resolution (single and bulk), recomputes the completeness
//! impact of each resolution, and hands critical resolutions to the
//! timeline resume check. Bulk processing isolates per-item failures: one
//! bad gap identifier never invalidates an otherwise-successful batch.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use compass_core::assessment::{AssessmentId, QuestionResponse};
use compass_core::config::EngineConfig;
use compass_core::errors::{EngineError, Result};
use compass_core::gap::{AssessmentGap, GapCategory, GapId, ResolutionMethod};
use compass_core::store::AssessmentStore;

use crate::detector::conflicts;
use crate::effects::{SideEffect, SideEffectKind};
use crate::scoring;
use crate::timeline::TimelineManager;

/// How a caller wants a gap resolved: a substantive answer or a skip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapResolutionRequest {
    pub client_response: Option<String>,
    #[serde(default)]
    pub skip_gap: bool,
    pub skip_reason: Option<String>,
}

/// Outcome of resolving one gap.
#[derive(Debug, Clone)]
pub struct GapResolutionOutcome {
    pub resolved: bool,
    pub impact_on_completeness: f64,
    /// Gaps the resolution response itself introduced.
    pub new_gaps: Vec<AssessmentGap>,
    pub message: String,
    pub side_effects: Vec<SideEffect>,
}

/// One item of a bulk resolution request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResolutionItem {
    pub gap_id: GapId,
    #[serde(flatten)]
    pub request: GapResolutionRequest,
}

/// A per-item failure inside a bulk resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedResolution {
    pub gap_id: GapId,
    pub error: String,
}

/// Report for a bulk resolution batch.
#[derive(Debug, Clone)]
pub struct BulkResolutionReport {
    pub processed_count: usize,
    pub resolved_count: usize,
    pub failed_resolutions: Vec<FailedResolution>,
    pub side_effects: Vec<SideEffect>,
}

/// Resolves gaps and triggers the timeline resume check.
pub struct GapLifecycleManager {
    store: Arc<dyn AssessmentStore>,
    timeline: Arc<TimelineManager>,
    config: EngineConfig,
}

impl GapLifecycleManager {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        timeline: Arc<TimelineManager>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            timeline,
            config,
        }
    }

    /// Resolve a single gap with a client response or a founder skip.
    pub async fn resolve(
        &self,
        gap_id: GapId,
        request: GapResolutionRequest,
    ) -> Result<GapResolutionOutcome> {
        let (mut outcome, was_critical, assessment_id) =
            self.resolve_inner(gap_id, request).await?;

        if was_critical {
            outcome
                .side_effects
                .push(self.resume_check(assessment_id).await);
        }

        Ok(outcome)
    }

    /// Process up to the batch cap of resolutions independently, then issue
    /// one resume check covering everything resolved in the batch.
    pub async fn resolve_bulk(
        &self,
        assessment_id: AssessmentId,
        items: Vec<BulkResolutionItem>,
    ) -> Result<BulkResolutionReport> {
        if items.is_empty() {
            return Err(EngineError::Validation(
                "Bulk resolution batch is empty".to_string(),
            ));
        }
        let cap = self.config.analysis.bulk_resolution_cap;
        if items.len() > cap {
            return Err(EngineError::Validation(format!(
                "Bulk resolution is capped at {cap} items"
            )));
        }

        let mut report = BulkResolutionReport {
            processed_count: 0,
            resolved_count: 0,
            failed_resolutions: Vec::new(),
            side_effects: Vec::new(),
        };
        let mut any_critical = false;

        for item in items {
            report.processed_count += 1;

            match self.store.get_gap(item.gap_id) {
                Ok(Some(gap)) if gap.assessment_id != assessment_id => {
                    report.failed_resolutions.push(FailedResolution {
                        gap_id: item.gap_id,
                        error: "Gap does not belong to this assessment".to_string(),
                    });
                    continue;
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    report.failed_resolutions.push(FailedResolution {
                        gap_id: item.gap_id,
                        error: "Gap not found".to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    report.failed_resolutions.push(FailedResolution {
                        gap_id: item.gap_id,
                        error: e.detail(),
                    });
                    continue;
                }
            }

            match self.resolve_inner(item.gap_id, item.request).await {
                Ok((outcome, was_critical, _)) => {
                    report.resolved_count += 1;
                    any_critical |= was_critical;
                    report.side_effects.extend(outcome.side_effects);
                }
                Err(e) => {
                    report.failed_resolutions.push(FailedResolution {
                        gap_id: item.gap_id,
                        error: e.detail(),
                    });
                }
            }
        }

        if any_critical {
            report.side_effects.push(self.resume_check(assessment_id).await);
        }

        Ok(report)
    }

    /// Resolution without the resume check; returns whether the gap was
    /// critical and its owning assessment.
    async fn resolve_inner(
        &self,
        gap_id: GapId,
        request: GapResolutionRequest,
    ) -> Result<(GapResolutionOutcome, bool, AssessmentId)> {
        let response = request
            .client_response
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        // Exactly one of a substantive response or a skip.
        match (response, request.skip_gap) {
            (Some(_), false) | (None, true) => {}
            (Some(_), true) => {
                return Err(EngineError::Validation(
                    "Provide either a client response or skip_gap, not both".to_string(),
                ));
            }
            (None, false) => {
                return Err(EngineError::Validation(
                    "A non-empty client response or skip_gap is required".to_string(),
                ));
            }
        }

        let gap = self
            .store
            .get_gap(gap_id)?
            .ok_or_else(|| EngineError::NotFound("Gap not found".to_string()))?;
        if gap.resolved {
            return Err(EngineError::Validation("Gap already resolved".to_string()));
        }

        let was_critical = gap.category == GapCategory::Critical;

        let outcome = if let Some(text) = response {
            self.resolve_with_response(&gap, text).await?
        } else {
            self.resolve_with_skip(&gap, request.skip_reason.as_deref())?
        };

        Ok((outcome, was_critical, gap.assessment_id))
    }

    async fn resolve_with_response(
        &self,
        gap: &AssessmentGap,
        text: &str,
    ) -> Result<GapResolutionOutcome> {
        let now = Utc::now();
        self.store.update_gap(gap.id, &move |g| {
            g.resolved = true;
            g.resolved_at = Some(now);
            g.resolution_method = Some(ResolutionMethod::ClientInput);
        })?;

        let impact = scoring::resolution_impact(gap.category, text.len());

        // Record the answer on the assessment when the gap names a question.
        let mut new_gaps = Vec::new();
        if let Some(question_id) = &gap.question_id {
            let domain = gap.domain;
            let answer = QuestionResponse::text(question_id.clone(), text);
            self.store.update_assessment(gap.assessment_id, &move |a| {
                a.record_response(domain, answer.clone());
            })?;

            // The response may itself introduce conflicts.
            if let Some(updated) = self.store.get_assessment(gap.assessment_id)? {
                for rule in conflicts::conflicts_for_question(&updated, domain, question_id) {
                    let conflict = conflicts::conflict_gap(&updated, rule);
                    if let Err(e) = self.store.put_gap(&conflict) {
                        tracing::warn!("Failed to persist introduced gap {}: {e}", conflict.id);
                    }
                    new_gaps.push(conflict);
                }
            }
        }

        let message = if new_gaps.is_empty() {
            "Gap resolved with client input".to_string()
        } else {
            format!(
                "Gap resolved with client input; the response introduced {} new gap(s)",
                new_gaps.len()
            )
        };

        Ok(GapResolutionOutcome {
            resolved: true,
            impact_on_completeness: impact,
            new_gaps,
            message,
            side_effects: Vec::new(),
        })
    }

    fn resolve_with_skip(
        &self,
        gap: &AssessmentGap,
        skip_reason: Option<&str>,
    ) -> Result<GapResolutionOutcome> {
        let now = Utc::now();
        self.store.update_gap(gap.id, &move |g| {
            g.resolved = true;
            g.resolved_at = Some(now);
            g.resolution_method = Some(ResolutionMethod::FounderOverride);
        })?;

        let message = match skip_reason {
            Some(reason) => format!("Gap skipped by founder override: {reason}"),
            None => "Gap skipped by founder override".to_string(),
        };

        Ok(GapResolutionOutcome {
            resolved: true,
            impact_on_completeness: 0.0,
            new_gaps: Vec::new(),
            message,
            side_effects: Vec::new(),
        })
    }

    /// Best-effort resume check covering every resolved gap of the
    /// assessment. A failure never fails the owning resolution.
    async fn resume_check(&self, assessment_id: AssessmentId) -> SideEffect {
        let resolved_ids: Vec<GapId> = match self.store.gaps_for_assessment(assessment_id) {
            Ok(gaps) => gaps.iter().filter(|g| g.resolved).map(|g| g.id).collect(),
            Err(e) => {
                tracing::warn!("Resume check could not list gaps for {assessment_id}: {e}");
                return SideEffect::failed(SideEffectKind::TimelineResume, e.detail());
            }
        };

        match self
            .timeline
            .resume_after_gap_resolution(assessment_id, &resolved_ids, "system")
            .await
        {
            Ok(resumed) => SideEffect {
                kind: SideEffectKind::TimelineResume,
                ok: true,
                detail: Some(if resumed {
                    "timeline resumed".to_string()
                } else {
                    "pause still active".to_string()
                }),
            },
            Err(e) => {
                tracing::warn!("Resume check failed for {assessment_id}: {e}");
                SideEffect::failed(SideEffectKind::TimelineResume, e.detail())
            }
        }
    }
}
