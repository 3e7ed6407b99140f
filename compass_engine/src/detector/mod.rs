//! Gap detector
//!
//! Consumes an assessment snapshot plus the scoring primitives and produces
//! a ranked `GapAnalysis`: missing critical answers, shallow answers,
//! conflicting answers, and industry compliance gaps. Optionally enriched by
//! AI-generated follow-ups at standard depth and a full AI pass at
//! comprehensive depth.
//!
//! The analysis itself is the primary outcome; persisting the snapshot and
//! gap records, pausing the timeline, and notifying the contact are
//! best-effort side effects that never abort the returned analysis.

pub mod compliance;
pub mod conflicts;
pub mod followups;

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use compass_core::assessment::{Assessment, AssessmentId, DomainResponse};
use compass_core::completion::CompletionClient;
use compass_core::config::EngineConfig;
use compass_core::domain::BusinessDomain;
use compass_core::errors::{EngineError, Result};
use compass_core::gap::{AssessmentGap, GapAnalysis, GapCategory};
use compass_core::notify::Notifier;
use compass_core::store::AssessmentStore;

use crate::effects::{SideEffect, SideEffectKind};
use crate::scoring;
use crate::timeline::TimelineManager;

/// How much analysis to run per answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisDepth {
    /// Missing-answer and conflict checks only
    Quick,
    /// Adds the per-answer quality pass
    Standard,
    /// Adds a full AI gap pass per answer
    Comprehensive,
}

/// Options for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub depth: AnalysisDepth,
    /// Restrict the run to these domains; defaults to the submitted ones.
    pub focus_domains: Option<Vec<BusinessDomain>>,
    pub force_reanalysis: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            depth: AnalysisDepth::Standard,
            focus_domains: None,
            force_reanalysis: false,
        }
    }
}

/// Primary analysis outcome plus the side-effect record.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: GapAnalysis,
    /// Freshly generated each call, including on cache hits.
    pub recommendations: Vec<String>,
    pub side_effects: Vec<SideEffect>,
}

/// Detects completeness gaps and triggers the timeline on critical ones.
pub struct GapDetector {
    store: Arc<dyn AssessmentStore>,
    completion: Arc<dyn CompletionClient>,
    notifier: Arc<dyn Notifier>,
    timeline: Arc<TimelineManager>,
    config: EngineConfig,
}

impl GapDetector {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        completion: Arc<dyn CompletionClient>,
        notifier: Arc<dyn Notifier>,
        timeline: Arc<TimelineManager>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            completion,
            notifier,
            timeline,
            config,
        }
    }

    /// Analyze an assessment, serving a cached snapshot when fresh enough.
    pub async fn analyze(
        &self,
        assessment_id: AssessmentId,
        options: AnalysisOptions,
    ) -> Result<AnalysisOutcome> {
        let assessment = self
            .store
            .get_assessment(assessment_id)?
            .ok_or_else(|| EngineError::NotFound(format!("Assessment {assessment_id} not found")))?;

        if !options.force_reanalysis {
            if let Some(cached) = self.fresh_cached_analysis(&assessment) {
                tracing::debug!("Serving cached gap analysis for {assessment_id}");
                let recommendations = recommendations_for(&cached);
                return Ok(AnalysisOutcome {
                    analysis: cached,
                    recommendations,
                    side_effects: Vec::new(),
                });
            }
        }

        let analysis = self.run_analysis(&assessment, &options).await;
        let side_effects = self.apply_side_effects(&assessment, &analysis).await;
        let recommendations = recommendations_for(&analysis);

        Ok(AnalysisOutcome {
            analysis,
            recommendations,
            side_effects,
        })
    }

    /// A cached snapshot younger than the freshness window, if any.
    fn fresh_cached_analysis(&self, assessment: &Assessment) -> Option<GapAnalysis> {
        let analyzed_at = assessment.last_analyzed_at?;
        let cached = assessment.cached_analysis.as_ref()?;
        let age = Utc::now().signed_duration_since(analyzed_at);
        let window = chrono::Duration::from_std(self.config.analysis.cache_freshness)
            .unwrap_or_else(|_| chrono::Duration::MAX);
        if age < window {
            Some(cached.clone())
        } else {
            None
        }
    }

    async fn run_analysis(&self, assessment: &Assessment, options: &AnalysisOptions) -> GapAnalysis {
        let rules = &self.config.analysis;
        let scope = options
            .focus_domains
            .clone()
            .unwrap_or_else(|| assessment.domains_in_scope());

        let mut gaps: Vec<AssessmentGap> = Vec::new();
        let mut domain_scores = IndexMap::new();
        let empty = DomainResponse::default();

        for domain in &scope {
            let domain = *domain;
            let response = assessment.domain_responses.get(&domain).unwrap_or(&empty);

            if response.is_empty() {
                gaps.push(self.whole_domain_gap(assessment.id, domain));
            } else {
                gaps.extend(self.missing_critical_gaps(assessment.id, domain, response));

                if options.depth != AnalysisDepth::Quick {
                    gaps.extend(
                        self.quality_gaps(assessment.id, domain, response, options.depth)
                            .await,
                    );
                }
            }

            domain_scores.insert(domain, scoring::domain_completeness(domain, response, rules));
        }

        for rule in conflicts::detect_conflicts(assessment) {
            gaps.push(conflicts::conflict_gap(assessment, rule));
        }

        let compliance_findings = compliance::compliance_gaps(assessment);
        gaps.extend(compliance::compliance_assessment_gaps(
            assessment,
            &compliance_findings,
        ));

        for analysis in domain_scores.values_mut() {
            analysis.gap_count = gaps.iter().filter(|g| g.domain == analysis.domain).count();
        }

        order_gaps(&mut gaps);
        let overall = scoring::overall_completeness(domain_scores.values());

        GapAnalysis::new(
            assessment.id,
            overall,
            domain_scores,
            compliance_findings,
            gaps,
        )
    }

    fn whole_domain_gap(&self, assessment_id: AssessmentId, domain: BusinessDomain) -> AssessmentGap {
        AssessmentGap::new(
            assessment_id,
            domain,
            GapCategory::Critical,
            format!("No responses provided for the {domain} domain"),
            self.config.analysis.whole_domain_gap_priority,
        )
        .with_suggestions(
            domain
                .critical_questions()
                .iter()
                .map(|q| format!("Provide an answer for '{q}'"))
                .collect(),
        )
        .with_estimate(self.config.analysis.whole_domain_resolution_minutes)
    }

    fn missing_critical_gaps(
        &self,
        assessment_id: AssessmentId,
        domain: BusinessDomain,
        response: &DomainResponse,
    ) -> Vec<AssessmentGap> {
        domain
            .critical_questions()
            .iter()
            .filter(|q| {
                response
                    .response(q)
                    .map(|r| r.value.is_blank())
                    .unwrap_or(true)
            })
            .map(|q| {
                AssessmentGap::new(
                    assessment_id,
                    domain,
                    GapCategory::Critical,
                    format!("Critical question '{q}' in {domain} is unanswered"),
                    self.config.analysis.missing_critical_priority,
                )
                .for_question(*q)
                .with_suggestions(vec![format!("Provide an answer for '{q}'")])
            })
            .collect()
    }

    async fn quality_gaps(
        &self,
        assessment_id: AssessmentId,
        domain: BusinessDomain,
        response: &DomainResponse,
        depth: AnalysisDepth,
    ) -> Vec<AssessmentGap> {
        let rules = &self.config.analysis;
        let mut gaps = Vec::new();

        for (question_id, answer) in &response.responses {
            let Some(text) = answer.value.as_text() else {
                continue;
            };
            if text.trim().is_empty() {
                continue; // missing, not shallow; handled by the critical pass
            }

            if scoring::is_shallow(text, rules) {
                let suggestions = followups::follow_up_questions(
                    self.completion.as_ref(),
                    &self.config.retry,
                    domain,
                    question_id,
                    text,
                )
                .await;
                gaps.push(
                    AssessmentGap::new(
                        assessment_id,
                        domain,
                        GapCategory::Important,
                        format!("Answer to '{question_id}' in {domain} is too brief to act on"),
                        6,
                    )
                    .for_question(question_id.clone())
                    .with_suggestions(suggestions),
                );
            } else if scoring::lacks_depth(text, rules) {
                gaps.push(
                    AssessmentGap::new(
                        assessment_id,
                        domain,
                        GapCategory::NiceToHave,
                        format!("Answer to '{question_id}' in {domain} lacks supporting detail"),
                        3,
                    )
                    .for_question(question_id.clone()),
                );
            }

            if depth == AnalysisDepth::Comprehensive {
                gaps.extend(
                    followups::deep_analysis_gaps(
                        self.completion.as_ref(),
                        &self.config.retry,
                        assessment_id,
                        domain,
                        question_id,
                        text,
                    )
                    .await,
                );
            }
        }

        gaps
    }

    /// Persist the snapshot and gap records; pause and notify on critical
    /// gaps. Failures are logged and recorded, never bubbled.
    async fn apply_side_effects(
        &self,
        assessment: &Assessment,
        analysis: &GapAnalysis,
    ) -> Vec<SideEffect> {
        let mut effects = Vec::new();

        let snapshot = analysis.clone();
        match self.store.update_assessment(assessment.id, &move |a| {
            a.cached_analysis = Some(snapshot.clone());
            a.last_analyzed_at = Some(snapshot.analyzed_at);
        }) {
            Ok(()) => effects.push(SideEffect::succeeded(SideEffectKind::PersistAnalysis)),
            Err(e) => {
                tracing::warn!("Failed to persist analysis snapshot for {}: {e}", assessment.id);
                effects.push(SideEffect::failed(SideEffectKind::PersistAnalysis, e.detail()));
            }
        }

        let mut gap_failures = 0usize;
        for gap in &analysis.gaps {
            if let Err(e) = self.store.put_gap(gap) {
                tracing::warn!("Failed to persist gap {}: {e}", gap.id);
                gap_failures += 1;
            }
        }
        if gap_failures == 0 {
            effects.push(SideEffect::succeeded(SideEffectKind::PersistGaps));
        } else {
            effects.push(SideEffect::failed(
                SideEffectKind::PersistGaps,
                format!("{gap_failures} of {} gap records failed to persist", analysis.total_count),
            ));
        }

        if analysis.critical_count > 0 {
            let critical: Vec<AssessmentGap> =
                analysis.critical_gaps().into_iter().cloned().collect();
            match self
                .timeline
                .pause_for_critical_gaps(assessment.id, &critical, "system")
                .await
            {
                Ok(_) => effects.push(SideEffect::succeeded(SideEffectKind::TimelinePause)),
                Err(e) => {
                    tracing::warn!("Timeline pause failed for {}: {e}", assessment.id);
                    effects.push(SideEffect::failed(SideEffectKind::TimelinePause, e.detail()));
                }
            }

            let subject = format!(
                "{} critical gaps found in your assessment",
                analysis.critical_count
            );
            let text_body = format!(
                "Our analysis found {} critical gaps across your assessment. \
                 Your delivery timeline is paused until they are resolved.",
                analysis.critical_count
            );
            let html_body = format!("<p>{text_body}</p>");
            let result = self
                .notifier
                .send(&assessment.contact_email, &subject, &html_body, &text_body)
                .await;
            if result.success {
                effects.push(SideEffect::succeeded(SideEffectKind::Notification));
            } else {
                let detail = result.error.unwrap_or_else(|| "unknown send failure".to_string());
                tracing::warn!("Gap notification failed for {}: {detail}", assessment.id);
                effects.push(SideEffect::failed(SideEffectKind::Notification, detail));
            }
        }

        effects
    }
}

/// Global gap ordering: priority descending, then category severity
/// descending, then domain weight descending.
pub fn order_gaps(gaps: &mut [AssessmentGap]) {
    gaps.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.category.rank().cmp(&a.category.rank()))
            .then_with(|| {
                b.domain
                    .weight()
                    .partial_cmp(&a.domain.weight())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
}

/// Human-readable next steps derived from a snapshot.
pub fn recommendations_for(analysis: &GapAnalysis) -> Vec<String> {
    let mut recommendations: Vec<String> = analysis
        .gaps
        .iter()
        .filter(|g| !g.resolved)
        .take(3)
        .map(|g| format!("Address: {}", g.description))
        .collect();

    if analysis.overall_score < 50.0 {
        recommendations.push(
            "Overall completeness is low; prioritise the critical gaps before the clarification deadline"
                .to_string(),
        );
    }
    for finding in &analysis.compliance_gaps {
        if finding.level != compass_core::gap::ComplianceLevel::Full {
            recommendations.push(format!("Review compliance: {}", finding.requirement));
        }
    }

    recommendations
}
