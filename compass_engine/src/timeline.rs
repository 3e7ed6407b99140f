//! Delivery-timeline state machine
//!
//! Owns the three-stage delivery deadlines. Reacts to critical gaps
//! (pause), resolutions (resume), and extension requests, enforcing the
//! bounded-extension business rules. Status is derived on demand from the
//! pause/extension records and the schedule, never stored.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use compass_core::assessment::{Assessment, AssessmentId, AssessmentStatus};
use compass_core::config::TimelineRules;
use compass_core::errors::{EngineError, Result, StoreError};
use compass_core::gap::{AssessmentGap, GapCategory, GapId};
use compass_core::notify::Notifier;
use compass_core::store::AssessmentStore;
use compass_core::timeline::{
    ExtensionId, ExtensionType, PauseEventId, PauseReason, TimelineExtension, TimelinePauseEvent,
    TimelineStatus,
};

fn chrono_dur(d: std::time::Duration) -> Duration {
    Duration::from_std(d).unwrap_or(Duration::MAX)
}

/// Drives pause, resume, extension, and status derivation for one store.
pub struct TimelineManager {
    store: Arc<dyn AssessmentStore>,
    notifier: Arc<dyn Notifier>,
    rules: TimelineRules,
}

impl TimelineManager {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        notifier: Arc<dyn Notifier>,
        rules: TimelineRules,
    ) -> Self {
        Self {
            store,
            notifier,
            rules,
        }
    }

    /// Derive the timeline status for an assessment at `now`.
    ///
    /// Precedence: paused, extended, overdue, at-risk, on-track.
    pub fn derive_status(&self, assessment_id: AssessmentId, now: DateTime<Utc>) -> Result<TimelineStatus> {
        let assessment = self.load(assessment_id)?;

        if self.store.active_pause(assessment_id)?.is_some() {
            return Ok(TimelineStatus::Paused);
        }
        if !self.store.extensions_for(assessment_id)?.is_empty() {
            return Ok(TimelineStatus::Extended);
        }
        if assessment.schedule.nearest_due() < now {
            return Ok(TimelineStatus::Overdue);
        }
        if assessment.schedule.executive_summary_due - now < chrono_dur(self.rules.at_risk_window) {
            return Ok(TimelineStatus::AtRisk);
        }
        Ok(TimelineStatus::OnTrack)
    }

    /// Pause the timeline for a set of critical gaps.
    ///
    /// The only path that creates a pause event. Rejects when a pause is
    /// already active, the clarification deadline has passed, or the
    /// extension count is at the maximum.
    pub async fn pause_for_critical_gaps(
        &self,
        assessment_id: AssessmentId,
        critical_gaps: &[AssessmentGap],
        paused_by: &str,
    ) -> Result<TimelinePauseEvent> {
        let assessment = self.load(assessment_id)?;
        let now = Utc::now();

        if now > assessment.clarification.deadline {
            return Err(EngineError::BusinessRule(
                "Clarification window has expired".to_string(),
            ));
        }
        if self.store.extensions_for(assessment_id)?.len() >= self.rules.max_extensions {
            return Err(EngineError::BusinessRule(
                "Maximum timeline extensions reached".to_string(),
            ));
        }

        let estimated_minutes = critical_gaps
            .iter()
            .map(|gap| {
                let weight = if gap.category == GapCategory::Critical {
                    self.rules.critical_gap_weight
                } else {
                    1.0
                };
                gap.estimated_resolution_minutes as f64 * weight
            })
            .sum::<f64>()
            .round() as u32;

        let resume_by = (now + Duration::minutes(estimated_minutes as i64))
            .min(assessment.clarification.deadline);

        let event = TimelinePauseEvent {
            id: PauseEventId::new(),
            assessment_id,
            reason: PauseReason::CriticalGaps,
            paused_at: now,
            paused_by: paused_by.to_string(),
            affected_gaps: critical_gaps.iter().map(|g| g.id).collect(),
            estimated_resolution_minutes: estimated_minutes,
            next_steps: format!(
                "Resolve the {} listed critical gaps to resume the delivery timeline",
                critical_gaps.len()
            ),
            resume_by,
            resumed_at: None,
            resumed_by: None,
        };

        // The store enforces the at-most-one-active-pause precondition.
        match self.store.create_pause(&event) {
            Ok(()) => {}
            Err(EngineError::Storage(StoreError::Conflict(_))) => {
                return Err(EngineError::BusinessRule(
                    "Timeline is already paused for this assessment".to_string(),
                ));
            }
            Err(e) => return Err(e),
        }

        self.store.update_assessment(assessment_id, &|a| {
            a.status = AssessmentStatus::PausedForGaps;
        })?;

        let text_body = format!(
            "Your delivery timeline is paused while {} critical gaps are resolved. \
             Estimated resolution time: {} minutes.",
            critical_gaps.len(),
            estimated_minutes
        );
        self.notify_best_effort(
            &assessment,
            "Delivery timeline paused",
            &text_body,
        )
        .await;

        Ok(event)
    }

    /// Resume the timeline once every gap tied to the pause is resolved.
    ///
    /// Returns `false` when no pause is active or when coverage is partial;
    /// partial resolution never resumes.
    pub async fn resume_after_gap_resolution(
        &self,
        assessment_id: AssessmentId,
        resolved_gap_ids: &[GapId],
        resumed_by: &str,
    ) -> Result<bool> {
        let Some(pause) = self.store.active_pause(assessment_id)? else {
            return Ok(false);
        };

        let resolved: HashSet<GapId> = resolved_gap_ids.iter().copied().collect();
        if pause.affected_gaps.iter().any(|gap| !resolved.contains(gap)) {
            return Ok(false);
        }

        let now = Utc::now();
        let paused_for = now.signed_duration_since(pause.paused_at);

        if paused_for > chrono_dur(self.rules.auto_extension_min_pause) {
            let duration = paused_for.min(chrono_dur(self.rules.gap_resolution_extension_cap));
            if let Err(e) = self
                .request_extension(
                    assessment_id,
                    ExtensionType::GapResolution,
                    duration,
                    "Automatic extension after gap-resolution pause",
                    "system",
                )
                .await
            {
                tracing::warn!(
                    "Automatic extension after pause failed for {assessment_id}: {e}"
                );
            }
        }

        self.store.update_pause(pause.id, &|p| {
            p.resumed_at = Some(now);
            p.resumed_by = Some(resumed_by.to_string());
        })?;

        let assessment = self.load(assessment_id)?;
        let next = assessment.milestones.next_status();
        self.store
            .update_assessment(assessment_id, &move |a| a.status = next)?;

        let text_body = format!(
            "All critical gaps are resolved. Your assessment has resumed in the {:?} stage.",
            next
        );
        self.notify_best_effort(&assessment, "Delivery timeline resumed", &text_body)
            .await;

        Ok(true)
    }

    /// Request a timeline extension, enforcing per-type caps and the
    /// lifetime maximum. Extensions at or under the auto-approval threshold
    /// are approved immediately and shift all three deadlines together.
    pub async fn request_extension(
        &self,
        assessment_id: AssessmentId,
        extension_type: ExtensionType,
        duration: Duration,
        justification: &str,
        requested_by: &str,
    ) -> Result<TimelineExtension> {
        let cap = match extension_type {
            ExtensionType::GapResolution => chrono_dur(self.rules.gap_resolution_extension_cap),
            ExtensionType::Clarification => chrono_dur(self.rules.clarification_extension_cap),
        };
        if duration > cap {
            return Err(EngineError::BusinessRule(format!(
                "Extension exceeds the {} cap of {} hours",
                extension_type,
                cap.num_hours()
            )));
        }
        if self.store.extensions_for(assessment_id)?.len() >= self.rules.max_extensions {
            return Err(EngineError::BusinessRule(
                "Maximum timeline extensions reached".to_string(),
            ));
        }

        let assessment = self.load(assessment_id)?;
        let now = Utc::now();
        let auto_approve = duration <= chrono_dur(self.rules.auto_approve_threshold);

        let original = assessment.schedule.clone();
        let extension = TimelineExtension {
            id: ExtensionId::new(),
            assessment_id,
            extension_type,
            original_deadlines: original.clone(),
            new_deadlines: original.shift(duration),
            duration_minutes: duration.num_minutes(),
            requested_by: requested_by.to_string(),
            justification: justification.to_string(),
            approved_by: auto_approve.then(|| "system".to_string()),
            approved_at: auto_approve.then_some(now),
            requested_at: now,
        };

        if auto_approve {
            // All three deadlines move together or not at all.
            self.store.update_assessment(assessment_id, &move |a| {
                a.schedule = a.schedule.shift(duration);
            })?;
        }
        self.store.append_extension(&extension)?;

        Ok(extension)
    }

    fn load(&self, assessment_id: AssessmentId) -> Result<Assessment> {
        self.store
            .get_assessment(assessment_id)?
            .ok_or_else(|| EngineError::NotFound(format!("Assessment {assessment_id} not found")))
    }

    async fn notify_best_effort(&self, assessment: &Assessment, subject: &str, text_body: &str) {
        let html_body = format!("<p>{text_body}</p>");
        let result = self
            .notifier
            .send(&assessment.contact_email, subject, &html_body, text_body)
            .await;
        if !result.success {
            tracing::warn!(
                "Timeline notification '{subject}' failed for {}: {}",
                assessment.id,
                result.error.unwrap_or_else(|| "unknown send failure".to_string())
            );
        }
    }
}
