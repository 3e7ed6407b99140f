//! Storage abstraction for assessments, gaps, and timeline records
//!
//! Models a `(partition, sort)` document store with two secondary indexes:
//! by owning assessment (owner/time) and by pause activity (status/time).
//! The update methods take a closure so implementations can make
//! read-modify-write atomic; `create_pause` carries the optimistic
//! "no active pause" precondition.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::assessment::{Assessment, AssessmentId};
use crate::errors::{EngineError, Result, StoreError};
use crate::gap::{AssessmentGap, GapId};
use crate::timeline::{PauseEventId, TimelineExtension, TimelinePauseEvent};

/// Storage backend trait for the assessment engine
///
/// Thread-safe version requires Send + Sync
pub trait AssessmentStore: Send + Sync {
    /// Store an assessment (insert or overwrite)
    fn put_assessment(&self, assessment: &Assessment) -> Result<()>;

    /// Retrieve an assessment by ID
    fn get_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>>;

    /// Atomically read-modify-write an assessment
    fn update_assessment(&self, id: AssessmentId, apply: &dyn Fn(&mut Assessment)) -> Result<()>;

    /// Store a gap as an individually addressable record
    fn put_gap(&self, gap: &AssessmentGap) -> Result<()>;

    /// Retrieve a gap by ID
    fn get_gap(&self, id: GapId) -> Result<Option<AssessmentGap>>;

    /// List all gaps for an assessment, oldest first (owner index)
    fn gaps_for_assessment(&self, id: AssessmentId) -> Result<Vec<AssessmentGap>>;

    /// Atomically read-modify-write a gap
    fn update_gap(&self, id: GapId, apply: &dyn Fn(&mut AssessmentGap)) -> Result<()>;

    /// Create a pause event only if no active pause exists for the
    /// assessment; otherwise fails with `StoreError::Conflict`.
    fn create_pause(&self, event: &TimelinePauseEvent) -> Result<()>;

    /// The active pause event for an assessment, if any (status index)
    fn active_pause(&self, assessment_id: AssessmentId) -> Result<Option<TimelinePauseEvent>>;

    /// Atomically read-modify-write a pause event
    fn update_pause(&self, id: PauseEventId, apply: &dyn Fn(&mut TimelinePauseEvent)) -> Result<()>;

    /// Append an extension to the assessment's extension log
    fn append_extension(&self, extension: &TimelineExtension) -> Result<()>;

    /// All extensions for an assessment, oldest first
    fn extensions_for(&self, assessment_id: AssessmentId) -> Result<Vec<TimelineExtension>>;
}

/// In-memory store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryStore {
    assessments: RwLock<HashMap<AssessmentId, Assessment>>,
    gaps: RwLock<HashMap<GapId, AssessmentGap>>,
    gap_index: RwLock<HashMap<AssessmentId, Vec<GapId>>>,
    pauses: RwLock<HashMap<PauseEventId, TimelinePauseEvent>>,
    pause_index: RwLock<HashMap<AssessmentId, Vec<PauseEventId>>>,
    extensions: RwLock<HashMap<AssessmentId, Vec<TimelineExtension>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssessmentStore for InMemoryStore {
    fn put_assessment(&self, assessment: &Assessment) -> Result<()> {
        let mut assessments = self.assessments.write().expect("Store lock poisoned");
        assessments.insert(assessment.id, assessment.clone());
        Ok(())
    }

    fn get_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>> {
        let assessments = self.assessments.read().expect("Store lock poisoned");
        Ok(assessments.get(&id).cloned())
    }

    fn update_assessment(&self, id: AssessmentId, apply: &dyn Fn(&mut Assessment)) -> Result<()> {
        let mut assessments = self.assessments.write().expect("Store lock poisoned");
        let assessment = assessments
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("Assessment {id} not found")))?;
        apply(assessment);
        Ok(())
    }

    fn put_gap(&self, gap: &AssessmentGap) -> Result<()> {
        let mut gaps = self.gaps.write().expect("Store lock poisoned");
        let mut index = self.gap_index.write().expect("Store lock poisoned");
        if !gaps.contains_key(&gap.id) {
            index.entry(gap.assessment_id).or_default().push(gap.id);
        }
        gaps.insert(gap.id, gap.clone());
        Ok(())
    }

    fn get_gap(&self, id: GapId) -> Result<Option<AssessmentGap>> {
        let gaps = self.gaps.read().expect("Store lock poisoned");
        Ok(gaps.get(&id).cloned())
    }

    fn gaps_for_assessment(&self, id: AssessmentId) -> Result<Vec<AssessmentGap>> {
        let gaps = self.gaps.read().expect("Store lock poisoned");
        let index = self.gap_index.read().expect("Store lock poisoned");
        let ids = index.get(&id).cloned().unwrap_or_default();
        Ok(ids.iter().filter_map(|gid| gaps.get(gid).cloned()).collect())
    }

    fn update_gap(&self, id: GapId, apply: &dyn Fn(&mut AssessmentGap)) -> Result<()> {
        let mut gaps = self.gaps.write().expect("Store lock poisoned");
        let gap = gaps
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound("Gap not found".to_string()))?;
        apply(gap);
        Ok(())
    }

    fn create_pause(&self, event: &TimelinePauseEvent) -> Result<()> {
        let mut pauses = self.pauses.write().expect("Store lock poisoned");
        let mut index = self.pause_index.write().expect("Store lock poisoned");

        let ids = index.entry(event.assessment_id).or_default();
        let has_active = ids
            .iter()
            .filter_map(|pid| pauses.get(pid))
            .any(TimelinePauseEvent::is_active);
        if has_active {
            return Err(StoreError::Conflict(format!(
                "Active pause already exists for assessment {}",
                event.assessment_id
            ))
            .into());
        }

        ids.push(event.id);
        pauses.insert(event.id, event.clone());
        Ok(())
    }

    fn active_pause(&self, assessment_id: AssessmentId) -> Result<Option<TimelinePauseEvent>> {
        let pauses = self.pauses.read().expect("Store lock poisoned");
        let index = self.pause_index.read().expect("Store lock poisoned");
        let active = index
            .get(&assessment_id)
            .into_iter()
            .flatten()
            .filter_map(|pid| pauses.get(pid))
            .find(|p| p.is_active())
            .cloned();
        Ok(active)
    }

    fn update_pause(
        &self,
        id: PauseEventId,
        apply: &dyn Fn(&mut TimelinePauseEvent),
    ) -> Result<()> {
        let mut pauses = self.pauses.write().expect("Store lock poisoned");
        let pause = pauses
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("Pause event {id} not found")))?;
        apply(pause);
        Ok(())
    }

    fn append_extension(&self, extension: &TimelineExtension) -> Result<()> {
        let mut extensions = self.extensions.write().expect("Store lock poisoned");
        extensions
            .entry(extension.assessment_id)
            .or_default()
            .push(extension.clone());
        Ok(())
    }

    fn extensions_for(&self, assessment_id: AssessmentId) -> Result<Vec<TimelineExtension>> {
        let extensions = self.extensions.read().expect("Store lock poisoned");
        Ok(extensions.get(&assessment_id).cloned().unwrap_or_default())
    }
}
