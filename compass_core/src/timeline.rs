//! Delivery-timeline records: pause events and extensions
//!
//! `TimelineStatus` is always derived from these records plus the schedule,
//! never stored directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentId, DeliverySchedule};
use crate::gap::GapId;

/// Unique identifier for a pause event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauseEventId(uuid::Uuid);

impl PauseEventId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PauseEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PauseEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a timeline extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionId(uuid::Uuid);

impl ExtensionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExtensionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why the timeline was paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PauseReason {
    CriticalGaps,
}

/// A suspension of the delivery clock pending gap resolution.
///
/// At most one active pause per assessment. Closed on resume, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePauseEvent {
    pub id: PauseEventId,
    pub assessment_id: AssessmentId,
    pub reason: PauseReason,
    pub paused_at: DateTime<Utc>,
    pub paused_by: String,
    /// Gaps that must all be resolved before the timeline resumes.
    pub affected_gaps: Vec<GapId>,
    pub estimated_resolution_minutes: u32,
    pub next_steps: String,
    /// When the pause is expected to end.
    pub resume_by: DateTime<Utc>,
    pub resumed_at: Option<DateTime<Utc>>,
    pub resumed_by: Option<String>,
}

impl TimelinePauseEvent {
    pub fn is_active(&self) -> bool {
        self.resumed_at.is_none()
    }
}

/// Kind of timeline extension, each with its own duration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionType {
    GapResolution,
    Clarification,
}

impl ExtensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GapResolution => "gap-resolution",
            Self::Clarification => "clarification",
        }
    }
}

impl std::fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bounded forward shift of all three delivery deadlines.
///
/// Append-only; at most three per assessment, ever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineExtension {
    pub id: ExtensionId,
    pub assessment_id: AssessmentId,
    pub extension_type: ExtensionType,
    pub original_deadlines: DeliverySchedule,
    pub new_deadlines: DeliverySchedule,
    pub duration_minutes: i64,
    pub requested_by: String,
    pub justification: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
}

impl TimelineExtension {
    pub fn is_approved(&self) -> bool {
        self.approved_by.is_some()
    }
}

/// Derived delivery-timeline status, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineStatus {
    Paused,
    Extended,
    Overdue,
    AtRisk,
    OnTrack,
}

impl std::fmt::Display for TimelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Paused => "paused",
            Self::Extended => "extended",
            Self::Overdue => "overdue",
            Self::AtRisk => "at-risk",
            Self::OnTrack => "on-track",
        };
        write!(f, "{s}")
    }
}
