//! Gap records and the analysis snapshot
//!
//! An `AssessmentGap` is the unit of missing, shallow, conflicting, or
//! non-compliant information. Gaps are individually addressable records:
//! created by the detector, mutated only on resolution, never deleted.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::assessment::AssessmentId;
use crate::domain::{BusinessDomain, IndustrySector};

/// Unique identifier for an assessment gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GapId(uuid::Uuid);

impl GapId {
    /// Create a new random GapId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create GapId from UUID bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }
}

impl Default for GapId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity category of a gap, ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapCategory {
    Critical,
    Important,
    NiceToHave,
}

impl GapCategory {
    /// Numeric rank for severity-descending ordering.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 2,
            Self::Important => 1,
            Self::NiceToHave => 0,
        }
    }

    /// Base completeness impact of resolving a gap in this category.
    pub fn base_impact(&self) -> f64 {
        match self {
            Self::Critical => 5.0,
            Self::Important => 3.0,
            Self::NiceToHave => 1.0,
        }
    }

    /// Default resolution-time estimate in minutes.
    pub fn default_resolution_minutes(&self) -> u32 {
        match self {
            Self::Critical => 60,
            Self::Important => 30,
            Self::NiceToHave => 15,
        }
    }
}

/// How a gap was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    ClientInput,
    AutoResolved,
    FounderOverride,
}

/// A detected deficiency in an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentGap {
    pub id: GapId,
    pub assessment_id: AssessmentId,
    pub domain: BusinessDomain,
    /// The specific question at fault, absent for whole-domain gaps.
    pub question_id: Option<String>,
    pub category: GapCategory,
    pub description: String,
    pub suggested_questions: Vec<String>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_method: Option<ResolutionMethod>,
    /// Whether this gap can pause the delivery timeline.
    pub impact_on_timeline: bool,
    /// Ordering priority, 0-10. Used only for ranking.
    pub priority: u8,
    pub estimated_resolution_minutes: u32,
    pub created_at: DateTime<Utc>,
}

impl AssessmentGap {
    /// Create an unresolved gap with category defaults.
    pub fn new(
        assessment_id: AssessmentId,
        domain: BusinessDomain,
        category: GapCategory,
        description: impl Into<String>,
        priority: u8,
    ) -> Self {
        Self {
            id: GapId::new(),
            assessment_id,
            domain,
            question_id: None,
            category,
            description: description.into(),
            suggested_questions: Vec::new(),
            resolved: false,
            resolved_at: None,
            resolution_method: None,
            impact_on_timeline: category == GapCategory::Critical,
            priority: priority.min(10),
            estimated_resolution_minutes: category.default_resolution_minutes(),
            created_at: Utc::now(),
        }
    }

    /// Attach the question this gap is about (builder pattern).
    pub fn for_question(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = Some(question_id.into());
        self
    }

    /// Attach suggested follow-up questions (builder pattern).
    pub fn with_suggestions(mut self, questions: Vec<String>) -> Self {
        self.suggested_questions = questions;
        self
    }

    /// Override the resolution-time estimate (builder pattern).
    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_resolution_minutes = minutes;
        self
    }
}

/// Compliance standing against one sector requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceLevel {
    /// All mandatory fields answered
    Full,
    /// Domain present but some mandatory fields unanswered
    Partial,
    /// The domain is absent from the assessment
    Missing,
}

/// An industry-specific compliance finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceGap {
    pub sector: IndustrySector,
    pub domain: BusinessDomain,
    pub requirement: String,
    pub level: ComplianceLevel,
    pub description: String,
}

/// Per-domain completeness figures inside an analysis snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainCompletenessAnalysis {
    pub domain: BusinessDomain,
    /// 0-100
    pub score: f64,
    pub answered_critical: usize,
    pub total_critical: usize,
    pub gap_count: usize,
}

/// Immutable snapshot of one gap-analysis run.
///
/// Replaces any prior snapshot on reanalysis; the derived counters are
/// fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub assessment_id: AssessmentId,
    /// Domain-weighted overall completeness, 0-100
    pub overall_score: f64,
    pub domain_scores: IndexMap<BusinessDomain, DomainCompletenessAnalysis>,
    pub compliance_gaps: Vec<ComplianceGap>,
    pub gaps: Vec<AssessmentGap>,
    pub critical_count: usize,
    pub total_count: usize,
    pub analyzed_at: DateTime<Utc>,
}

impl GapAnalysis {
    pub fn new(
        assessment_id: AssessmentId,
        overall_score: f64,
        domain_scores: IndexMap<BusinessDomain, DomainCompletenessAnalysis>,
        compliance_gaps: Vec<ComplianceGap>,
        gaps: Vec<AssessmentGap>,
    ) -> Self {
        let critical_count = gaps
            .iter()
            .filter(|g| g.category == GapCategory::Critical)
            .count();
        let total_count = gaps.len();
        Self {
            assessment_id,
            overall_score,
            domain_scores,
            compliance_gaps,
            gaps,
            critical_count,
            total_count,
            analyzed_at: Utc::now(),
        }
    }

    /// Unresolved critical gaps in this snapshot.
    pub fn critical_gaps(&self) -> Vec<&AssessmentGap> {
        self.gaps
            .iter()
            .filter(|g| g.category == GapCategory::Critical && !g.resolved)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_id_uniqueness() {
        assert_ne!(GapId::new(), GapId::new());
    }

    #[test]
    fn test_category_ordering_and_impact() {
        assert!(GapCategory::Critical.rank() > GapCategory::Important.rank());
        assert!(GapCategory::Important.rank() > GapCategory::NiceToHave.rank());
        assert_eq!(GapCategory::Critical.base_impact(), 5.0);
        assert_eq!(GapCategory::Important.base_impact(), 3.0);
        assert_eq!(GapCategory::NiceToHave.base_impact(), 1.0);
    }

    #[test]
    fn test_critical_gaps_pause_timeline_by_default() {
        let gap = AssessmentGap::new(
            AssessmentId::new(),
            BusinessDomain::FinancialManagement,
            GapCategory::Critical,
            "No cash runway answer",
            9,
        );
        assert!(gap.impact_on_timeline);

        let gap = AssessmentGap::new(
            AssessmentId::new(),
            BusinessDomain::FinancialManagement,
            GapCategory::Important,
            "Shallow budget answer",
            6,
        );
        assert!(!gap.impact_on_timeline);
    }

    #[test]
    fn test_priority_clamped_to_ten() {
        let gap = AssessmentGap::new(
            AssessmentId::new(),
            BusinessDomain::RevenueEngine,
            GapCategory::Critical,
            "test",
            12,
        );
        assert_eq!(gap.priority, 10);
    }

    #[test]
    fn test_analysis_derives_counters() {
        let assessment_id = AssessmentId::new();
        let gaps = vec![
            AssessmentGap::new(
                assessment_id,
                BusinessDomain::RevenueEngine,
                GapCategory::Critical,
                "a",
                10,
            ),
            AssessmentGap::new(
                assessment_id,
                BusinessDomain::RevenueEngine,
                GapCategory::NiceToHave,
                "b",
                2,
            ),
        ];
        let analysis = GapAnalysis::new(
            assessment_id,
            50.0,
            IndexMap::new(),
            Vec::new(),
            gaps,
        );
        assert_eq!(analysis.critical_count, 1);
        assert_eq!(analysis.total_count, 2);
        assert_eq!(analysis.critical_gaps().len(), 1);
    }
}
