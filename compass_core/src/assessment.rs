//! Assessment aggregate and questionnaire response types

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{BusinessDomain, IndustryProfile};
use crate::gap::GapAnalysis;

/// Unique identifier for an assessment
///
/// UUID v4 wrapper following the same pattern as GapId and PauseEventId.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(uuid::Uuid);

impl AssessmentId {
    /// Create a new random AssessmentId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create AssessmentId from UUID bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }
}

impl Default for AssessmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value of a single questionnaire answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl ResponseValue {
    /// Free-text content, if this answer carries any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// An empty or all-whitespace answer counts as missing.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }
}

/// A single answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question_id: String,
    pub value: ResponseValue,
    pub answered_at: DateTime<Utc>,
}

impl QuestionResponse {
    pub fn text(question_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            value: ResponseValue::Text(value.into()),
            answered_at: Utc::now(),
        }
    }
}

/// All responses recorded for one business domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainResponse {
    pub responses: IndexMap<String, QuestionResponse>,
    /// Critical-question coverage, 0-100. Maintained on every write.
    pub completeness_pct: f64,
}

impl DomainResponse {
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn response(&self, question_id: &str) -> Option<&QuestionResponse> {
        self.responses.get(question_id)
    }

    /// Record (or overwrite) an answer and refresh the completeness figure.
    pub fn record(&mut self, domain: BusinessDomain, response: QuestionResponse) {
        self.responses.insert(response.question_id.clone(), response);
        self.completeness_pct = self.critical_coverage_pct(domain);
    }

    /// Percentage of the domain's critical questions answered non-blank.
    pub fn critical_coverage_pct(&self, domain: BusinessDomain) -> f64 {
        let critical = domain.critical_questions();
        if critical.is_empty() {
            return 100.0;
        }
        let answered = critical
            .iter()
            .filter(|q| {
                self.responses
                    .get(**q)
                    .map(|r| !r.value.is_blank())
                    .unwrap_or(false)
            })
            .count();
        answered as f64 / critical.len() as f64 * 100.0
    }
}

/// The three fixed delivery deadlines.
///
/// Deadlines always move together; `shift` is the only mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySchedule {
    pub executive_summary_due: DateTime<Utc>,
    pub detailed_report_due: DateTime<Utc>,
    pub implementation_kit_due: DateTime<Utc>,
}

impl DeliverySchedule {
    /// Standard schedule from a submission time: 24 h summary, 5 day
    /// report, 10 day implementation kit.
    pub fn standard(submitted_at: DateTime<Utc>) -> Self {
        Self {
            executive_summary_due: submitted_at + Duration::hours(24),
            detailed_report_due: submitted_at + Duration::hours(120),
            implementation_kit_due: submitted_at + Duration::hours(240),
        }
    }

    /// Shift all three deadlines forward by the same duration.
    pub fn shift(&self, by: Duration) -> Self {
        Self {
            executive_summary_due: self.executive_summary_due + by,
            detailed_report_due: self.detailed_report_due + by,
            implementation_kit_due: self.implementation_kit_due + by,
        }
    }

    /// The earliest of the three deadlines.
    pub fn nearest_due(&self) -> DateTime<Utc> {
        self.executive_summary_due
            .min(self.detailed_report_due)
            .min(self.implementation_kit_due)
    }
}

/// Clarification-request policy attached to an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationPolicy {
    /// Deadline past which no new pause may start
    pub deadline: DateTime<Utc>,
    pub max_requests: u32,
    /// Largest clarification extension this assessment may receive
    pub max_extension_minutes: i64,
}

impl ClarificationPolicy {
    pub fn standard(submitted_at: DateTime<Utc>) -> Self {
        Self {
            deadline: submitted_at + Duration::hours(72),
            max_requests: 5,
            max_extension_minutes: 12 * 60,
        }
    }
}

/// Lifecycle status of an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentStatus {
    Received,
    Triaging,
    Analyzing,
    Synthesizing,
    Validating,
    PausedForGaps,
    Delivered,
}

/// Completion timestamps for the pipeline milestones.
///
/// The post-resume lifecycle stage is derived from which of these are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestones {
    pub triaged_at: Option<DateTime<Utc>>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub synthesized_at: Option<DateTime<Utc>>,
    pub validated_at: Option<DateTime<Utc>>,
}

impl Milestones {
    /// The stage the pipeline should resume into.
    pub fn next_status(&self) -> AssessmentStatus {
        if self.triaged_at.is_none() {
            AssessmentStatus::Triaging
        } else if self.analyzed_at.is_none() {
            AssessmentStatus::Analyzing
        } else if self.synthesized_at.is_none() {
            AssessmentStatus::Synthesizing
        } else {
            AssessmentStatus::Validating
        }
    }
}

/// Aggregate root: one company's assessment submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub company_name: String,
    pub contact_email: String,
    pub industry: IndustryProfile,
    pub domain_responses: IndexMap<BusinessDomain, DomainResponse>,
    pub schedule: DeliverySchedule,
    pub clarification: ClarificationPolicy,
    pub status: AssessmentStatus,
    pub milestones: Milestones,
    pub last_analyzed_at: Option<DateTime<Utc>>,
    pub cached_analysis: Option<GapAnalysis>,
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    /// Create a freshly submitted assessment with the standard schedule.
    pub fn new(
        company_name: impl Into<String>,
        contact_email: impl Into<String>,
        industry: IndustryProfile,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AssessmentId::new(),
            company_name: company_name.into(),
            contact_email: contact_email.into(),
            industry,
            domain_responses: IndexMap::new(),
            schedule: DeliverySchedule::standard(now),
            clarification: ClarificationPolicy::standard(now),
            status: AssessmentStatus::Received,
            milestones: Milestones::default(),
            last_analyzed_at: None,
            cached_analysis: None,
            created_at: now,
        }
    }

    /// Domains the company has submitted (possibly with zero answers).
    pub fn domains_in_scope(&self) -> Vec<BusinessDomain> {
        self.domain_responses.keys().copied().collect()
    }

    /// Free-text answer for a question, if present.
    pub fn response_text(&self, domain: BusinessDomain, question_id: &str) -> Option<&str> {
        self.domain_responses
            .get(&domain)?
            .response(question_id)?
            .value
            .as_text()
    }

    /// Record an answer, creating the domain entry if needed.
    pub fn record_response(&mut self, domain: BusinessDomain, response: QuestionResponse) {
        self.domain_responses
            .entry(domain)
            .or_default()
            .record(domain, response);
    }
}
