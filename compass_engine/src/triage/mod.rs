//! Triage analysis types
//!
//! The AI-produced per-domain severity assessment: a numeric score per
//! domain, a confidence, and the derived severity/priority labels, plus the
//! overall critical-domain selection. Each label has an expected-value
//! relationship to the numeric score that the validator enforces.

pub mod fallback;
pub mod validator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use compass_core::assessment::AssessmentId;
use compass_core::config::TriageThresholds;
use compass_core::domain::BusinessDomain;

pub use fallback::FallbackStrategy;
pub use validator::{TriageValidationError, TriageValidationOutcome, TriageValidator};

/// Severity label derived from a domain score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DomainSeverity {
    /// The severity a score must carry: `critical` at 4.5 and above,
    /// `high` at 4.0, `medium` at 3.5, `low` below.
    pub fn expected_for(score: f64, thresholds: &TriageThresholds) -> Self {
        if score >= thresholds.critical_severity_score {
            Self::Critical
        } else if score >= thresholds.high_severity_score {
            Self::High
        } else if score >= thresholds.medium_severity_score {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Priority label derived from a domain score at the same thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLabel {
    Healthy,
    Moderate,
    High,
    Critical,
}

impl PriorityLabel {
    pub fn expected_for(score: f64, thresholds: &TriageThresholds) -> Self {
        if score >= thresholds.critical_severity_score {
            Self::Critical
        } else if score >= thresholds.high_severity_score {
            Self::High
        } else if score >= thresholds.medium_severity_score {
            Self::Moderate
        } else {
            Self::Healthy
        }
    }
}

/// AI severity assessment for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: BusinessDomain,
    /// 1-5
    pub score: f64,
    /// 0-1
    pub confidence: f64,
    pub severity: DomainSeverity,
    pub priority: PriorityLabel,
    pub reasoning: String,
}

impl DomainScore {
    /// A score whose labels agree with the thresholds, for construction in
    /// fallbacks and tests.
    pub fn consistent(
        domain: BusinessDomain,
        score: f64,
        confidence: f64,
        thresholds: &TriageThresholds,
    ) -> Self {
        Self {
            domain,
            score,
            confidence,
            severity: DomainSeverity::expected_for(score, thresholds),
            priority: PriorityLabel::expected_for(score, thresholds),
            reasoning: String::new(),
        }
    }
}

/// The full AI triage output for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageAnalysis {
    pub assessment_id: AssessmentId,
    pub domain_scores: Vec<DomainScore>,
    /// The 3-5 domains selected for deep specialist analysis.
    pub critical_domains: Vec<BusinessDomain>,
    /// 0-1
    pub overall_confidence: f64,
    pub reasoning: String,
    pub generated_at: DateTime<Utc>,
}

impl TriageAnalysis {
    /// Average of the per-domain confidences (0 when empty).
    pub fn average_confidence(&self) -> f64 {
        if self.domain_scores.is_empty() {
            return 0.0;
        }
        self.domain_scores.iter().map(|d| d.confidence).sum::<f64>()
            / self.domain_scores.len() as f64
    }

    /// Average of the per-domain scores (0 when empty).
    pub fn average_score(&self) -> f64 {
        if self.domain_scores.is_empty() {
            return 0.0;
        }
        self.domain_scores.iter().map(|d| d.score).sum::<f64>() / self.domain_scores.len() as f64
    }

    /// The raw AI score for a domain, 0 when the domain was not scored.
    pub fn score_for(&self, domain: BusinessDomain) -> f64 {
        self.domain_scores
            .iter()
            .find(|d| d.domain == domain)
            .map(|d| d.score)
            .unwrap_or(0.0)
    }

    /// Population variance of the domain scores.
    pub fn score_variance(&self) -> f64 {
        if self.domain_scores.is_empty() {
            return 0.0;
        }
        let mean = self.average_score();
        self.domain_scores
            .iter()
            .map(|d| (d.score - mean).powi(2))
            .sum::<f64>()
            / self.domain_scores.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> TriageThresholds {
        TriageThresholds::default()
    }

    #[test]
    fn test_severity_boundaries() {
        let t = thresholds();
        assert_eq!(DomainSeverity::expected_for(3.49, &t), DomainSeverity::Low);
        assert_eq!(DomainSeverity::expected_for(3.5, &t), DomainSeverity::Medium);
        assert_eq!(DomainSeverity::expected_for(3.99, &t), DomainSeverity::Medium);
        assert_eq!(DomainSeverity::expected_for(4.0, &t), DomainSeverity::High);
        assert_eq!(DomainSeverity::expected_for(4.49, &t), DomainSeverity::High);
        assert_eq!(DomainSeverity::expected_for(4.5, &t), DomainSeverity::Critical);
    }

    #[test]
    fn test_priority_boundaries() {
        let t = thresholds();
        assert_eq!(PriorityLabel::expected_for(3.49, &t), PriorityLabel::Healthy);
        assert_eq!(PriorityLabel::expected_for(3.5, &t), PriorityLabel::Moderate);
        assert_eq!(PriorityLabel::expected_for(3.99, &t), PriorityLabel::Moderate);
        assert_eq!(PriorityLabel::expected_for(4.0, &t), PriorityLabel::High);
        assert_eq!(PriorityLabel::expected_for(4.49, &t), PriorityLabel::High);
        assert_eq!(PriorityLabel::expected_for(4.5, &t), PriorityLabel::Critical);
    }

    #[test]
    fn test_averages_and_variance() {
        let t = thresholds();
        let analysis = TriageAnalysis {
            assessment_id: AssessmentId::new(),
            domain_scores: vec![
                DomainScore::consistent(BusinessDomain::StrategicAlignment, 3.0, 0.8, &t),
                DomainScore::consistent(BusinessDomain::FinancialManagement, 5.0, 0.6, &t),
            ],
            critical_domains: vec![],
            overall_confidence: 0.7,
            reasoning: String::new(),
            generated_at: Utc::now(),
        };

        assert!((analysis.average_score() - 4.0).abs() < 1e-9);
        assert!((analysis.average_confidence() - 0.7).abs() < 1e-9);
        assert!((analysis.score_variance() - 1.0).abs() < 1e-9);
        assert_eq!(analysis.score_for(BusinessDomain::FinancialManagement), 5.0);
        assert_eq!(analysis.score_for(BusinessDomain::RiskCompliance), 0.0);
    }
}
