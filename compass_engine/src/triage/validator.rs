//! Triage validation
//!
//! Seven independent checks run over an AI triage analysis; their failures
//! are collected as a flat list of typed errors. The analysis passes
//! unchanged only when confidence is high enough and none of the collected
//! errors matches the critical pattern set; otherwise exactly one fallback
//! strategy repairs it deterministically.

use compass_core::assessment::Assessment;
use compass_core::config::TriageThresholds;
use compass_core::domain::DomainGroup;

use super::fallback::{self, FallbackStrategy};
use super::{DomainSeverity, PriorityLabel, TriageAnalysis};

/// A single validation finding, typed by the check that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageValidationError {
    DomainCoverage(String),
    ScoreConsistency(String),
    IndustryAlignment(String),
    DataCompleteness(String),
    QualityScore(String),
    ConfidenceBounds(String),
}

impl TriageValidationError {
    pub fn message(&self) -> &str {
        match self {
            Self::DomainCoverage(m)
            | Self::ScoreConsistency(m)
            | Self::IndustryAlignment(m)
            | Self::DataCompleteness(m)
            | Self::QualityScore(m)
            | Self::ConfidenceBounds(m) => m,
        }
    }
}

impl std::fmt::Display for TriageValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Error-message fragments that always disqualify an analysis from passing
/// unchanged, regardless of confidence.
const CRITICAL_ERROR_PATTERNS: &[&str] = &[
    "Insufficient critical domains",
    "Too many critical domains",
    "out of range",
    "Severity mismatch",
    "Priority mismatch",
    "Missing required domain",
    "risk-compliance",
];

/// Result of validating (and possibly repairing) a triage analysis.
#[derive(Debug, Clone)]
pub struct TriageValidationOutcome {
    /// Whether the original analysis was accepted unchanged.
    pub is_valid: bool,
    /// The analysis to trust downstream (original or repaired).
    pub result: TriageAnalysis,
    pub fallback_applied: bool,
    pub fallback: Option<FallbackStrategy>,
    pub errors: Vec<TriageValidationError>,
}

/// Validates triage output against structural and statistical invariants.
pub struct TriageValidator {
    thresholds: TriageThresholds,
}

impl TriageValidator {
    pub fn new(thresholds: TriageThresholds) -> Self {
        Self { thresholds }
    }

    /// Run all checks and, when they fail, apply exactly one fallback.
    pub fn validate(
        &self,
        assessment: &Assessment,
        analysis: TriageAnalysis,
    ) -> TriageValidationOutcome {
        let mut errors = Vec::new();
        self.check_domain_coverage(&analysis, &mut errors);
        self.check_score_consistency(&analysis, &mut errors);
        self.check_industry_alignment(assessment, &analysis, &mut errors);
        self.check_data_completeness(assessment, &mut errors);
        self.check_quality_score(assessment, &analysis, &mut errors);
        self.check_confidence_bounds(&analysis, &mut errors);

        if self.passes_unchanged(&analysis, &errors) {
            return TriageValidationOutcome {
                is_valid: true,
                result: analysis,
                fallback_applied: false,
                fallback: None,
                errors,
            };
        }

        let (repaired, strategy) =
            fallback::apply(assessment, analysis, &errors, &self.thresholds);
        TriageValidationOutcome {
            is_valid: false,
            result: repaired,
            fallback_applied: true,
            fallback: Some(strategy),
            errors,
        }
    }

    /// Check 7: accept unchanged iff confidence clears the floor and no
    /// collected error matches the critical pattern set.
    fn passes_unchanged(&self, analysis: &TriageAnalysis, errors: &[TriageValidationError]) -> bool {
        if analysis.overall_confidence < self.thresholds.confidence_floor {
            return false;
        }
        !errors.iter().any(|e| {
            CRITICAL_ERROR_PATTERNS
                .iter()
                .any(|pattern| e.message().contains(pattern))
        })
    }

    /// Check 1: 3-5 selected domains touching at least one core group.
    fn check_domain_coverage(
        &self,
        analysis: &TriageAnalysis,
        errors: &mut Vec<TriageValidationError>,
    ) {
        let count = analysis.critical_domains.len();
        if count < self.thresholds.min_critical_domains {
            errors.push(TriageValidationError::DomainCoverage(format!(
                "Insufficient critical domains selected: {count}"
            )));
        } else if count > self.thresholds.max_critical_domains {
            errors.push(TriageValidationError::DomainCoverage(format!(
                "Too many critical domains selected: {count}"
            )));
        }

        let touches_core_group = analysis.critical_domains.iter().any(|d| {
            matches!(
                d.group(),
                DomainGroup::Strategy | DomainGroup::Operations | DomainGroup::People
            )
        });
        if !analysis.critical_domains.is_empty() && !touches_core_group {
            errors.push(TriageValidationError::DomainCoverage(
                "Selection misses the strategy, operations, and people groups".to_string(),
            ));
        }
    }

    /// Check 2: scores in [1,5], confidences in [0,1], labels matching the
    /// threshold mapping exactly.
    fn check_score_consistency(
        &self,
        analysis: &TriageAnalysis,
        errors: &mut Vec<TriageValidationError>,
    ) {
        for ds in &analysis.domain_scores {
            if !(1.0..=5.0).contains(&ds.score) {
                errors.push(TriageValidationError::ScoreConsistency(format!(
                    "Score out of range for {}: {}",
                    ds.domain, ds.score
                )));
            }
            if !(0.0..=1.0).contains(&ds.confidence) {
                errors.push(TriageValidationError::ScoreConsistency(format!(
                    "Confidence out of range for {}: {}",
                    ds.domain, ds.confidence
                )));
            }

            let expected_severity = DomainSeverity::expected_for(ds.score, &self.thresholds);
            if ds.severity != expected_severity {
                errors.push(TriageValidationError::ScoreConsistency(format!(
                    "Severity mismatch for {}: expected {:?} at score {}, got {:?}",
                    ds.domain, expected_severity, ds.score, ds.severity
                )));
            }
            let expected_priority = PriorityLabel::expected_for(ds.score, &self.thresholds);
            if ds.priority != expected_priority {
                errors.push(TriageValidationError::ScoreConsistency(format!(
                    "Priority mismatch for {}: expected {:?} at score {}, got {:?}",
                    ds.domain, expected_priority, ds.score, ds.priority
                )));
            }
        }
    }

    /// Check 3: sector-required domains present; heavily-regulated sectors
    /// must include risk-compliance.
    fn check_industry_alignment(
        &self,
        assessment: &Assessment,
        analysis: &TriageAnalysis,
        errors: &mut Vec<TriageValidationError>,
    ) {
        let sector = assessment.industry.sector;
        for required in sector.required_domains() {
            if !analysis.critical_domains.contains(required) {
                errors.push(TriageValidationError::IndustryAlignment(format!(
                    "Missing required domain for {sector}: {required}"
                )));
            }
        }
        if assessment.industry.is_heavily_regulated()
            && !analysis
                .critical_domains
                .contains(&compass_core::domain::BusinessDomain::RiskCompliance)
        {
            errors.push(TriageValidationError::IndustryAlignment(
                "Heavily regulated sector requires risk-compliance in the selection".to_string(),
            ));
        }
    }

    /// Check 4: average per-domain completeness at or above 50%.
    fn check_data_completeness(
        &self,
        assessment: &Assessment,
        errors: &mut Vec<TriageValidationError>,
    ) {
        let avg = average_completeness(assessment);
        if avg < self.thresholds.data_completeness_floor * 100.0 {
            errors.push(TriageValidationError::DataCompleteness(format!(
                "Average domain completeness below 50%: {avg:.1}%"
            )));
        }
    }

    /// Check 5: the weighted quality blend must exceed its floor.
    fn check_quality_score(
        &self,
        assessment: &Assessment,
        analysis: &TriageAnalysis,
        errors: &mut Vec<TriageValidationError>,
    ) {
        let quality = quality_score(assessment, analysis, &self.thresholds);
        if quality <= self.thresholds.quality_score_floor {
            errors.push(TriageValidationError::QualityScore(format!(
                "Composite quality score too low: {quality:.2}"
            )));
        }
    }

    /// Check 6: overall confidence bounded and not inflated past the
    /// domain average.
    fn check_confidence_bounds(
        &self,
        analysis: &TriageAnalysis,
        errors: &mut Vec<TriageValidationError>,
    ) {
        let overall = analysis.overall_confidence;
        if !(0.0..=1.0).contains(&overall) {
            errors.push(TriageValidationError::ConfidenceBounds(format!(
                "Overall confidence out of range: {overall}"
            )));
        } else if overall > analysis.average_confidence() + self.thresholds.confidence_gap_tolerance
        {
            errors.push(TriageValidationError::ConfidenceBounds(format!(
                "Overall confidence {overall:.2} exceeds the domain average by more than {:.1}",
                self.thresholds.confidence_gap_tolerance
            )));
        }
    }
}

/// Mean of the stored per-domain completeness percentages (0 when the
/// assessment has no submitted domains).
pub fn average_completeness(assessment: &Assessment) -> f64 {
    if assessment.domain_responses.is_empty() {
        return 0.0;
    }
    assessment
        .domain_responses
        .values()
        .map(|r| r.completeness_pct)
        .sum::<f64>()
        / assessment.domain_responses.len() as f64
}

/// Weighted quality blend: 30% inverse score variance, 40% average
/// confidence capped at 1.0, 30% average domain completeness.
pub fn quality_score(
    assessment: &Assessment,
    analysis: &TriageAnalysis,
    thresholds: &TriageThresholds,
) -> f64 {
    let variance_inverse = 1.0 / (1.0 + analysis.score_variance());
    let avg_confidence = analysis.average_confidence().min(1.0);
    let avg_completeness = average_completeness(assessment) / 100.0;

    variance_inverse * thresholds.variance_weight
        + avg_confidence * thresholds.confidence_weight
        + avg_completeness * thresholds.completeness_weight
}
