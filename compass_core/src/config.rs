//! Engine configuration
//!
//! Every tuned constant in the engine lives here as a named, overridable
//! field. Components receive an `EngineConfig` at construction; tests
//! override individual fields for deterministic behavior.

use std::time::Duration;

/// Complete engine configuration, injected into every component.
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub analysis: AnalysisRules,
    pub triage: TriageThresholds,
    pub timeline: TimelineRules,
    pub retry: RetryConfig,
}

/// Rules governing gap detection and resolution scoring
#[derive(Clone, Debug)]
pub struct AnalysisRules {
    /// Snapshot age below which a cached analysis is served (strict `<`)
    pub cache_freshness: Duration,
    /// Free-text answers shorter than this count as shallow
    pub min_response_chars: usize,
    /// Depth-indicator check applies only to answers longer than this
    pub depth_check_min_chars: usize,
    /// Maximum items accepted in one bulk resolution
    pub bulk_resolution_cap: usize,
    /// Priority assigned to a fully unanswered domain
    pub whole_domain_gap_priority: u8,
    /// Priority assigned to each missing critical question
    pub missing_critical_priority: u8,
    /// Estimated resolution minutes for a whole-domain gap
    pub whole_domain_resolution_minutes: u32,
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            cache_freshness: Duration::from_secs(2 * 60 * 60),
            min_response_chars: 10,
            depth_check_min_chars: 20,
            bulk_resolution_cap: 50,
            whole_domain_gap_priority: 10,
            missing_critical_priority: 9,
            whole_domain_resolution_minutes: 90,
        }
    }
}

/// Thresholds for triage validation and fallback selection
///
/// The severity boundaries and the quality-score blend are product-tuned
/// values carried over as-is; nothing here is derived.
#[derive(Clone, Debug)]
pub struct TriageThresholds {
    /// Score at or above which severity must be `critical`
    pub critical_severity_score: f64,
    /// Score at or above which severity must be `high`
    pub high_severity_score: f64,
    /// Score at or above which severity must be `medium`
    pub medium_severity_score: f64,
    /// Minimum size of the critical-domain selection
    pub min_critical_domains: usize,
    /// Maximum size of the critical-domain selection
    pub max_critical_domains: usize,
    /// Overall confidence below this triggers the default-domain path
    pub confidence_floor: f64,
    /// Composite quality score must exceed this
    pub quality_score_floor: f64,
    /// Average domain completeness (0-1) below this is flagged
    pub data_completeness_floor: f64,
    /// Average domain completeness (0-1) below this selects the industry fallback
    pub industry_fallback_floor: f64,
    /// Overall confidence may exceed the domain average by at most this
    pub confidence_gap_tolerance: f64,
    /// Quality blend weight: inverse score variance
    pub variance_weight: f64,
    /// Quality blend weight: average confidence (capped at 1.0)
    pub confidence_weight: f64,
    /// Quality blend weight: average domain completeness
    pub completeness_weight: f64,
    /// Confidence pinned after structural repair
    pub structural_confidence: f64,
    /// Confidence pinned after the default-domain fallback
    pub default_domain_confidence: f64,
    /// Minimum confidence after the industry fallback
    pub industry_confidence_floor: f64,
    /// Multiplier applied to confidence by the rule-based fallback
    pub rule_based_confidence_factor: f64,
    /// Floor for confidence after the rule-based fallback
    pub rule_based_confidence_floor: f64,
}

impl Default for TriageThresholds {
    fn default() -> Self {
        Self {
            critical_severity_score: 4.5,
            high_severity_score: 4.0,
            medium_severity_score: 3.5,
            min_critical_domains: 3,
            max_critical_domains: 5,
            confidence_floor: 0.7,
            quality_score_floor: 0.65,
            data_completeness_floor: 0.5,
            industry_fallback_floor: 0.6,
            confidence_gap_tolerance: 0.2,
            variance_weight: 0.3,
            confidence_weight: 0.4,
            completeness_weight: 0.3,
            structural_confidence: 0.65,
            default_domain_confidence: 0.6,
            industry_confidence_floor: 0.65,
            rule_based_confidence_factor: 0.9,
            rule_based_confidence_floor: 0.55,
        }
    }
}

/// Business rules for the delivery timeline
#[derive(Clone, Debug)]
pub struct TimelineRules {
    /// Lifetime extension cap per assessment
    pub max_extensions: usize,
    /// Extensions at or under this duration auto-approve
    pub auto_approve_threshold: Duration,
    /// Duration cap for gap-resolution extensions
    pub gap_resolution_extension_cap: Duration,
    /// Duration cap for clarification extensions
    pub clarification_extension_cap: Duration,
    /// Pauses longer than this earn an automatic extension on resume
    pub auto_extension_min_pause: Duration,
    /// Multiplier on estimated resolution time for critical gaps
    pub critical_gap_weight: f64,
    /// Remaining time to the first deadline under this is at-risk
    pub at_risk_window: Duration,
}

impl Default for TimelineRules {
    fn default() -> Self {
        Self {
            max_extensions: 3,
            auto_approve_threshold: Duration::from_secs(6 * 60 * 60),
            gap_resolution_extension_cap: Duration::from_secs(24 * 60 * 60),
            clarification_extension_cap: Duration::from_secs(12 * 60 * 60),
            auto_extension_min_pause: Duration::from_secs(60 * 60),
            critical_gap_weight: 1.5,
            at_risk_window: Duration::from_secs(4 * 60 * 60),
        }
    }
}

/// Retry behavior for completion-service calls
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
    /// Backoff multiplier (default: 2.0 for exponential)
    pub backoff_factor: f64,
    /// Whether to add jitter to delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_defaults() {
        let rules = AnalysisRules::default();
        assert_eq!(rules.cache_freshness, Duration::from_secs(7200));
        assert_eq!(rules.min_response_chars, 10);
        assert_eq!(rules.bulk_resolution_cap, 50);
    }

    #[test]
    fn test_triage_boundaries_are_ordered() {
        let t = TriageThresholds::default();
        assert!(t.critical_severity_score > t.high_severity_score);
        assert!(t.high_severity_score > t.medium_severity_score);
        assert!(t.min_critical_domains <= t.max_critical_domains);
    }

    #[test]
    fn test_quality_blend_weights_sum_to_one() {
        let t = TriageThresholds::default();
        let sum = t.variance_weight + t.confidence_weight + t.completeness_weight;
        assert!((sum - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_timeline_defaults() {
        let rules = TimelineRules::default();
        assert_eq!(rules.max_extensions, 3);
        assert_eq!(rules.auto_approve_threshold, Duration::from_secs(21600));
        assert!(rules.gap_resolution_extension_cap > rules.clarification_extension_cap);
    }
}
