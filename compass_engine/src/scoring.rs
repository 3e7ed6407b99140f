//! Scoring primitives
//!
//! Pure functions computing domain completeness, answer-quality predicates,
//! and resolution-impact math. Nothing here touches persistence or the
//! completion service.

use compass_core::assessment::DomainResponse;
use compass_core::config::AnalysisRules;
use compass_core::domain::BusinessDomain;
use compass_core::gap::{DomainCompletenessAnalysis, GapCategory};

/// Phrases whose presence marks an answer as having explanatory depth.
pub const DEPTH_INDICATORS: &[&str] = &[
    "because",
    "for example",
    "such as",
    "which means",
    "due to",
    "specifically",
    "in order to",
    "as a result",
];

/// Weight of critical-question coverage in a domain score.
const COVERAGE_WEIGHT: f64 = 70.0;
/// Weight of free-text answer quality in a domain score.
const QUALITY_WEIGHT: f64 = 30.0;

/// Compute the completeness analysis for one domain.
///
/// Coverage of the domain's critical questions carries 70% of the score;
/// the fraction of free-text answers that are not shallow carries 30%.
/// An empty domain scores zero.
pub fn domain_completeness(
    domain: BusinessDomain,
    response: &DomainResponse,
    rules: &AnalysisRules,
) -> DomainCompletenessAnalysis {
    let critical = domain.critical_questions();
    let total_critical = critical.len();

    if response.is_empty() {
        return DomainCompletenessAnalysis {
            domain,
            score: 0.0,
            answered_critical: 0,
            total_critical,
            gap_count: 0,
        };
    }

    let answered_critical = critical
        .iter()
        .filter(|q| {
            response
                .response(q)
                .map(|r| !r.value.is_blank())
                .unwrap_or(false)
        })
        .count();
    let coverage = if total_critical == 0 {
        1.0
    } else {
        answered_critical as f64 / total_critical as f64
    };

    let text_answers: Vec<&str> = response
        .responses
        .values()
        .filter_map(|r| r.value.as_text())
        .filter(|t| !t.trim().is_empty())
        .collect();
    let quality = if text_answers.is_empty() {
        1.0
    } else {
        let substantial = text_answers
            .iter()
            .filter(|t| !is_shallow(t, rules))
            .count();
        substantial as f64 / text_answers.len() as f64
    };

    let score = (coverage * COVERAGE_WEIGHT + quality * QUALITY_WEIGHT).clamp(0.0, 100.0);

    DomainCompletenessAnalysis {
        domain,
        score,
        answered_critical,
        total_critical,
        gap_count: 0,
    }
}

/// Domain-weight-averaged overall completeness over the scored domains.
pub fn overall_completeness<'a, I>(scores: I) -> f64
where
    I: IntoIterator<Item = &'a DomainCompletenessAnalysis>,
{
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for analysis in scores {
        let w = analysis.domain.weight();
        weighted += analysis.score * w;
        weight_sum += w;
    }
    if weight_sum == 0.0 {
        0.0
    } else {
        (weighted / weight_sum).clamp(0.0, 100.0)
    }
}

/// A free-text answer below the minimum length is shallow.
pub fn is_shallow(text: &str, rules: &AnalysisRules) -> bool {
    text.trim().len() < rules.min_response_chars
}

/// An answer long enough to explain itself but carrying no depth-indicator
/// phrase lacks depth.
pub fn lacks_depth(text: &str, rules: &AnalysisRules) -> bool {
    let trimmed = text.trim();
    if trimmed.len() <= rules.depth_check_min_chars {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !DEPTH_INDICATORS.iter().any(|phrase| lower.contains(phrase))
}

/// Quality multiplier for a resolution response of the given length:
/// 1.2 over 50 chars, 1.0 over 20, 0.8 otherwise.
pub fn quality_multiplier(response_len: usize) -> f64 {
    if response_len > 50 {
        1.2
    } else if response_len > 20 {
        1.0
    } else {
        0.8
    }
}

/// Completeness impact of resolving a gap with a response of the given
/// length: `base_impact(category) * quality_multiplier(len)`.
pub fn resolution_impact(category: GapCategory, response_len: usize) -> f64 {
    category.base_impact() * quality_multiplier(response_len)
}
