//! Deterministic triage repair strategies
//!
//! When validation fails, exactly one of four strategies repairs the
//! analysis, chosen by fixed precedence: structural repair, default
//! domains, industry defaults, rule-based reselection. Every strategy
//! appends its justification to the original reasoning text rather than
//! discarding it.

use serde::{Deserialize, Serialize};

use compass_core::assessment::Assessment;
use compass_core::config::TriageThresholds;
use compass_core::domain::{BusinessDomain, DEFAULT_CRITICAL_DOMAINS};

use super::validator::{average_completeness, quality_score, TriageValidationError};
use super::TriageAnalysis;

/// Which repair strategy was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStrategy {
    StructuralRepair,
    DefaultDomains,
    IndustryDefaults,
    RuleBased,
}

fn is_structural(error: &TriageValidationError) -> bool {
    match error {
        TriageValidationError::DomainCoverage(_) | TriageValidationError::IndustryAlignment(_) => {
            true
        }
        TriageValidationError::ScoreConsistency(m) => m.contains("out of range"),
        _ => false,
    }
}

/// Apply exactly one fallback strategy by precedence.
pub fn apply(
    assessment: &Assessment,
    analysis: TriageAnalysis,
    errors: &[TriageValidationError],
    thresholds: &TriageThresholds,
) -> (TriageAnalysis, FallbackStrategy) {
    if errors.iter().any(is_structural) {
        (
            structural_repair(assessment, analysis, thresholds),
            FallbackStrategy::StructuralRepair,
        )
    } else if analysis.overall_confidence < thresholds.confidence_floor {
        (
            default_domain_fallback(analysis, thresholds),
            FallbackStrategy::DefaultDomains,
        )
    } else if average_completeness(assessment) / 100.0 < thresholds.industry_fallback_floor {
        (
            industry_fallback(assessment, analysis, thresholds),
            FallbackStrategy::IndustryDefaults,
        )
    } else {
        // The remaining failure mode is a quality score at or under the
        // floor; reselect from the raw AI scores.
        debug_assert!(
            quality_score(assessment, &analysis, thresholds) <= thresholds.quality_score_floor
                || !errors.is_empty()
        );
        (
            rule_based_fallback(analysis, thresholds),
            FallbackStrategy::RuleBased,
        )
    }
}

/// Surgically repair the selection: top up to the minimum from the default
/// triad, trim to the top five by score, and force risk-compliance for
/// heavily regulated sectors.
fn structural_repair(
    assessment: &Assessment,
    mut analysis: TriageAnalysis,
    thresholds: &TriageThresholds,
) -> TriageAnalysis {
    let mut selected: Vec<BusinessDomain> = Vec::new();
    for domain in &analysis.critical_domains {
        if !selected.contains(domain) {
            selected.push(*domain);
        }
    }

    if selected.len() > thresholds.max_critical_domains {
        selected.sort_by(|a, b| {
            analysis
                .score_for(*b)
                .partial_cmp(&analysis.score_for(*a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        selected.truncate(thresholds.max_critical_domains);
    }

    for default in DEFAULT_CRITICAL_DOMAINS {
        if selected.len() >= thresholds.min_critical_domains {
            break;
        }
        if !selected.contains(&default) {
            selected.push(default);
        }
    }

    if assessment.industry.is_heavily_regulated()
        && !selected.contains(&BusinessDomain::RiskCompliance)
    {
        if selected.len() >= thresholds.max_critical_domains {
            // Evict the lowest-scoring member to make room.
            if let Some(lowest) = selected
                .iter()
                .copied()
                .min_by(|a, b| {
                    analysis
                        .score_for(*a)
                        .partial_cmp(&analysis.score_for(*b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            {
                selected.retain(|d| *d != lowest);
            }
        }
        selected.push(BusinessDomain::RiskCompliance);
    }

    analysis.reasoning.push_str(&format!(
        "\nStructural repair applied: selection adjusted to {} domains to satisfy coverage and industry rules.",
        selected.len()
    ));
    analysis.critical_domains = selected;
    analysis.overall_confidence = thresholds.structural_confidence;
    analysis
}

/// Discard the AI selection and use the fixed default triad.
fn default_domain_fallback(
    mut analysis: TriageAnalysis,
    thresholds: &TriageThresholds,
) -> TriageAnalysis {
    analysis.reasoning.push_str(
        "\nConfidence below threshold: replaced the selection with the default critical domains.",
    );
    analysis.critical_domains = DEFAULT_CRITICAL_DOMAINS.to_vec();
    analysis.overall_confidence = thresholds.default_domain_confidence;
    analysis
}

/// Replace the selection with the fixed industry-to-domain mapping.
fn industry_fallback(
    assessment: &Assessment,
    mut analysis: TriageAnalysis,
    thresholds: &TriageThresholds,
) -> TriageAnalysis {
    let sector = assessment.industry.sector;
    let domains: Vec<BusinessDomain> = sector
        .fallback_domains()
        .iter()
        .copied()
        .take(thresholds.max_critical_domains)
        .collect();

    analysis.reasoning.push_str(&format!(
        "\nAssessment data too sparse to trust the selection: using the standard {sector} domain set."
    ));
    analysis.critical_domains = domains;
    analysis.overall_confidence = analysis
        .overall_confidence
        .max(thresholds.industry_confidence_floor);
    analysis
}

/// Reselect the top domains by raw AI score.
fn rule_based_fallback(
    mut analysis: TriageAnalysis,
    thresholds: &TriageThresholds,
) -> TriageAnalysis {
    let mut scored: Vec<(BusinessDomain, f64)> = analysis
        .domain_scores
        .iter()
        .map(|d| (d.domain, d.score))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    analysis.critical_domains = scored
        .into_iter()
        .take(thresholds.max_critical_domains)
        .map(|(domain, _)| domain)
        .collect();
    analysis.reasoning.push_str(
        "\nComposite quality below threshold: reselected the top-scoring domains directly.",
    );
    analysis.overall_confidence = (analysis.overall_confidence
        * thresholds.rule_based_confidence_factor)
        .max(thresholds.rule_based_confidence_floor);
    analysis
}
