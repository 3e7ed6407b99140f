//! Conflict detection between questionnaire answers
//!
//! A fixed rule table pairs answer signals that contradict each other,
//! within a domain or across domains. Matching is lowercase substring
//! matching on free text; each matched rule becomes a gap whose category
//! is derived from the conflict severity.

use compass_core::assessment::Assessment;
use compass_core::domain::BusinessDomain;
use compass_core::gap::{AssessmentGap, GapCategory};

/// How strongly two answers contradict each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSeverity {
    Minor,
    Moderate,
    Major,
}

impl ConflictSeverity {
    /// Gap category for a conflict of this severity.
    pub fn category(&self) -> GapCategory {
        match self {
            Self::Major => GapCategory::Critical,
            Self::Moderate => GapCategory::Important,
            Self::Minor => GapCategory::NiceToHave,
        }
    }

    /// Ordering priority for the resulting gap.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Major => 8,
            Self::Moderate => 5,
            Self::Minor => 2,
        }
    }
}

/// One side of a conflict rule: an answer containing any listed phrase.
#[derive(Debug, Clone, Copy)]
pub struct ConflictSignal {
    pub domain: BusinessDomain,
    pub question: &'static str,
    pub phrases: &'static [&'static str],
}

/// A pair of contradicting answer signals.
#[derive(Debug, Clone, Copy)]
pub struct ConflictRule {
    pub id: &'static str,
    pub description: &'static str,
    pub severity: ConflictSeverity,
    pub left: ConflictSignal,
    pub right: ConflictSignal,
}

/// The fixed conflict rule table.
pub const CONFLICT_RULES: &[ConflictRule] = &[
    ConflictRule {
        id: "growth-vs-budget",
        description: "Aggressive growth plans conflict with a severely limited budget",
        severity: ConflictSeverity::Major,
        left: ConflictSignal {
            domain: BusinessDomain::RevenueEngine,
            question: "growth-strategy",
            phrases: &["aggressive", "rapid expansion", "double revenue", "triple"],
        },
        right: ConflictSignal {
            domain: BusinessDomain::FinancialManagement,
            question: "budget-constraints",
            phrases: &["severely limited", "no budget", "minimal budget", "very tight"],
        },
    },
    ConflictRule {
        id: "headcount-vs-freeze",
        description: "Headcount growth objectives conflict with a hiring freeze",
        severity: ConflictSeverity::Major,
        left: ConflictSignal {
            domain: BusinessDomain::StrategicAlignment,
            question: "three-year-objectives",
            phrases: &["headcount", "scale the team", "new hires", "grow the team"],
        },
        right: ConflictSignal {
            domain: BusinessDomain::PeopleCulture,
            question: "hiring-plan",
            phrases: &["freeze", "no hiring", "reduce headcount"],
        },
    },
    ConflictRule {
        id: "premium-vs-discount",
        description: "Premium market positioning conflicts with discount pricing",
        severity: ConflictSeverity::Moderate,
        left: ConflictSignal {
            domain: BusinessDomain::MarketPosition,
            question: "positioning",
            phrases: &["premium", "high-end", "luxury"],
        },
        right: ConflictSignal {
            domain: BusinessDomain::RevenueEngine,
            question: "pricing-model",
            phrases: &["discount", "cheapest", "undercut", "lowest price"],
        },
    },
    ConflictRule {
        id: "automation-vs-manual",
        description: "Automation ambitions conflict with a manual systems inventory",
        severity: ConflictSeverity::Moderate,
        left: ConflictSignal {
            domain: BusinessDomain::TechnologyData,
            question: "automation-roadmap",
            phrases: &["fully automated", "automation", "automate"],
        },
        right: ConflictSignal {
            domain: BusinessDomain::TechnologyData,
            question: "systems-inventory",
            phrases: &["spreadsheets", "manual", "paper-based"],
        },
    },
    ConflictRule {
        id: "delivery-vs-leadtime",
        description: "Fast delivery commitments conflict with long supplier lead times",
        severity: ConflictSeverity::Moderate,
        left: ConflictSignal {
            domain: BusinessDomain::OperationalExcellence,
            question: "delivery-commitments",
            phrases: &["next-day", "same day", "48 hours"],
        },
        right: ConflictSignal {
            domain: BusinessDomain::SupplyChain,
            question: "supplier-lead-times",
            phrases: &["long lead", "12 weeks", "unreliable", "months"],
        },
    },
    ConflictRule {
        id: "compliance-vs-findings",
        description: "Stated compliance confidence conflicts with known open issues",
        severity: ConflictSeverity::Minor,
        left: ConflictSignal {
            domain: BusinessDomain::RiskCompliance,
            question: "compliance-confidence",
            phrases: &["fully compliant", "no concerns", "completely confident"],
        },
        right: ConflictSignal {
            domain: BusinessDomain::RiskCompliance,
            question: "known-issues",
            phrases: &["open findings", "breach", "outstanding", "unresolved"],
        },
    },
];

fn signal_matches(assessment: &Assessment, signal: &ConflictSignal) -> bool {
    match assessment.response_text(signal.domain, signal.question) {
        Some(text) => {
            let lower = text.to_lowercase();
            signal.phrases.iter().any(|phrase| lower.contains(phrase))
        }
        None => false,
    }
}

fn rule_matches(assessment: &Assessment, rule: &ConflictRule) -> bool {
    signal_matches(assessment, &rule.left) && signal_matches(assessment, &rule.right)
}

/// All conflicts present in the assessment.
pub fn detect_conflicts(assessment: &Assessment) -> Vec<&'static ConflictRule> {
    CONFLICT_RULES
        .iter()
        .filter(|rule| rule_matches(assessment, rule))
        .collect()
}

/// Conflicts introduced by an answer to the given question: only rules
/// referencing that question are evaluated, so a resolution cannot
/// resurface unrelated pre-existing conflicts.
pub fn conflicts_for_question(
    assessment: &Assessment,
    domain: BusinessDomain,
    question_id: &str,
) -> Vec<&'static ConflictRule> {
    CONFLICT_RULES
        .iter()
        .filter(|rule| {
            (rule.left.domain == domain && rule.left.question == question_id)
                || (rule.right.domain == domain && rule.right.question == question_id)
        })
        .filter(|rule| rule_matches(assessment, rule))
        .collect()
}

/// Convert a matched rule into a gap record.
pub fn conflict_gap(assessment: &Assessment, rule: &ConflictRule) -> AssessmentGap {
    let severity = rule.severity;
    AssessmentGap::new(
        assessment.id,
        rule.left.domain,
        severity.category(),
        rule.description,
        severity.priority(),
    )
    .for_question(rule.left.question)
    .with_suggestions(vec![format!(
        "Which answer reflects your actual plan: '{}' ({}) or '{}' ({})?",
        rule.left.question, rule.left.domain, rule.right.question, rule.right.domain
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::assessment::QuestionResponse;
    use compass_core::domain::{IndustryProfile, IndustrySector, RegulatoryTier};

    fn assessment() -> Assessment {
        Assessment::new(
            "Acme",
            "founder@acme.test",
            IndustryProfile::new(IndustrySector::Retail, RegulatoryTier::NonRegulated),
        )
    }

    #[test]
    fn test_growth_budget_conflict_detected() {
        let mut a = assessment();
        a.record_response(
            BusinessDomain::RevenueEngine,
            QuestionResponse::text("growth-strategy", "Aggressive expansion into three regions"),
        );
        a.record_response(
            BusinessDomain::FinancialManagement,
            QuestionResponse::text("budget-constraints", "Budget is severely limited this year"),
        );

        let conflicts = detect_conflicts(&a);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "growth-vs-budget");
        assert_eq!(conflicts[0].severity, ConflictSeverity::Major);
    }

    #[test]
    fn test_one_sided_signal_is_not_a_conflict() {
        let mut a = assessment();
        a.record_response(
            BusinessDomain::RevenueEngine,
            QuestionResponse::text("growth-strategy", "Aggressive expansion"),
        );
        assert!(detect_conflicts(&a).is_empty());
    }

    #[test]
    fn test_intra_domain_conflict() {
        let mut a = assessment();
        a.record_response(
            BusinessDomain::TechnologyData,
            QuestionResponse::text("automation-roadmap", "We plan to automate fulfilment"),
        );
        a.record_response(
            BusinessDomain::TechnologyData,
            QuestionResponse::text("systems-inventory", "Everything runs on spreadsheets today"),
        );

        let conflicts = detect_conflicts(&a);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "automation-vs-manual");
    }

    #[test]
    fn test_conflicts_for_question_is_scoped() {
        let mut a = assessment();
        // Both the growth/budget and the automation conflicts are present.
        a.record_response(
            BusinessDomain::RevenueEngine,
            QuestionResponse::text("growth-strategy", "aggressive growth"),
        );
        a.record_response(
            BusinessDomain::FinancialManagement,
            QuestionResponse::text("budget-constraints", "severely limited"),
        );
        a.record_response(
            BusinessDomain::TechnologyData,
            QuestionResponse::text("automation-roadmap", "automation everywhere"),
        );
        a.record_response(
            BusinessDomain::TechnologyData,
            QuestionResponse::text("systems-inventory", "manual processes"),
        );

        let scoped = conflicts_for_question(&a, BusinessDomain::FinancialManagement, "budget-constraints");
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, "growth-vs-budget");
    }

    #[test]
    fn test_severity_maps_to_category() {
        assert_eq!(ConflictSeverity::Major.category(), GapCategory::Critical);
        assert_eq!(ConflictSeverity::Moderate.category(), GapCategory::Important);
        assert_eq!(ConflictSeverity::Minor.category(), GapCategory::NiceToHave);
    }

    #[test]
    fn test_conflict_gap_construction() {
        let mut a = assessment();
        a.record_response(
            BusinessDomain::MarketPosition,
            QuestionResponse::text("positioning", "premium brand"),
        );
        a.record_response(
            BusinessDomain::RevenueEngine,
            QuestionResponse::text("pricing-model", "we undercut everyone"),
        );

        let conflicts = detect_conflicts(&a);
        assert_eq!(conflicts.len(), 1);
        let gap = conflict_gap(&a, conflicts[0]);
        assert_eq!(gap.category, GapCategory::Important);
        assert_eq!(gap.priority, 5);
        assert_eq!(gap.domain, BusinessDomain::MarketPosition);
        assert!(!gap.suggested_questions.is_empty());
    }
}
