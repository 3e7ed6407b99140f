//! Industry-specific compliance gap computation
//!
//! Compliance rules are gated on the assessment's sector: financial-services
//! rules never apply to healthcare assessments and vice versa. The level is
//! `full` when every mandatory field is answered, `missing` when the domain
//! is absent, `partial` otherwise.

use compass_core::assessment::Assessment;
use compass_core::domain::SectorComplianceRule;
use compass_core::gap::{AssessmentGap, ComplianceGap, ComplianceLevel, GapCategory};

fn compliance_level(assessment: &Assessment, rule: &SectorComplianceRule) -> ComplianceLevel {
    let Some(response) = assessment.domain_responses.get(&rule.domain) else {
        return ComplianceLevel::Missing;
    };
    if response.is_empty() {
        return ComplianceLevel::Missing;
    }

    let answered = rule
        .mandatory_fields
        .iter()
        .filter(|field| {
            response
                .response(field)
                .map(|r| !r.value.is_blank())
                .unwrap_or(false)
        })
        .count();

    if answered == rule.mandatory_fields.len() {
        ComplianceLevel::Full
    } else {
        ComplianceLevel::Partial
    }
}

/// Evaluate every compliance rule that applies to the assessment's sector.
///
/// Heavily-regulated financial-services assessments and all healthcare
/// assessments always receive their sector's finding, whatever the level.
pub fn compliance_gaps(assessment: &Assessment) -> Vec<ComplianceGap> {
    use compass_core::domain::IndustrySector;

    let sector = assessment.industry.sector;
    let applies = match sector {
        IndustrySector::FinancialServices => assessment.industry.is_heavily_regulated(),
        IndustrySector::Healthcare => true,
        _ => false,
    };
    if !applies {
        return Vec::new();
    }

    sector
        .compliance_rules()
        .iter()
        .map(|rule| {
            let level = compliance_level(assessment, rule);
            let description = match level {
                ComplianceLevel::Full => format!(
                    "{} requirements covered; all mandatory fields answered",
                    rule.requirement
                ),
                ComplianceLevel::Partial => format!(
                    "{} only partially evidenced; some mandatory fields unanswered",
                    rule.requirement
                ),
                ComplianceLevel::Missing => format!(
                    "{} cannot be assessed; the {} domain is absent",
                    rule.requirement, rule.domain
                ),
            };
            ComplianceGap {
                sector,
                domain: rule.domain,
                requirement: rule.requirement.to_string(),
                level,
                description,
            }
        })
        .collect()
}

/// Convert non-full compliance findings into addressable gap records.
pub fn compliance_assessment_gaps(
    assessment: &Assessment,
    findings: &[ComplianceGap],
) -> Vec<AssessmentGap> {
    findings
        .iter()
        .filter(|finding| finding.level != ComplianceLevel::Full)
        .map(|finding| {
            let (category, priority) = match finding.level {
                ComplianceLevel::Missing => (GapCategory::Critical, 9),
                _ => (GapCategory::Important, 7),
            };
            AssessmentGap::new(
                assessment.id,
                finding.domain,
                category,
                finding.description.clone(),
                priority,
            )
            .with_suggestions(
                assessment
                    .industry
                    .sector
                    .compliance_rules()
                    .iter()
                    .filter(|rule| rule.requirement == finding.requirement)
                    .flat_map(|rule| rule.mandatory_fields.iter())
                    .map(|field| format!("Provide an answer for '{field}'"))
                    .collect(),
            )
        })
        .collect()
}
