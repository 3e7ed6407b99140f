//! Business domain and industry taxonomy
//!
//! The twelve assessed business domains, their groupings and weights, the
//! per-domain critical-question tables, and the industry/regulatory rule
//! tables. Everything here is an exhaustive enum match: an unknown sector or
//! domain is a compile-time error, never a silently empty lookup.

use serde::{Deserialize, Serialize};

/// One of the twelve business functional areas covered by an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusinessDomain {
    StrategicAlignment,
    MarketPosition,
    ProductInnovation,
    OperationalExcellence,
    FinancialManagement,
    TechnologyData,
    SupplyChain,
    RevenueEngine,
    PeopleCulture,
    LeadershipGovernance,
    CustomerExperience,
    RiskCompliance,
}

/// Functional grouping used by triage coverage checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainGroup {
    Strategy,
    Operations,
    People,
    Governance,
}

impl BusinessDomain {
    /// All domains, in canonical assessment order.
    pub const ALL: [BusinessDomain; 12] = [
        Self::StrategicAlignment,
        Self::MarketPosition,
        Self::ProductInnovation,
        Self::OperationalExcellence,
        Self::FinancialManagement,
        Self::TechnologyData,
        Self::SupplyChain,
        Self::RevenueEngine,
        Self::PeopleCulture,
        Self::LeadershipGovernance,
        Self::CustomerExperience,
        Self::RiskCompliance,
    ];

    /// Kebab-case identifier used on the wire and in stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrategicAlignment => "strategic-alignment",
            Self::MarketPosition => "market-position",
            Self::ProductInnovation => "product-innovation",
            Self::OperationalExcellence => "operational-excellence",
            Self::FinancialManagement => "financial-management",
            Self::TechnologyData => "technology-data",
            Self::SupplyChain => "supply-chain",
            Self::RevenueEngine => "revenue-engine",
            Self::PeopleCulture => "people-culture",
            Self::LeadershipGovernance => "leadership-governance",
            Self::CustomerExperience => "customer-experience",
            Self::RiskCompliance => "risk-compliance",
        }
    }

    /// Weight of this domain in the overall completeness average.
    ///
    /// Risk and compliance weigh highest; brand-adjacent domains lowest.
    pub fn weight(&self) -> f64 {
        match self {
            Self::RiskCompliance => 1.5,
            Self::FinancialManagement => 1.3,
            Self::StrategicAlignment => 1.2,
            Self::RevenueEngine => 1.1,
            Self::OperationalExcellence => 1.0,
            Self::ProductInnovation => 1.0,
            Self::TechnologyData => 1.0,
            Self::PeopleCulture => 1.0,
            Self::LeadershipGovernance => 1.0,
            Self::CustomerExperience => 0.9,
            Self::SupplyChain => 0.9,
            Self::MarketPosition => 0.8,
        }
    }

    /// Functional group this domain belongs to.
    pub fn group(&self) -> DomainGroup {
        match self {
            Self::StrategicAlignment | Self::MarketPosition | Self::ProductInnovation => {
                DomainGroup::Strategy
            }
            Self::OperationalExcellence
            | Self::FinancialManagement
            | Self::TechnologyData
            | Self::SupplyChain
            | Self::RevenueEngine => DomainGroup::Operations,
            Self::PeopleCulture | Self::LeadershipGovernance | Self::CustomerExperience => {
                DomainGroup::People
            }
            Self::RiskCompliance => DomainGroup::Governance,
        }
    }

    /// Question identifiers that must be answered for the domain to count
    /// as minimally complete. Fixed per domain.
    pub fn critical_questions(&self) -> &'static [&'static str] {
        match self {
            Self::StrategicAlignment => {
                &["vision-statement", "three-year-objectives", "competitive-advantage"]
            }
            Self::MarketPosition => &["target-market", "positioning"],
            Self::ProductInnovation => &["product-roadmap", "differentiation"],
            Self::OperationalExcellence => {
                &["core-processes", "delivery-commitments", "bottlenecks"]
            }
            Self::FinancialManagement => {
                &["revenue-model", "budget-constraints", "cash-runway"]
            }
            Self::TechnologyData => &["systems-inventory", "automation-roadmap"],
            Self::SupplyChain => &["key-suppliers", "supplier-lead-times"],
            Self::RevenueEngine => &["growth-strategy", "pricing-model", "sales-pipeline"],
            Self::PeopleCulture => &["org-structure", "hiring-plan", "retention-risks"],
            Self::LeadershipGovernance => &["decision-making", "succession-plan"],
            Self::CustomerExperience => &["customer-feedback", "service-standards"],
            Self::RiskCompliance => {
                &["regulatory-obligations", "compliance-confidence", "known-issues"]
            }
        }
    }
}

impl std::fmt::Display for BusinessDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BusinessDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("Unknown business domain: {s}"))
    }
}

/// The fixed triad used by the default-domain triage fallback.
pub const DEFAULT_CRITICAL_DOMAINS: [BusinessDomain; 3] = [
    BusinessDomain::StrategicAlignment,
    BusinessDomain::FinancialManagement,
    BusinessDomain::OperationalExcellence,
];

/// Industry sector of the assessed company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndustrySector {
    FinancialServices,
    Healthcare,
    Technology,
    Retail,
    Manufacturing,
    ProfessionalServices,
    Hospitality,
    Construction,
    Other,
}

/// Regulatory burden of the sector as classified at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegulatoryTier {
    NonRegulated,
    LightlyRegulated,
    HeavilyRegulated,
}

/// Sector plus regulatory tier, carried by every assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub sector: IndustrySector,
    pub tier: RegulatoryTier,
}

impl IndustryProfile {
    pub fn new(sector: IndustrySector, tier: RegulatoryTier) -> Self {
        Self { sector, tier }
    }

    pub fn is_heavily_regulated(&self) -> bool {
        self.tier == RegulatoryTier::HeavilyRegulated
    }
}

/// A sector-specific compliance requirement with its mandatory fields.
#[derive(Debug, Clone, Copy)]
pub struct SectorComplianceRule {
    /// Human-readable requirement name
    pub requirement: &'static str,
    /// Domain the mandatory fields live in
    pub domain: BusinessDomain,
    /// Question identifiers that must all be answered for full compliance
    pub mandatory_fields: &'static [&'static str],
}

impl IndustrySector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinancialServices => "financial-services",
            Self::Healthcare => "healthcare",
            Self::Technology => "technology",
            Self::Retail => "retail",
            Self::Manufacturing => "manufacturing",
            Self::ProfessionalServices => "professional-services",
            Self::Hospitality => "hospitality",
            Self::Construction => "construction",
            Self::Other => "other",
        }
    }

    /// Domains a triage selection for this sector must include.
    pub fn required_domains(&self) -> &'static [BusinessDomain] {
        match self {
            Self::FinancialServices => {
                &[BusinessDomain::RiskCompliance, BusinessDomain::FinancialManagement]
            }
            Self::Healthcare => &[BusinessDomain::RiskCompliance, BusinessDomain::PeopleCulture],
            Self::Technology => {
                &[BusinessDomain::TechnologyData, BusinessDomain::ProductInnovation]
            }
            Self::Retail => &[BusinessDomain::CustomerExperience, BusinessDomain::SupplyChain],
            Self::Manufacturing => {
                &[BusinessDomain::OperationalExcellence, BusinessDomain::SupplyChain]
            }
            Self::ProfessionalServices => {
                &[BusinessDomain::PeopleCulture, BusinessDomain::CustomerExperience]
            }
            Self::Hospitality => {
                &[BusinessDomain::CustomerExperience, BusinessDomain::OperationalExcellence]
            }
            Self::Construction => {
                &[BusinessDomain::OperationalExcellence, BusinessDomain::RiskCompliance]
            }
            Self::Other => &[],
        }
    }

    /// Fixed sector-to-domain mapping used by the industry triage fallback.
    pub fn fallback_domains(&self) -> &'static [BusinessDomain] {
        match self {
            Self::FinancialServices => &[
                BusinessDomain::RiskCompliance,
                BusinessDomain::FinancialManagement,
                BusinessDomain::StrategicAlignment,
                BusinessDomain::OperationalExcellence,
                BusinessDomain::TechnologyData,
            ],
            Self::Healthcare => &[
                BusinessDomain::RiskCompliance,
                BusinessDomain::PeopleCulture,
                BusinessDomain::OperationalExcellence,
                BusinessDomain::TechnologyData,
                BusinessDomain::FinancialManagement,
            ],
            Self::Technology => &[
                BusinessDomain::ProductInnovation,
                BusinessDomain::TechnologyData,
                BusinessDomain::RevenueEngine,
                BusinessDomain::StrategicAlignment,
                BusinessDomain::PeopleCulture,
            ],
            Self::Retail => &[
                BusinessDomain::CustomerExperience,
                BusinessDomain::SupplyChain,
                BusinessDomain::RevenueEngine,
                BusinessDomain::FinancialManagement,
                BusinessDomain::MarketPosition,
            ],
            Self::Manufacturing => &[
                BusinessDomain::OperationalExcellence,
                BusinessDomain::SupplyChain,
                BusinessDomain::FinancialManagement,
                BusinessDomain::TechnologyData,
                BusinessDomain::RiskCompliance,
            ],
            Self::ProfessionalServices => &[
                BusinessDomain::PeopleCulture,
                BusinessDomain::CustomerExperience,
                BusinessDomain::RevenueEngine,
                BusinessDomain::StrategicAlignment,
                BusinessDomain::FinancialManagement,
            ],
            Self::Hospitality => &[
                BusinessDomain::CustomerExperience,
                BusinessDomain::OperationalExcellence,
                BusinessDomain::PeopleCulture,
                BusinessDomain::RevenueEngine,
                BusinessDomain::FinancialManagement,
            ],
            Self::Construction => &[
                BusinessDomain::OperationalExcellence,
                BusinessDomain::RiskCompliance,
                BusinessDomain::SupplyChain,
                BusinessDomain::FinancialManagement,
                BusinessDomain::PeopleCulture,
            ],
            Self::Other => &[
                BusinessDomain::StrategicAlignment,
                BusinessDomain::FinancialManagement,
                BusinessDomain::OperationalExcellence,
                BusinessDomain::RevenueEngine,
                BusinessDomain::PeopleCulture,
            ],
        }
    }

    /// Compliance rules evaluated for this sector. Financial-services rules
    /// never apply to other sectors, and vice versa.
    pub fn compliance_rules(&self) -> &'static [SectorComplianceRule] {
        match self {
            Self::FinancialServices => &[SectorComplianceRule {
                requirement: "FCA regulatory readiness",
                domain: BusinessDomain::RiskCompliance,
                mandatory_fields: &[
                    "regulatory-obligations",
                    "aml-controls",
                    "client-money-handling",
                ],
            }],
            Self::Healthcare => &[SectorComplianceRule {
                requirement: "HIPAA/GDPR data protection",
                domain: BusinessDomain::RiskCompliance,
                mandatory_fields: &[
                    "patient-data-protection",
                    "gdpr-lawful-basis",
                    "clinical-governance",
                ],
            }],
            Self::Technology
            | Self::Retail
            | Self::Manufacturing
            | Self::ProfessionalServices
            | Self::Hospitality
            | Self::Construction
            | Self::Other => &[],
        }
    }
}

impl std::fmt::Display for IndustrySector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_domains() {
        assert_eq!(BusinessDomain::ALL.len(), 12);
    }

    #[test]
    fn test_risk_compliance_weighs_highest() {
        let max = BusinessDomain::ALL
            .iter()
            .map(|d| d.weight())
            .fold(f64::MIN, f64::max);
        assert_eq!(BusinessDomain::RiskCompliance.weight(), max);
    }

    #[test]
    fn test_every_domain_has_critical_questions() {
        for domain in BusinessDomain::ALL {
            assert!(
                !domain.critical_questions().is_empty(),
                "{domain} has no critical questions"
            );
        }
    }

    #[test]
    fn test_round_trip_parse() {
        for domain in BusinessDomain::ALL {
            let parsed: BusinessDomain = domain.as_str().parse().unwrap();
            assert_eq!(parsed, domain);
        }
        assert!("not-a-domain".parse::<BusinessDomain>().is_err());
    }

    #[test]
    fn test_default_triad_covers_core_groups() {
        let groups: Vec<_> = DEFAULT_CRITICAL_DOMAINS.iter().map(|d| d.group()).collect();
        assert!(groups.contains(&DomainGroup::Strategy));
        assert!(groups.contains(&DomainGroup::Operations));
    }

    #[test]
    fn test_fallback_domains_are_five_per_sector() {
        for sector in [
            IndustrySector::FinancialServices,
            IndustrySector::Healthcare,
            IndustrySector::Technology,
            IndustrySector::Retail,
            IndustrySector::Manufacturing,
            IndustrySector::ProfessionalServices,
            IndustrySector::Hospitality,
            IndustrySector::Construction,
            IndustrySector::Other,
        ] {
            assert_eq!(sector.fallback_domains().len(), 5, "{sector}");
        }
    }

    #[test]
    fn test_compliance_rules_are_sector_gated() {
        assert!(!IndustrySector::FinancialServices.compliance_rules().is_empty());
        assert!(!IndustrySector::Healthcare.compliance_rules().is_empty());
        assert!(IndustrySector::Retail.compliance_rules().is_empty());
        assert!(IndustrySector::Other.compliance_rules().is_empty());
    }
}
