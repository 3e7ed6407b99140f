//! Compass core
//!
//! Shared foundation for the business-assessment platform:
//! - Domain and industry taxonomy (twelve fixed business domains)
//! - The assessment aggregate, gap records, and timeline records
//! - Engine configuration with every tuned constant named
//! - Storage, completion, and notification seams

// Module declarations
pub mod assessment;
pub mod completion;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gap;
pub mod notify;
pub mod store;
pub mod timeline;

// Re-export main types
pub use assessment::{
    Assessment, AssessmentId, AssessmentStatus, ClarificationPolicy, DeliverySchedule,
    DomainResponse, Milestones, QuestionResponse, ResponseValue,
};

pub use domain::{
    BusinessDomain, DomainGroup, IndustryProfile, IndustrySector, RegulatoryTier,
    SectorComplianceRule, DEFAULT_CRITICAL_DOMAINS,
};

pub use gap::{
    AssessmentGap, ComplianceGap, ComplianceLevel, DomainCompletenessAnalysis, GapAnalysis,
    GapCategory, GapId, ResolutionMethod,
};

pub use timeline::{
    ExtensionId, ExtensionType, PauseEventId, PauseReason, TimelineExtension, TimelinePauseEvent,
    TimelineStatus,
};

pub use config::{AnalysisRules, EngineConfig, RetryConfig, TimelineRules, TriageThresholds};

pub use errors::{EngineError, Result, StoreError};

pub use store::{AssessmentStore, InMemoryStore};

pub use completion::{complete_with_retry, CompletionClient, CompletionOptions, StaticCompletion};

pub use notify::{NoopNotifier, NotificationResult, Notifier};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the core library
pub fn init() {
    tracing::info!("Compass Core v{}", VERSION);
}
