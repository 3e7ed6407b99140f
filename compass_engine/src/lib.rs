//! Compass engine
//!
//! The assessment completeness and gap engine:
//! - Scoring primitives: pure completeness and answer-quality math
//! - Gap detector: missing, shallow, conflicting, and compliance gaps
//! - Gap lifecycle: single and bulk resolution with impact recalculation
//! - Triage validator: invariant checks over AI triage output with four
//!   deterministic fallback strategies
//! - Timeline state machine: pause for gaps, resume on resolution, bounded
//!   extensions, derived status

// Module declarations
pub mod detector;
pub mod effects;
pub mod lifecycle;
pub mod scoring;
pub mod service;
pub mod timeline;
pub mod triage;

// Re-export main types
pub use detector::{
    recommendations_for, AnalysisDepth, AnalysisOptions, AnalysisOutcome, GapDetector,
};

pub use detector::conflicts::{
    conflict_gap, conflicts_for_question, detect_conflicts, ConflictRule, ConflictSeverity,
    ConflictSignal, CONFLICT_RULES,
};

pub use detector::compliance::{compliance_assessment_gaps, compliance_gaps};

pub use detector::followups::STATIC_FOLLOW_UPS;

pub use effects::{SideEffect, SideEffectKind};

pub use lifecycle::{
    BulkResolutionItem, BulkResolutionReport, FailedResolution, GapLifecycleManager,
    GapResolutionOutcome, GapResolutionRequest,
};

pub use scoring::{
    domain_completeness, is_shallow, lacks_depth, overall_completeness, quality_multiplier,
    resolution_impact, DEPTH_INDICATORS,
};

pub use service::{AssessmentEngine, HealthStatus};

pub use timeline::TimelineManager;

pub use triage::{
    DomainScore, DomainSeverity, FallbackStrategy, PriorityLabel, TriageAnalysis,
    TriageValidationError, TriageValidationOutcome, TriageValidator,
};

/// Version of the engine crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the engine library
pub fn init() {
    tracing::info!("Compass Engine v{}", VERSION);
}
