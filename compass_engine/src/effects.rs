//! Best-effort side-effect accounting
//!
//! Persistence and notification calls on the happy path are best-effort:
//! their failure is recorded here and logged, never bubbled into the
//! primary outcome.

use serde::{Deserialize, Serialize};

/// What kind of side effect was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SideEffectKind {
    PersistAnalysis,
    PersistGaps,
    TimelinePause,
    TimelineResume,
    Notification,
}

/// Outcome of one best-effort side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideEffect {
    pub kind: SideEffectKind,
    pub ok: bool,
    pub detail: Option<String>,
}

impl SideEffect {
    pub fn succeeded(kind: SideEffectKind) -> Self {
        Self {
            kind,
            ok: true,
            detail: None,
        }
    }

    pub fn failed(kind: SideEffectKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            ok: false,
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_effect_constructors() {
        let ok = SideEffect::succeeded(SideEffectKind::PersistGaps);
        assert!(ok.ok);
        assert!(ok.detail.is_none());

        let failed = SideEffect::failed(SideEffectKind::Notification, "smtp down");
        assert!(!failed.ok);
        assert_eq!(failed.detail.as_deref(), Some("smtp down"));
    }
}
