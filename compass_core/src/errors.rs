//! Error types for the assessment engine

use thiserror::Error;

/// Main error type for assessment engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Entity lookup failed (assessment, gap, pause event)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request shape, missing field, or structural limit violation.
    /// Terminal for the request; never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A business rule rejected an otherwise well-formed request
    /// (extension caps, pause preconditions, expired windows).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// An external dependency (completion service, notifier) failed.
    /// Resolved locally via a fallback; rarely surfaced to callers.
    #[error("Dependency degraded: {0}")]
    Degraded(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// An optimistic precondition did not hold (e.g. an active pause
    /// already exists for the assessment).
    #[error("Precondition failed: {0}")]
    Conflict(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// The human-readable message without the variant prefix.
    ///
    /// Bulk operations report per-item failures with this message
    /// (e.g. "Gap not found", not "Not found: Gap not found").
    pub fn detail(&self) -> String {
        match self {
            Self::NotFound(m) | Self::Validation(m) | Self::BusinessRule(m) | Self::Degraded(m) => {
                m.clone()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_strips_prefix() {
        let err = EngineError::NotFound("Gap not found".to_string());
        assert_eq!(err.detail(), "Gap not found");
        assert_eq!(err.to_string(), "Not found: Gap not found");
    }

    #[test]
    fn test_store_error_converts() {
        let err: EngineError = StoreError::Conflict("active pause exists".to_string()).into();
        assert!(matches!(err, EngineError::Storage(StoreError::Conflict(_))));
    }
}
