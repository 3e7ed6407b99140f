//! Outbound notification seam
//!
//! Notifications are fire-and-forget from the engine's perspective: the
//! trait returns outcome data instead of an error, and callers log failed
//! sends without letting them fail the owning operation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of a notification send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Outbound notification delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> NotificationResult;
}

/// Notifier that records nothing and always reports success.
#[derive(Clone, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(
        &self,
        _to: &str,
        _subject: &str,
        _html_body: &str,
        _text_body: &str,
    ) -> NotificationResult {
        NotificationResult::delivered("noop")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_notifier_always_succeeds() {
        let result = NoopNotifier.send("a@b.c", "subject", "<p>x</p>", "x").await;
        assert!(result.success);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failure_carries_error() {
        let result = NotificationResult::failed("smtp timeout");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("smtp timeout"));
    }
}
