//! Text-completion service seam
//!
//! The engine consumes a single-shot `completion(prompt, options) -> text`
//! contract. Callers must tolerate malformed output by falling back to
//! static content; this module only handles transport-level retries.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::errors::{EngineError, Result};

/// Options forwarded to the completion provider.
#[derive(Clone, Debug)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// Single-shot text completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;
}

/// Execute a completion with exponential backoff retry logic.
///
/// Exhausted retries surface the last error; callers degrade to static
/// content rather than propagating it further.
pub async fn complete_with_retry(
    client: &dyn CompletionClient,
    prompt: &str,
    options: &CompletionOptions,
    retry: &RetryConfig,
) -> Result<String> {
    let mut last_error = None;
    let mut delay = retry.initial_delay;

    for attempt in 0..retry.max_retries.max(1) {
        match client.complete(prompt, options).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                last_error = Some(e);

                if attempt + 1 < retry.max_retries {
                    let sleep_for = if retry.jitter {
                        let quarter = (delay.as_millis() as u64 / 4).max(1);
                        delay + Duration::from_millis(rand::thread_rng().gen_range(0..quarter))
                    } else {
                        delay
                    };
                    tracing::warn!(
                        "Completion call failed (attempt {}/{}), retrying in {:?}",
                        attempt + 1,
                        retry.max_retries,
                        sleep_for
                    );
                    tokio::time::sleep(sleep_for).await;
                    delay = delay.mul_f64(retry.backoff_factor).min(retry.max_delay);
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| EngineError::Degraded("completion produced no result".to_string())))
}

/// Canned-response client for tests and offline runs.
#[derive(Clone, Debug, Default)]
pub struct StaticCompletion {
    response: String,
}

impl StaticCompletion {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for StaticCompletion {
    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String> {
        Ok(self.response.clone())
    }
}
