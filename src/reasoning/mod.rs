//! Reasoning backend abstraction with ordered failover.
//!
//! A `ReasoningClient` wraps an ordered list of backends (primary,
//! secondary, ...). Every call starts at the head of the list; a retryable
//! failure moves to the NEXT backend after a short fixed backoff rather
//! than retrying the same one, which bounds worst-case latency to
//! N_backends x timeout. A non-retryable failure (auth, malformed request)
//! aborts the chain immediately: it indicates misconfiguration, not
//! transient unavailability.

pub mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, ReasoningError};

pub use http::HttpBackend;

/// Backoff slept between failover attempts.
const FAILOVER_BACKOFF: Duration = Duration::from_millis(500);

/// Message roles in a reasoning conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One configured reasoning endpoint in the failover list.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Stable label for observability ("groq-primary", "gemini-fallback").
    fn id(&self) -> &str;

    /// Per-call timeout applied by the client.
    fn timeout_secs(&self) -> u64;

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, BackendError>;
}

/// Successful reasoning call: the raw reply plus which backend served it.
#[derive(Debug, Clone)]
pub struct ReasoningReply {
    pub content: String,
    pub backend: String,
}

/// Ordered-failover reasoning client. Cheap to clone; backends are shared.
#[derive(Clone)]
pub struct ReasoningClient {
    backends: Vec<Arc<dyn ReasoningBackend>>,
}

impl ReasoningClient {
    /// Callers must guarantee a non-empty list; `PipelineEngine::new`
    /// rejects empty configuration before a client is ever built.
    pub fn new(backends: Vec<Arc<dyn ReasoningBackend>>) -> Self {
        Self { backends }
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Invoke the failover chain with the full message list.
    ///
    /// The chain has no umbrella timeout beyond the sum of per-backend
    /// timeouts; callers needing a hard deadline race this future against
    /// their own timer and treat expiry as terminal failure.
    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<ReasoningReply, ReasoningError> {
        let total = self.backends.len();
        let mut last_error = BackendError::EmptyResponse;

        for (idx, backend) in self.backends.iter().enumerate() {
            log::debug!(
                "reasoning attempt {}/{} using {}",
                idx + 1,
                total,
                backend.id()
            );

            let bounded = tokio::time::timeout(
                Duration::from_secs(backend.timeout_secs()),
                backend.invoke(messages),
            );

            let outcome = match bounded.await {
                Ok(result) => result,
                // A call that never returns within its bound is transient.
                Err(_) => Err(BackendError::Timeout(backend.timeout_secs())),
            };

            match outcome {
                Ok(content) if content.trim().is_empty() => {
                    return Err(ReasoningError::Fatal(BackendError::EmptyResponse));
                }
                Ok(content) => {
                    return Ok(ReasoningReply {
                        content,
                        backend: backend.id().to_string(),
                    });
                }
                Err(err) if err.is_retryable() => {
                    log::warn!(
                        "reasoning backend {} failed ({}), {}",
                        backend.id(),
                        err,
                        if idx + 1 < total {
                            "trying next backend"
                        } else {
                            "no backends left"
                        }
                    );
                    last_error = err;
                    if idx + 1 < total {
                        tokio::time::sleep(FAILOVER_BACKOFF).await;
                    }
                }
                Err(err) => {
                    log::error!("reasoning backend {} aborted chain: {}", backend.id(), err);
                    return Err(ReasoningError::Fatal(err));
                }
            }
        }

        Err(ReasoningError::Exhausted {
            attempts: total,
            last: last_error,
        })
    }
}

/// Pull a JSON object out of a raw model reply.
///
/// Models asked for "ONLY JSON" still wrap replies in markdown fences or
/// prose often enough that parsing the raw string directly is unreliable.
/// Try the whole string first, then the span from the first '{' to the
/// last '}'.
pub fn extract_json(raw: &str) -> Option<serde_json::Value> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end])
        .ok()
        .filter(|v: &serde_json::Value| v.is_object())
}

// ============================================================================
// Test support
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Scripted backend for tests: returns canned outcomes in order and
    /// counts invocations.
    pub struct ScriptedBackend {
        id: String,
        outcomes: Vec<Result<String, BackendError>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        pub fn ok(id: &str, reply: &str) -> Self {
            Self::new(id, vec![Ok(reply.to_string())])
        }

        pub fn failing(id: &str, err: BackendError) -> Self {
            Self::new(id, vec![Err(err)])
        }

        pub fn new(id: &str, outcomes: Vec<Result<String, BackendError>>) -> Self {
            Self {
                id: id.to_string(),
                outcomes,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        fn id(&self) -> &str {
            &self.id
        }

        fn timeout_secs(&self) -> u64 {
            5
        }

        async fn invoke(&self, _messages: &[ChatMessage]) -> Result<String, BackendError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .get(n.min(self.outcomes.len().saturating_sub(1)))
                .cloned()
                .unwrap_or(Err(BackendError::EmptyResponse))
        }
    }
}
