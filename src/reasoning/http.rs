//! OpenAI-compatible chat-completions backend over reqwest.
//!
//! All configured providers (OpenRouter, Groq, Gemini's OpenAI endpoint)
//! speak the same wire shape, so one HTTP backend covers the whole
//! failover list; only base URL, model, and key differ per entry.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::BackendConfig;
use crate::error::BackendError;

use super::{ChatMessage, ReasoningBackend, Role};

pub struct HttpBackend {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Map an HTTP error status onto the failover classification.
///
/// 402 (spend limit) is grouped with quota errors: from the caller's view
/// the provider is unusable right now but another one may not be.
fn classify_status(status: u16, body: &str) -> BackendError {
    let lowered = body.to_lowercase();
    match status {
        429 => BackendError::RateLimited,
        402 => BackendError::QuotaExceeded,
        401 | 403 => BackendError::Auth(truncate(body, 200)),
        400 => BackendError::MalformedRequest(truncate(body, 200)),
        s if s >= 500 => {
            if lowered.contains("overloaded") {
                BackendError::Overloaded
            } else {
                BackendError::Http {
                    status,
                    message: truncate(body, 200),
                }
            }
        }
        _ => BackendError::Http {
            status,
            message: truncate(body, 200),
        },
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s[..end].to_string()
    }
}

#[async_trait]
impl ReasoningBackend for HttpBackend {
    fn id(&self) -> &str {
        &self.config.label
    }

    fn timeout_secs(&self) -> u64 {
        self.config.timeout_secs
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let wire_messages: Vec<_> = messages
            .iter()
            .map(|m| json!({ "role": role_str(m.role), "content": m.content }))
            .collect();

        let body = json!({
            "model": self.config.model,
            "messages": wire_messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.config.timeout_secs)
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &text));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Transport(format!("decode: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_retryable() {
        assert!(matches!(
            classify_status(429, "rate limit"),
            BackendError::RateLimited
        ));
        assert!(matches!(
            classify_status(402, "spend limit reached"),
            BackendError::QuotaExceeded
        ));
        assert!(matches!(
            classify_status(503, "model overloaded"),
            BackendError::Overloaded
        ));
        assert!(classify_status(500, "internal").is_retryable());
    }

    #[test]
    fn test_classify_status_fatal() {
        assert!(matches!(
            classify_status(401, "bad key"),
            BackendError::Auth(_)
        ));
        assert!(matches!(
            classify_status(400, "missing model"),
            BackendError::MalformedRequest(_)
        ));
    }

    #[test]
    fn test_completion_response_decode() {
        let raw = r#"{
            "id": "gen-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "{\"summary\": \"ok\"}"}}
            ],
            "usage": {"total_tokens": 42}
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{\"summary\": \"ok\"}")
        );
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let s = "abc\u{00e9}def";
        let t = truncate(s, 4);
        assert!(t.len() <= 4);
        assert!(s.starts_with(&t));
    }
}
