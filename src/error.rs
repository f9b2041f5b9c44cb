//! Error types for pipeline execution
//!
//! Errors are classified by recoverability:
//! - Retryable: rate limits, overload, timeouts, 5xx. The failover chain
//!   moves to the next backend.
//! - Non-retryable: auth failures, malformed requests. The chain aborts.
//! - Fatal: configuration errors, raised before any stage runs. This is the
//!   only class that ever reaches the pipeline caller; everything else is
//!   absorbed into a degraded stage result.

use thiserror::Error;

/// Fatal startup errors. Raised by `PipelineEngine::new` before any stage
/// executes; never produced mid-run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No reasoning backends configured")]
    NoBackends,

    #[error("Backend '{label}' is missing {field}")]
    IncompleteBackend { label: String, field: &'static str },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// A single reasoning backend call's failure.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    // Retryable: failover moves to the next backend
    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("Quota or spend limit reached")]
    QuotaExceeded,

    #[error("Service overloaded")]
    Overloaded,

    #[error("Call timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    // Non-retryable: abort the whole failover chain
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Backend returned an empty response")]
    EmptyResponse,
}

impl BackendError {
    /// True when the next backend in the failover list should be tried.
    ///
    /// Status-code mapping follows the original provider behavior: 429 and
    /// 402 (spend limit) are transient from the caller's perspective, as is
    /// anything 5xx. Auth and request-shape errors indicate systemic
    /// misconfiguration; burning the remaining backends would only add
    /// latency to the same failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::RateLimited
            | BackendError::QuotaExceeded
            | BackendError::Overloaded
            | BackendError::Timeout(_)
            | BackendError::Transport(_) => true,
            BackendError::Http { status, .. } => {
                *status == 429 || *status == 402 || *status >= 500
            }
            BackendError::Auth(_)
            | BackendError::MalformedRequest(_)
            | BackendError::EmptyResponse => false,
        }
    }
}

/// Terminal outcome of a full failover chain.
#[derive(Debug, Clone, Error)]
pub enum ReasoningError {
    /// Every configured backend was tried; carries the last error seen.
    #[error("All {attempts} backends failed. Last error: {last}")]
    Exhausted { attempts: usize, last: BackendError },

    /// A non-retryable error aborted the chain early.
    #[error("Backend call aborted: {0}")]
    Fatal(BackendError),
}

/// Data-source adapter failure. "Not linked" and "unreachable" degrade
/// identically at the stage level; the distinction only changes the
/// warning text.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("{service} is not connected")]
    NotAuthenticated { service: &'static str },

    #[error("{service} unreachable: {detail}")]
    Unreachable { service: &'static str, detail: String },
}

impl SourceError {
    pub fn service(&self) -> &'static str {
        match self {
            SourceError::NotAuthenticated { service } => service,
            SourceError::Unreachable { service, .. } => service,
        }
    }
}

/// A time string that matched none of the accepted formats.
///
/// Localized to conflict detection and time-dependent stages; recorded as a
/// stage warning, never a pipeline abort.
#[derive(Debug, Clone, Error)]
#[error("Unsupported time format: '{input}' (tried {})", formats.join(", "))]
pub struct TimeParseError {
    pub input: String,
    pub formats: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(BackendError::RateLimited.is_retryable());
        assert!(BackendError::Overloaded.is_retryable());
        assert!(BackendError::Timeout(45).is_retryable());
        assert!(BackendError::QuotaExceeded.is_retryable());
        assert!(BackendError::Transport("connection reset".into()).is_retryable());
    }

    #[test]
    fn test_non_retryable_classification() {
        assert!(!BackendError::Auth("bad key".into()).is_retryable());
        assert!(!BackendError::MalformedRequest("missing model".into()).is_retryable());
        assert!(!BackendError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_http_status_classification() {
        let retryable = [429, 402, 500, 502, 503];
        for status in retryable {
            let err = BackendError::Http {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "status {} should be retryable", status);
        }

        let fatal = [400, 401, 403, 404];
        for status in fatal {
            let err = BackendError::Http {
                status,
                message: String::new(),
            };
            assert!(!err.is_retryable(), "status {} should abort", status);
        }
    }

    #[test]
    fn test_time_parse_error_names_input() {
        let err = TimeParseError {
            input: "half past ten".into(),
            formats: vec!["%H:%M", "%I:%M %p"],
        };
        let msg = err.to_string();
        assert!(msg.contains("half past ten"));
        assert!(msg.contains("%I:%M %p"));
    }
}
