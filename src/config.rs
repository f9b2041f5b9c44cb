//! Pipeline configuration.
//!
//! Read once at startup from environment variables; read-only afterwards
//! and shared by every concurrent run. An empty backend list is the one
//! fatal condition: it aborts before any stage executes.

use std::env;

use crate::error::ConfigError;

/// Default OpenRouter-compatible endpoint, matching the original deployment.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Per-backend call timeout. The failover chain's worst case is
/// N_backends x this value.
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
/// Deadline for the chat quick-context fetch.
pub const DEFAULT_CONTEXT_TIMEOUT_SECS: u64 = 8;

/// One entry in the ordered failover list.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub label: String,
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl BackendConfig {
    pub fn new(label: &str, model: &str, api_key: &str) -> Self {
        Self {
            label: label.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Failover priority order: always try index 0 first.
    pub backends: Vec<BackendConfig>,
    pub conflict_threshold_secs: i64,
    pub home_location: String,
    pub context_timeout_secs: u64,
}

impl PipelineConfig {
    pub fn with_backends(backends: Vec<BackendConfig>) -> Self {
        Self {
            backends,
            conflict_threshold_secs: crate::conflict::DEFAULT_THRESHOLD_SECS,
            home_location: "Home".to_string(),
            context_timeout_secs: DEFAULT_CONTEXT_TIMEOUT_SECS,
        }
    }

    /// Build configuration from `DAYBRIEF_*` environment variables.
    ///
    /// `DAYBRIEF_PRIMARY_MODEL` and `DAYBRIEF_PRIMARY_API_KEY` are required;
    /// `DAYBRIEF_FALLBACK1_*` and `DAYBRIEF_FALLBACK2_*` add entries to the
    /// failover list when present. Validation happens in
    /// `PipelineEngine::new`, not here, so tests can construct partial
    /// configs directly.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut backends = Vec::new();

        for prefix in ["PRIMARY", "FALLBACK1", "FALLBACK2"] {
            if let Some(backend) = backend_from_env(prefix)? {
                backends.push(backend);
            }
        }

        let conflict_threshold_secs = parse_env_i64(
            "DAYBRIEF_CONFLICT_THRESHOLD_SECS",
            crate::conflict::DEFAULT_THRESHOLD_SECS,
        )?;

        Ok(Self {
            backends,
            conflict_threshold_secs,
            home_location: env::var("DAYBRIEF_HOME_LOCATION").unwrap_or_else(|_| "Home".into()),
            context_timeout_secs: parse_env_u64(
                "DAYBRIEF_CONTEXT_TIMEOUT_SECS",
                DEFAULT_CONTEXT_TIMEOUT_SECS,
            )?,
        })
    }
}

/// Read one backend's env triple. A prefix with a model but no key (or
/// vice versa) is a hard configuration error; an entirely absent prefix
/// just means no entry.
fn backend_from_env(prefix: &str) -> Result<Option<BackendConfig>, ConfigError> {
    let model = env::var(format!("DAYBRIEF_{}_MODEL", prefix)).ok();
    let api_key = env::var(format!("DAYBRIEF_{}_API_KEY", prefix)).ok();

    let label = prefix.to_lowercase();
    let (model, api_key) = match (model, api_key) {
        (None, None) => return Ok(None),
        (Some(m), Some(k)) => (m, k),
        (Some(_), None) => {
            return Err(ConfigError::IncompleteBackend {
                label,
                field: "api key",
            })
        }
        (None, Some(_)) => {
            return Err(ConfigError::IncompleteBackend {
                label,
                field: "model",
            })
        }
    };

    let mut backend = BackendConfig::new(&label, &model, &api_key);
    if let Ok(url) = env::var(format!("DAYBRIEF_{}_BASE_URL", prefix)) {
        backend.base_url = url;
    }
    if let Ok(t) = env::var(format!("DAYBRIEF_{}_TIMEOUT_SECS", prefix)) {
        backend.timeout_secs = t.parse().map_err(|_| ConfigError::InvalidValue {
            key: format!("DAYBRIEF_{}_TIMEOUT_SECS", prefix),
            value: t,
        })?;
    }
    Ok(Some(backend))
}

fn parse_env_i64(key: &str, default: i64) -> Result<i64, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// Unsigned variant for duration values; a negative env value is rejected
/// here rather than wrapping into a huge timeout at the cast.
fn parse_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}
