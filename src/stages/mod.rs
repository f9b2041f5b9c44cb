//! Pipeline stage contracts.
//!
//! A stage turns "call an unreliable external dependency and produce a
//! typed result" into a total operation: it always returns, always writes
//! a valid value to its result slot, and records any failure cause in the
//! result's warnings instead of propagating it. The engine above has no
//! retry or skip logic; all resilience lives here and in the reasoning
//! failover client.
//!
//! Reasoning-backed stages share one shape:
//! 1. Serialize the relevant state slice deterministically.
//! 2. Invoke the failover client with a stage prompt + required schema.
//! 3. Accept a schema-conforming reply, filling defaults for missing
//!    optional fields; otherwise build a degraded result from local data.
//! An empty input short-circuits everything and writes the canonical empty
//! result without touching any external dependency.

pub mod calendar;
pub mod conflicts;
pub mod contacts;
pub mod coordinator;
pub mod email;
pub mod notes;
pub mod planning;
pub mod prompts;
pub mod sheets;
pub mod tasks;
pub mod travel;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::conflict::ConflictDetector;
use crate::error::ReasoningError;
use crate::reasoning::ReasoningClient;
use crate::sources::DataSourceAdapter;
use crate::types::ScheduleState;

/// Shared read-only dependencies handed to every stage.
pub struct StageContext {
    pub client: ReasoningClient,
    pub source: Arc<dyn DataSourceAdapter>,
    pub detector: ConflictDetector,
    pub home_location: String,
}

/// One unit of the pipeline: reads state, calls a dependency, writes
/// exactly one result slot. Infallible by contract.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext);
}

// ============================================================================
// Reply field extraction
// ============================================================================

/// String field from a model reply, if present and non-empty.
pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// String-array field; tolerates scalar entries by stringifying them.
pub(crate) fn list_field(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Count field with a stage-defined default (e.g. the input length).
pub(crate) fn count_field(value: &Value, key: &str, default: usize) -> usize {
    value
        .get(key)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(default)
}

/// Uniform warning text for a failed reasoning chain.
pub(crate) fn reasoning_warning(err: &ReasoningError) -> String {
    format!("Reasoning unavailable: {}", err)
}
