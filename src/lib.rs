//! daybrief: daily schedule analysis pipeline.
//!
//! A fixed-order sequence of analysis stages runs over a shared
//! `ScheduleState`, each stage reading the slots written before it and
//! writing exactly one result slot. Reasoning calls fail over across an
//! ordered backend list; every stage degrades to a deterministic result
//! when reasoning or a data source is unavailable, so a run always
//! completes with a full state.

pub mod chat;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod reasoning;
pub mod sources;
pub mod stages;
pub mod timeparse;
pub mod types;

pub use chat::{ChatReply, ChatSession};
pub use config::{BackendConfig, PipelineConfig};
pub use conflict::ConflictDetector;
pub use engine::PipelineEngine;
pub use error::{BackendError, ConfigError, ReasoningError, SourceError};
pub use reasoning::{ChatMessage, ReasoningClient};
pub use sources::{DataSourceAdapter, UnlinkedSource};
pub use types::{Meeting, Mode, ScheduleState, TaskItem};
