//! Pipeline engine: a pure sequencer.
//!
//! Executes a fixed, mode-dependent list of stages against one
//! `ScheduleState`, strictly in order: every stage after the first reads
//! fields its predecessor wrote. The engine carries no retry, skip, or
//! branching logic; each stage guarantees it writes some valid value and
//! returns. The single abort path is invalid configuration, rejected at
//! construction before any stage can run.

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::conflict::ConflictDetector;
use crate::error::ConfigError;
use crate::reasoning::{HttpBackend, ReasoningBackend, ReasoningClient};
use crate::sources::{DataSourceAdapter, UnlinkedSource};
use crate::stages::{
    calendar::CalendarStage, conflicts::ConflictStage, contacts::ContactsStage,
    coordinator::CoordinatorStage, email::EmailStage, notes::NotesStage, planning::PlanningStage,
    sheets::SheetsStage, tasks::TaskStage, travel::TravelStage, Stage, StageContext,
};
use crate::types::{Meeting, Mode, ScheduleState, TaskItem};

pub struct PipelineEngine {
    ctx: StageContext,
}

impl PipelineEngine {
    /// Validates configuration; `ConfigError` here is the only error a
    /// caller ever sees from the pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        let source: Arc<dyn DataSourceAdapter> = Arc::new(UnlinkedSource);
        Self::with_source(config, source)
    }

    /// Same, with a caller-supplied data source for Live mode.
    pub fn with_source(
        config: PipelineConfig,
        source: Arc<dyn DataSourceAdapter>,
    ) -> Result<Self, ConfigError> {
        if config.backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let backends: Vec<Arc<dyn ReasoningBackend>> = config
            .backends
            .iter()
            .map(|b| Arc::new(HttpBackend::new(b.clone())) as Arc<dyn ReasoningBackend>)
            .collect();

        Ok(Self {
            ctx: StageContext {
                client: ReasoningClient::new(backends),
                source,
                detector: ConflictDetector::new(config.conflict_threshold_secs),
                home_location: config.home_location,
            },
        })
    }

    /// Test/embedding constructor with pre-built dependencies.
    pub fn from_parts(ctx: StageContext) -> Self {
        Self { ctx }
    }

    /// Manual mode: caller supplies the schedule.
    pub async fn run_manual(
        &self,
        meetings: Vec<Meeting>,
        tasks: Vec<TaskItem>,
    ) -> ScheduleState {
        self.run(ScheduleState::manual(meetings, tasks)).await
    }

    /// Live mode: fetch stages populate the schedule from linked services.
    pub async fn run_live(&self) -> ScheduleState {
        self.run(ScheduleState::live()).await
    }

    async fn run(&self, mut state: ScheduleState) -> ScheduleState {
        let stages = stage_list(state.mode);
        log::info!(
            "pipeline start: mode={:?}, {} stages, {} backends",
            state.mode,
            stages.len(),
            self.ctx.client.backend_count()
        );

        for stage in stages {
            log::debug!("stage {} start", stage.name());
            stage.run(&mut state, &self.ctx).await;
            log::debug!("stage {} done", stage.name());
        }

        log::info!(
            "pipeline done: {} meetings, {} tasks, {} conflicts",
            state.effective_meetings().len(),
            state.effective_tasks().len(),
            state.conflicts.as_ref().map(|c| c.conflict_count).unwrap_or(0)
        );
        state
    }
}

/// The two fixed stage orderings. Order is a load-bearing contract: each
/// stage reads only slots written by earlier stages.
fn stage_list(mode: Mode) -> Vec<Box<dyn Stage>> {
    match mode {
        Mode::Manual => vec![
            Box::new(CalendarStage),
            Box::new(TaskStage),
            Box::new(ConflictStage),
            Box::new(TravelStage),
            Box::new(PlanningStage),
            Box::new(CoordinatorStage),
        ],
        Mode::Live => vec![
            Box::new(CalendarStage),
            Box::new(TaskStage),
            Box::new(EmailStage),
            Box::new(ContactsStage),
            Box::new(SheetsStage),
            Box::new(TravelStage),
            Box::new(ConflictStage),
            Box::new(PlanningStage),
            Box::new(NotesStage),
            Box::new(CoordinatorStage),
        ],
    }
}
