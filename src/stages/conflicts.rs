//! Conflict detection stage.
//!
//! Always the deterministic detector; there is no reasoning call here and
//! therefore no degraded placeholder. Time-parse failures surface as
//! warnings on the result.

use async_trait::async_trait;

use crate::types::{ConflictOutcome, ConflictResult, ScheduleState, NO_CONFLICTS_SENTINEL};

use super::{Stage, StageContext};

pub struct ConflictStage;

#[async_trait]
impl Stage for ConflictStage {
    fn name(&self) -> &'static str {
        "conflicts"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let detection = ctx
            .detector
            .detect(state.effective_meetings(), state.effective_tasks());

        let summary = match &detection.outcome {
            ConflictOutcome::NoConflicts => NO_CONFLICTS_SENTINEL.to_string(),
            ConflictOutcome::Found(list) => {
                format!("{} scheduling conflicts detected", list.len())
            }
        };

        state.conflicts = Some(ConflictResult {
            conflict_count: detection.outcome.count(),
            outcome: detection.outcome,
            summary,
            warnings: detection.warnings,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::conflict::ConflictDetector;
    use crate::reasoning::testing::ScriptedBackend;
    use crate::reasoning::ReasoningClient;
    use crate::sources::UnlinkedSource;
    use crate::types::{Meeting, TaskItem};

    fn ctx(backend: Arc<ScriptedBackend>) -> StageContext {
        StageContext {
            client: ReasoningClient::new(vec![backend]),
            source: Arc::new(UnlinkedSource),
            detector: ConflictDetector::default(),
            home_location: "Home".to_string(),
        }
    }

    #[tokio::test]
    async fn test_clean_schedule_writes_sentinel() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "{}"));
        let c = ctx(backend.clone());
        let mut state = ScheduleState::manual(
            vec![Meeting::new("Sync", "9:00 AM", None)],
            vec![TaskItem::new("Report", "5:00 PM")],
        );

        ConflictStage.run(&mut state, &c).await;

        let result = state.conflicts.unwrap();
        assert_eq!(result.outcome, ConflictOutcome::NoConflicts);
        assert_eq!(result.summary, "No conflicts detected.");
        assert_eq!(result.conflict_count, 0);
        // Deterministic: the backend is never consulted.
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_nearby_pair_writes_conflicts() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "{}"));
        let c = ctx(backend);
        let mut state = ScheduleState::manual(
            vec![Meeting::new("Client Call", "10:00 AM", None)],
            vec![TaskItem::new("Submit report", "10:15 AM")],
        );

        ConflictStage.run(&mut state, &c).await;

        let result = state.conflicts.unwrap();
        assert_eq!(result.conflict_count, 1);
        assert_eq!(result.summary, "1 scheduling conflicts detected");
        let ConflictOutcome::Found(list) = result.outcome else {
            panic!("expected conflicts");
        };
        assert!(list[0].description.contains("Client Call"));
        assert!(list[0].description.contains("Submit report"));
    }

    #[tokio::test]
    async fn test_time_parse_failure_becomes_warning() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "{}"));
        let c = ctx(backend);
        let mut state = ScheduleState::manual(
            vec![Meeting::new("Vague", "whenever", None)],
            vec![TaskItem::new("Report", "5:00 PM")],
        );

        ConflictStage.run(&mut state, &c).await;

        let result = state.conflicts.unwrap();
        assert_eq!(result.outcome, ConflictOutcome::NoConflicts);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("whenever"));
    }
}
