//! Planning stage: builds the optimized day plan.
//!
//! Branches on the conflict outcome variant: a clean schedule gets the
//! canonical "schedule looks good" plan with no reasoning call at all;
//! otherwise the backend plans around the detected conflicts, degrading
//! to one reschedule suggestion per conflict.

use async_trait::async_trait;
use serde_json::Value;

use crate::reasoning::{extract_json, ChatMessage};
use crate::types::{ConflictOutcome, PlanResult, ScheduleState};

use super::{list_field, prompts, reasoning_warning, str_field, Stage, StageContext};

pub const CLEAR_SCHEDULE_SUMMARY: &str = "Schedule looks good! You can proceed as planned.";

pub struct PlanningStage;

#[async_trait]
impl Stage for PlanningStage {
    fn name(&self) -> &'static str {
        "planning"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let conflicts = state.conflicts.as_ref();

        // The sentinel branch: a typed variant test, not a substring match.
        let clear = conflicts.map(|c| c.outcome.is_clear()).unwrap_or(true);
        if clear {
            state.plan = Some(PlanResult {
                summary: CLEAR_SCHEDULE_SUMMARY.to_string(),
                schedule_blocks: Vec::new(),
                priorities: Vec::new(),
                suggestions: Vec::new(),
                warnings: Vec::new(),
            });
            return;
        }

        let request = serde_json::json!({
            "calendar_analysis": state.calendar,
            "task_analysis": state.task_analysis,
            "conflicts": conflicts,
            "travel_plan": state.travel,
        });
        let payload = serde_json::to_string_pretty(&request).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::PLANNING),
            ChatMessage::user(format!(
                "Create an optimized plan from this analysis:\n{}\n\nReturn ONLY JSON:",
                payload
            )),
        ];

        let outcome = conflicts.map(|c| c.outcome.clone());
        state.plan = Some(match ctx.client.invoke(&messages).await {
            Ok(reply) => match extract_json(&reply.content) {
                Some(value) => accept(&value, outcome.as_ref()),
                None => degraded(outcome.as_ref(), "Response did not match the expected schema"),
            },
            Err(e) => degraded(outcome.as_ref(), &reasoning_warning(&e)),
        });
    }
}

fn accept(value: &Value, outcome: Option<&ConflictOutcome>) -> PlanResult {
    let Some(summary) = str_field(value, "summary") else {
        return degraded(outcome, "Response did not match the expected schema");
    };

    PlanResult {
        summary,
        schedule_blocks: list_field(value, "schedule_blocks"),
        priorities: list_field(value, "priorities"),
        suggestions: list_field(value, "suggestions"),
        warnings: Vec::new(),
    }
}

/// One reschedule suggestion per conflict, from local data only.
fn degraded(outcome: Option<&ConflictOutcome>, cause: &str) -> PlanResult {
    let suggestions = match outcome {
        Some(ConflictOutcome::Found(list)) => list
            .iter()
            .map(|c| {
                format!(
                    "Reschedule the task or adjust meeting time to avoid: {}",
                    c.description
                )
            })
            .collect(),
        _ => Vec::new(),
    };

    PlanResult {
        summary: format!(
            "Plan around {} detected conflicts",
            outcome.map(ConflictOutcome::count).unwrap_or(0)
        ),
        schedule_blocks: Vec::new(),
        priorities: Vec::new(),
        suggestions,
        warnings: vec![cause.to_string()],
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
    use crate::types::{Conflict, ConflictKind, ConflictResult, Severity};

    fn ctx(backend: Arc<ScriptedBackend>) -> StageContext {
        StageContext {
            client: ReasoningClient::new(vec![backend]),
            source: Arc::new(UnlinkedSource),
            detector: ConflictDetector::default(),
            home_location: "Home".to_string(),
        }
    }

    fn conflict_result(outcome: ConflictOutcome) -> ConflictResult {
        ConflictResult {
            conflict_count: outcome.count(),
            summary: String::new(),
            outcome,
            warnings: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_clear_schedule_skips_backend() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "{}"));
        let c = ctx(backend.clone());
        let mut state = ScheduleState::manual(vec![], vec![]);
        state.conflicts = Some(conflict_result(ConflictOutcome::NoConflicts));

        PlanningStage.run(&mut state, &c).await;

        assert_eq!(state.plan.unwrap().summary, CLEAR_SCHEDULE_SUMMARY);
        // The sentinel branch never invokes the backend.
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_conflicts_drive_reasoning_plan() {
        let reply = r#"{
            "summary": "Shift the report deadline",
            "suggestions": ["Move 'Submit report' to 11:30 AM"]
        }"#;
        let backend = Arc::new(ScriptedBackend::ok("primary", reply));
        let c = ctx(backend.clone());
        let mut state = ScheduleState::manual(vec![], vec![]);
        state.conflicts = Some(conflict_result(ConflictOutcome::Found(vec![Conflict {
            kind: ConflictKind::TimeOverlap,
            severity: Severity::Medium,
            description: "Conflict between 'Call' and task 'Report'".into(),
            entities: vec!["Call".into(), "Report".into()],
        }])));

        PlanningStage.run(&mut state, &c).await;

        let plan = state.plan.unwrap();
        assert_eq!(plan.summary, "Shift the report deadline");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_degraded_suggests_per_conflict() {
        let backend = Arc::new(ScriptedBackend::failing(
            "primary",
            crate::error::BackendError::Overloaded,
        ));
        let c = ctx(backend);
        let mut state = ScheduleState::manual(vec![], vec![]);
        state.conflicts = Some(conflict_result(ConflictOutcome::Found(vec![
            Conflict {
                kind: ConflictKind::TimeOverlap,
                severity: Severity::High,
                description: "Conflict between 'A' and task 'X'".into(),
                entities: vec!["A".into(), "X".into()],
            },
            Conflict {
                kind: ConflictKind::TimeOverlap,
                severity: Severity::Medium,
                description: "Conflict between 'B' and task 'Y'".into(),
                entities: vec!["B".into(), "Y".into()],
            },
        ])));

        PlanningStage.run(&mut state, &c).await;

        let plan = state.plan.unwrap();
        assert_eq!(plan.suggestions.len(), 2);
        assert!(plan.summary.contains("2 detected conflicts"));
        assert!(!plan.warnings.is_empty());
    }
}
