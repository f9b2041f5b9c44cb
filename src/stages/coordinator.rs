//! Coordinator stage: synthesizes every result slot into the final
//! natural-language response. The one stage whose output is free text,
//! not JSON; degradation falls back to a deterministic multi-line report
//! built from the slots themselves.

use async_trait::async_trait;

use crate::reasoning::ChatMessage;
use crate::types::ScheduleState;

use super::{prompts, Stage, StageContext};

pub struct CoordinatorStage;

#[async_trait]
impl Stage for CoordinatorStage {
    fn name(&self) -> &'static str {
        "coordinator"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let request = serde_json::json!({
            "calendar_analysis": state.calendar,
            "task_analysis": state.task_analysis,
            "conflicts": state.conflicts,
            "travel_plan": state.travel,
            "optimized_plan": state.plan,
        });
        let payload = serde_json::to_string_pretty(&request).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::COORDINATOR),
            ChatMessage::user(format!(
                "Here's the complete analysis of the user's day:\n{}\n\nCreate a friendly, actionable summary that helps the user understand their day and what they should focus on.",
                payload
            )),
        ];

        state.final_response = Some(match ctx.client.invoke(&messages).await {
            Ok(reply) => {
                log::debug!("coordinator response served by {}", reply.backend);
                reply.content
            }
            Err(e) => {
                log::warn!("coordinator degraded: {}", e);
                fallback_summary(state, &e.to_string())
            }
        });
    }
}

/// Deterministic synthesis from locally available results.
fn fallback_summary(state: &ScheduleState, cause: &str) -> String {
    let meetings = state
        .calendar
        .as_ref()
        .map(|c| c.total_events.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let tasks = state
        .task_analysis
        .as_ref()
        .map(|t| t.total_tasks.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let conflicts = state
        .conflicts
        .as_ref()
        .map(|c| c.conflict_count.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let travel = state
        .travel
        .as_ref()
        .map(|t| t.summary.clone())
        .unwrap_or_else(|| "Check travel plan".to_string());

    let mut lines = vec![
        "Good day! Here's your schedule summary:".to_string(),
        String::new(),
        format!("Meetings: {} scheduled", meetings),
        format!("Tasks: {} to complete", tasks),
        format!("Conflicts: {} detected", conflicts),
        format!("Travel: {}", travel),
    ];

    if let Some(conflict_result) = &state.conflicts {
        if let crate::types::ConflictOutcome::Found(list) = &conflict_result.outcome {
            lines.push(String::new());
            lines.push("Watch out for:".to_string());
            for c in list {
                lines.push(format!("- {}", c.description));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Have a productive day! (Some analysis details unavailable: {})",
        cause
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::conflict::ConflictDetector;
    use crate::reasoning::testing::ScriptedBackend;
    use crate::reasoning::ReasoningClient;
    use crate::sources::UnlinkedSource;
    use crate::types::{
        CalendarResult, Conflict, ConflictKind, ConflictOutcome, ConflictResult, Severity,
        TaskAnalysisResult,
    };

    fn ctx(backend: Arc<ScriptedBackend>) -> StageContext {
        StageContext {
            client: ReasoningClient::new(vec![backend]),
            source: Arc::new(UnlinkedSource),
            detector: ConflictDetector::default(),
            home_location: "Home".to_string(),
        }
    }

    fn populated_state() -> ScheduleState {
        let mut state = ScheduleState::manual(vec![], vec![]);
        state.calendar = Some(CalendarResult {
            summary: "1 meeting".into(),
            total_events: 1,
            ..Default::default()
        });
        state.task_analysis = Some(TaskAnalysisResult {
            summary: "1 task".into(),
            total_tasks: 1,
            ..Default::default()
        });
        state.conflicts = Some(ConflictResult {
            outcome: ConflictOutcome::Found(vec![Conflict {
                kind: ConflictKind::TimeOverlap,
                severity: Severity::High,
                description: "Conflict between 'Client Call' and task 'Submit report'".into(),
                entities: vec!["Client Call".into(), "Submit report".into()],
            }]),
            conflict_count: 1,
            summary: "1 scheduling conflicts detected".into(),
            warnings: Vec::new(),
        });
        state
    }

    #[tokio::test]
    async fn test_success_uses_model_text() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "Here's your day at a glance."));
        let c = ctx(backend);
        let mut state = populated_state();

        CoordinatorStage.run(&mut state, &c).await;

        assert_eq!(
            state.final_response.as_deref(),
            Some("Here's your day at a glance.")
        );
    }

    #[tokio::test]
    async fn test_fallback_names_both_conflict_entities() {
        let backend = Arc::new(ScriptedBackend::failing(
            "primary",
            crate::error::BackendError::RateLimited,
        ));
        let c = ctx(backend);
        let mut state = populated_state();

        CoordinatorStage.run(&mut state, &c).await;

        let response = state.final_response.unwrap();
        assert!(response.contains("Meetings: 1 scheduled"));
        assert!(response.contains("Tasks: 1 to complete"));
        assert!(response.contains("Conflicts: 1 detected"));
        assert!(response.contains("Client Call"));
        assert!(response.contains("Submit report"));
    }
}
