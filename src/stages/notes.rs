//! Notes stage (Live only): drafts prep notes and follow-ups from the
//! fetched meetings and tasks.

use async_trait::async_trait;
use serde_json::Value;

use crate::reasoning::{extract_json, ChatMessage};
use crate::types::{NotesResult, ScheduleState};

use super::{list_field, prompts, reasoning_warning, str_field, Stage, StageContext};

pub struct NotesStage;

#[async_trait]
impl Stage for NotesStage {
    fn name(&self) -> &'static str {
        "notes"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let meetings = state.effective_meetings();
        let tasks = state.effective_tasks();

        if meetings.is_empty() && tasks.is_empty() {
            state.notes = Some(empty_result());
            return;
        }

        let events_payload = serde_json::to_string_pretty(meetings).unwrap_or_default();
        let tasks_payload = serde_json::to_string_pretty(tasks).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::NOTES),
            ChatMessage::user(format!(
                "Generate useful notes based on:\n\nEvents:\n{}\n\nTasks:\n{}\n\nReturn ONLY JSON:",
                events_payload, tasks_payload
            )),
        ];

        state.notes = Some(match ctx.client.invoke(&messages).await {
            Ok(reply) => match extract_json(&reply.content) {
                Some(value) => accept(&value),
                None => degraded("Response did not match the expected schema"),
            },
            Err(e) => degraded(&reasoning_warning(&e)),
        });
    }
}

fn accept(value: &Value) -> NotesResult {
    let Some(summary) = str_field(value, "summary") else {
        return degraded("Response did not match the expected schema");
    };

    NotesResult {
        summary,
        meeting_prep_notes: list_field(value, "meeting_prep_notes"),
        follow_up_reminders: list_field(value, "follow_up_reminders"),
        key_notes: list_field(value, "key_notes"),
        recommendations: list_field(value, "recommendations"),
        warnings: Vec::new(),
    }
}

pub fn empty_result() -> NotesResult {
    NotesResult {
        summary: "No notes generated.".to_string(),
        meeting_prep_notes: Vec::new(),
        follow_up_reminders: Vec::new(),
        key_notes: Vec::new(),
        recommendations: Vec::new(),
        warnings: Vec::new(),
    }
}

fn degraded(cause: &str) -> NotesResult {
    NotesResult {
        warnings: vec![cause.to_string()],
        ..empty_result()
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
    async fn test_empty_day_short_circuits() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "{}"));
        let c = ctx(backend.clone());
        let mut state = ScheduleState::live();

        NotesStage.run(&mut state, &c).await;

        assert_eq!(state.notes.unwrap().summary, "No notes generated.");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generates_notes_from_reply() {
        let reply = r#"{
            "summary": "Prep for QBR",
            "meeting_prep_notes": ["Review Acme account history"],
            "follow_up_reminders": ["Send recap after QBR"]
        }"#;
        let backend = Arc::new(ScriptedBackend::ok("primary", reply));
        let c = ctx(backend);
        let mut state = ScheduleState::live();
        state.meetings = vec![Meeting::new("QBR", "10:00 AM", Some("Office"))];
        state.tasks = vec![TaskItem::new("Send deck", "9:00 AM")];

        NotesStage.run(&mut state, &c).await;

        let result = state.notes.unwrap();
        assert_eq!(result.summary, "Prep for QBR");
        assert_eq!(result.meeting_prep_notes.len(), 1);
    }

    #[tokio::test]
    async fn test_degrades_on_reasoning_failure() {
        let backend = Arc::new(ScriptedBackend::failing(
            "primary",
            crate::error::BackendError::RateLimited,
        ));
        let c = ctx(backend);
        let mut state = ScheduleState::live();
        state.meetings = vec![Meeting::new("QBR", "10:00 AM", None)];

        NotesStage.run(&mut state, &c).await;

        let result = state.notes.unwrap();
        assert_eq!(result.summary, "No notes generated.");
        assert!(result.warnings[0].contains("Reasoning unavailable"));
    }
}
