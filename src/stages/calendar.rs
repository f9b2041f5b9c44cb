//! Calendar stage: analyzes meetings (Manual) or fetches then analyzes
//! them (Live). Writes `state.calendar` and, in Live mode, populates
//! `state.meetings` from the fetch so downstream stages see real events.

use async_trait::async_trait;
use serde_json::Value;

use crate::reasoning::{extract_json, ChatMessage};
use crate::types::{CalendarResult, Meeting, Mode, ScheduleState};

use super::{count_field, list_field, prompts, reasoning_warning, str_field, Stage, StageContext};

pub struct CalendarStage;

#[async_trait]
impl Stage for CalendarStage {
    fn name(&self) -> &'static str {
        "calendar"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let meetings = match state.mode {
            Mode::Manual => state.meetings.clone(),
            Mode::Live => match ctx.source.fetch_meetings().await {
                Ok(fetched) => {
                    state.meetings = fetched.clone();
                    fetched
                }
                Err(e) => {
                    log::warn!("calendar fetch failed: {}", e);
                    state.calendar = Some(not_connected(&e.to_string()));
                    return;
                }
            },
        };

        if meetings.is_empty() {
            state.calendar = Some(empty_result());
            return;
        }

        // Stable field order so tests can assert on exact request content.
        let payload = serde_json::to_string_pretty(&meetings).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::CALENDAR),
            ChatMessage::user(format!(
                "Analyze these calendar events:\n{}\n\nReturn ONLY JSON:",
                payload
            )),
        ];

        state.calendar = Some(match ctx.client.invoke(&messages).await {
            Ok(reply) => match extract_json(&reply.content) {
                Some(value) => accept(&value, &meetings),
                None => {
                    log::warn!("calendar reply from {} did not parse", reply.backend);
                    degraded(&meetings, "Response did not match the expected schema")
                }
            },
            Err(e) => degraded(&meetings, &reasoning_warning(&e)),
        });
    }
}

/// Map a schema-conforming reply, defaulting missing optional fields.
fn accept(value: &Value, meetings: &[Meeting]) -> CalendarResult {
    let Some(summary) = str_field(value, "summary") else {
        return degraded(meetings, "Response did not match the expected schema");
    };

    CalendarResult {
        summary,
        total_events: count_field(value, "total_events", meetings.len()),
        busy_periods: list_field(value, "busy_periods"),
        free_slots: list_field(value, "free_slots"),
        locations: list_field(value, "locations"),
        insights: list_field(value, "insights"),
        attendees_summary: str_field(value, "attendees_summary")
            .unwrap_or_else(|| "See raw events".to_string()),
        raw_events: meetings.to_vec(),
        warnings: Vec::new(),
    }
}

/// Canonical empty result. Exact and deterministic: no external call is
/// ever made for an empty schedule.
pub fn empty_result() -> CalendarResult {
    CalendarResult {
        summary: "No events scheduled for today.".to_string(),
        total_events: 0,
        busy_periods: Vec::new(),
        free_slots: vec!["Entire day is free".to_string()],
        locations: Vec::new(),
        insights: vec!["Free day — great for deep work".to_string()],
        attendees_summary: "No meetings today".to_string(),
        raw_events: Vec::new(),
        warnings: Vec::new(),
    }
}

/// Degraded result from locally available data only.
fn degraded(meetings: &[Meeting], cause: &str) -> CalendarResult {
    let mut locations: Vec<String> = meetings
        .iter()
        .filter_map(|m| m.location.clone())
        .collect();
    locations.sort();
    locations.dedup();

    CalendarResult {
        summary: format!("Calendar analysis for {} meetings", meetings.len()),
        total_events: meetings.len(),
        busy_periods: meetings.iter().map(|m| m.time.clone()).collect(),
        free_slots: Vec::new(),
        locations,
        insights: Vec::new(),
        attendees_summary: "See raw events".to_string(),
        raw_events: meetings.to_vec(),
        warnings: vec![cause.to_string()],
    }
}

fn not_connected(cause: &str) -> CalendarResult {
    CalendarResult {
        summary: format!("Could not fetch calendar: {}", cause),
        insights: vec!["Connect your calendar account to enable analysis".to_string()],
        warnings: vec![cause.to_string()],
        ..empty_result()
    }
}
