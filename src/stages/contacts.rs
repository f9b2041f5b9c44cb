//! Contacts stage (Live only): fetches contact records and matches them
//! against today's meetings.

use async_trait::async_trait;
use serde_json::Value;

use crate::reasoning::{extract_json, ChatMessage};
use crate::types::{ContactRecord, ContactsResult, ScheduleState};

use super::{list_field, prompts, reasoning_warning, str_field, Stage, StageContext};

/// Cap on how many contact records go into the prompt.
const MAX_PROMPT_CONTACTS: usize = 50;

pub struct ContactsStage;

#[async_trait]
impl Stage for ContactsStage {
    fn name(&self) -> &'static str {
        "contacts"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let contacts = match ctx.source.fetch_contacts().await {
            Ok(list) => list,
            Err(e) => {
                log::warn!("contacts fetch failed: {}", e);
                state.contacts = Some(ContactsResult {
                    summary: format!("Could not fetch contacts: {}", e),
                    suggestions: vec![
                        "Connect your contacts account for attendee analysis".to_string()
                    ],
                    warnings: vec![e.to_string()],
                    ..empty_result()
                });
                return;
            }
        };

        if contacts.is_empty() {
            state.contacts = Some(empty_result());
            return;
        }

        let window = &contacts[..contacts.len().min(MAX_PROMPT_CONTACTS)];
        let contacts_payload = serde_json::to_string_pretty(window).unwrap_or_default();
        let meetings_payload =
            serde_json::to_string_pretty(state.effective_meetings()).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::CONTACTS),
            ChatMessage::user(format!(
                "Contacts:\n{}\n\nToday's meetings:\n{}\n\nMatch attendees with contact records. Return ONLY JSON:",
                contacts_payload, meetings_payload
            )),
        ];

        state.contacts = Some(match ctx.client.invoke(&messages).await {
            Ok(reply) => match extract_json(&reply.content) {
                Some(value) => accept(&value, &contacts),
                None => degraded(&contacts, "Response did not match the expected schema"),
            },
            Err(e) => degraded(&contacts, &reasoning_warning(&e)),
        });
    }
}

fn accept(value: &Value, contacts: &[ContactRecord]) -> ContactsResult {
    let Some(summary) = str_field(value, "summary") else {
        return degraded(contacts, "Response did not match the expected schema");
    };

    ContactsResult {
        summary,
        meeting_contacts: list_field(value, "meeting_contacts"),
        vip_contacts: list_field(value, "vip_contacts"),
        missing_info: list_field(value, "missing_info"),
        suggestions: list_field(value, "suggestions"),
        warnings: Vec::new(),
    }
}

pub fn empty_result() -> ContactsResult {
    ContactsResult {
        summary: "No contacts available.".to_string(),
        meeting_contacts: Vec::new(),
        vip_contacts: Vec::new(),
        missing_info: Vec::new(),
        suggestions: Vec::new(),
        warnings: Vec::new(),
    }
}

fn degraded(contacts: &[ContactRecord], cause: &str) -> ContactsResult {
    ContactsResult {
        summary: format!("Found {} contacts", contacts.len()),
        warnings: vec![cause.to_string()],
        ..empty_result()
    }
}
