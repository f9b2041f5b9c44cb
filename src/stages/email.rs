//! Email stage (Live only): fetches an inbox snapshot and triages it.

use async_trait::async_trait;
use serde_json::Value;

use crate::reasoning::{extract_json, ChatMessage};
use crate::types::{EmailResult, EmailSummary, ScheduleState};

use super::{count_field, list_field, prompts, reasoning_warning, str_field, Stage, StageContext};

pub struct EmailStage;

#[async_trait]
impl Stage for EmailStage {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let emails = match ctx.source.fetch_inbox_summary().await {
            Ok(list) => list,
            Err(e) => {
                log::warn!("email fetch failed: {}", e);
                state.email = Some(EmailResult {
                    summary: format!("Could not fetch emails: {}", e),
                    recommendations: vec![
                        "Connect your email account to enable inbox analysis".to_string()
                    ],
                    warnings: vec![e.to_string()],
                    ..empty_result()
                });
                return;
            }
        };

        if emails.is_empty() {
            state.email = Some(empty_result());
            return;
        }

        let payload = serde_json::to_string_pretty(&emails).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::EMAIL),
            ChatMessage::user(format!(
                "Analyze these emails:\n{}\n\nReturn ONLY JSON:",
                payload
            )),
        ];

        state.email = Some(match ctx.client.invoke(&messages).await {
            Ok(reply) => match extract_json(&reply.content) {
                Some(value) => accept(&value, &emails),
                None => degraded(&emails, "Response did not match the expected schema"),
            },
            Err(e) => degraded(&emails, &reasoning_warning(&e)),
        });
    }
}

fn accept(value: &Value, emails: &[EmailSummary]) -> EmailResult {
    let Some(summary) = str_field(value, "summary") else {
        return degraded(emails, "Response did not match the expected schema");
    };

    let unread_default = emails.iter().filter(|e| e.is_unread).count();
    EmailResult {
        summary,
        total_emails: count_field(value, "total_emails", emails.len()),
        unread_count: count_field(value, "unread_count", unread_default),
        urgent_emails: list_field(value, "urgent_emails"),
        action_items: list_field(value, "action_items"),
        recommendations: list_field(value, "recommendations"),
        warnings: Vec::new(),
    }
}

pub fn empty_result() -> EmailResult {
    EmailResult {
        summary: "No recent emails.".to_string(),
        total_emails: 0,
        unread_count: 0,
        urgent_emails: Vec::new(),
        action_items: Vec::new(),
        recommendations: vec!["Inbox is clear".to_string()],
        warnings: Vec::new(),
    }
}

fn degraded(emails: &[EmailSummary], cause: &str) -> EmailResult {
    let unread = emails.iter().filter(|e| e.is_unread).count();
    EmailResult {
        summary: format!("Inbox: {} emails, {} unread", emails.len(), unread),
        total_emails: emails.len(),
        unread_count: unread,
        urgent_emails: Vec::new(),
        action_items: Vec::new(),
        recommendations: Vec::new(),
        warnings: vec![cause.to_string()],
    }
}
