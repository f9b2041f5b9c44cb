//! Conversational interface over the same reasoning chain.
//!
//! Unlike a pipeline run, chat is latency-sensitive: the quick-context
//! fetch (today's meetings and tasks) runs under a hard deadline, and on
//! expiry the question is answered without live data rather than kept
//! waiting. History is capped to the most recent exchanges so the prompt
//! stays bounded across a long session.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ReasoningError;
use crate::reasoning::{ChatMessage, ReasoningClient};
use crate::sources::DataSourceAdapter;
use crate::types::{Meeting, TaskItem};

/// Messages of history (user + assistant) kept per session.
const HISTORY_LIMIT: usize = 8;

const CHAT_SYSTEM: &str = "You are a helpful daily schedule assistant. \
Answer questions about the user's day concisely and concretely. \
When schedule context is provided, ground every answer in it; \
never invent meetings or tasks that are not listed.";

/// One answered question.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub reply: String,
    /// Whether live schedule context made it into the prompt.
    pub used_context: bool,
    /// Which backend served the answer.
    pub backend: String,
}

pub struct ChatSession {
    client: ReasoningClient,
    source: Arc<dyn DataSourceAdapter>,
    context_timeout: Duration,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(
        client: ReasoningClient,
        source: Arc<dyn DataSourceAdapter>,
        context_timeout_secs: u64,
    ) -> Self {
        Self {
            client,
            source,
            context_timeout: Duration::from_secs(context_timeout_secs),
            history: Vec::new(),
        }
    }

    /// Answer one question, with quick schedule context when it arrives in
    /// time. Context failure is never fatal; reasoning failure is.
    pub async fn ask(&mut self, question: &str) -> Result<ChatReply, ReasoningError> {
        let context = self.gather_context().await;
        let used_context = context.is_some();

        let system = match &context {
            Some(text) => format!("{}\n\nToday's schedule:\n{}", CHAT_SYSTEM, text),
            None => format!(
                "{}\n\nLive schedule data is unavailable right now; \
                 answer from general knowledge and say so when the \
                 question needs the schedule.",
                CHAT_SYSTEM
            ),
        };

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(question));

        let reply = self.client.invoke(&messages).await?;

        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(reply.content.clone()));
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }

        Ok(ChatReply {
            reply: reply.content,
            used_context,
            backend: reply.backend,
        })
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Fetch meetings and tasks under the context deadline. Any failure or
    /// expiry degrades to no context.
    async fn gather_context(&self) -> Option<String> {
        let fetch = async {
            let meetings = self.source.fetch_meetings().await?;
            let tasks = self.source.fetch_tasks().await?;
            Ok::<_, crate::error::SourceError>((meetings, tasks))
        };

        match tokio::time::timeout(self.context_timeout, fetch).await {
            Ok(Ok((meetings, tasks))) => Some(render_context(&meetings, &tasks)),
            Ok(Err(e)) => {
                log::warn!("chat context unavailable: {}", e);
                None
            }
            Err(_) => {
                log::warn!(
                    "chat context fetch exceeded {}s, answering without live data",
                    self.context_timeout.as_secs()
                );
                None
            }
        }
    }
}

fn render_context(meetings: &[Meeting], tasks: &[TaskItem]) -> String {
    let mut lines = Vec::new();

    if meetings.is_empty() {
        lines.push("No meetings today.".to_string());
    } else {
        lines.push("Meetings:".to_string());
        for m in meetings {
            let location = m.location.as_deref().unwrap_or("no location");
            lines.push(format!("- {} at {} ({})", m.title, m.time, location));
        }
    }

    if tasks.is_empty() {
        lines.push("No tasks today.".to_string());
    } else {
        lines.push("Tasks:".to_string());
        for t in tasks {
            lines.push(format!("- {} due {}", t.title, t.deadline));
        }
    }

    lines.join("\n")
}
