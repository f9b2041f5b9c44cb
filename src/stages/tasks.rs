//! Task stage: analyzes tasks (Manual) or fetches then analyzes them
//! (Live). Writes `state.task_analysis` and, in Live mode, populates
//! `state.tasks`.

use async_trait::async_trait;
use serde_json::Value;

use crate::reasoning::{extract_json, ChatMessage};
use crate::types::{Mode, ScheduleState, TaskAnalysisResult, TaskItem};

use super::{count_field, list_field, prompts, reasoning_warning, str_field, Stage, StageContext};

pub struct TaskStage;

#[async_trait]
impl Stage for TaskStage {
    fn name(&self) -> &'static str {
        "tasks"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let tasks = match state.mode {
            Mode::Manual => state.tasks.clone(),
            Mode::Live => match ctx.source.fetch_tasks().await {
                Ok(fetched) => {
                    state.tasks = fetched.clone();
                    fetched
                }
                Err(e) => {
                    log::warn!("task fetch failed: {}", e);
                    state.task_analysis = Some(not_connected(&e.to_string()));
                    return;
                }
            },
        };

        if tasks.is_empty() {
            state.task_analysis = Some(empty_result());
            return;
        }

        let payload = serde_json::to_string_pretty(&tasks).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::TASKS),
            ChatMessage::user(format!(
                "Analyze these tasks:\n{}\n\nReturn ONLY JSON:",
                payload
            )),
        ];

        state.task_analysis = Some(match ctx.client.invoke(&messages).await {
            Ok(reply) => match extract_json(&reply.content) {
                Some(value) => accept(&value, &tasks),
                None => {
                    log::warn!("task reply from {} did not parse", reply.backend);
                    degraded(&tasks, "Response did not match the expected schema")
                }
            },
            Err(e) => degraded(&tasks, &reasoning_warning(&e)),
        });
    }
}

fn accept(value: &Value, tasks: &[TaskItem]) -> TaskAnalysisResult {
    let Some(summary) = str_field(value, "summary") else {
        return degraded(tasks, "Response did not match the expected schema");
    };

    TaskAnalysisResult {
        summary,
        total_tasks: count_field(value, "total_tasks", tasks.len()),
        overdue_tasks: list_field(value, "overdue_tasks"),
        today_tasks: list_field(value, "today_tasks"),
        upcoming_tasks: list_field(value, "upcoming_tasks"),
        urgent_tasks: list_field(value, "urgent_tasks"),
        priority_order: list_field(value, "priority_order"),
        workload_assessment: str_field(value, "workload_assessment")
            .unwrap_or_else(|| "moderate".to_string()),
        recommendations: list_field(value, "recommendations"),
        raw_tasks: tasks.to_vec(),
        warnings: Vec::new(),
    }
}

/// Canonical empty result; no external call for an empty task list.
pub fn empty_result() -> TaskAnalysisResult {
    TaskAnalysisResult {
        summary: "No tasks found.".to_string(),
        total_tasks: 0,
        overdue_tasks: Vec::new(),
        today_tasks: Vec::new(),
        upcoming_tasks: Vec::new(),
        urgent_tasks: Vec::new(),
        priority_order: Vec::new(),
        workload_assessment: "light".to_string(),
        recommendations: vec!["No pending tasks — plan ahead".to_string()],
        raw_tasks: Vec::new(),
        warnings: Vec::new(),
    }
}

fn degraded(tasks: &[TaskItem], cause: &str) -> TaskAnalysisResult {
    let titles: Vec<String> = tasks.iter().map(|t| t.title.clone()).collect();
    TaskAnalysisResult {
        summary: format!("Task analysis for {} tasks", tasks.len()),
        total_tasks: tasks.len(),
        overdue_tasks: Vec::new(),
        today_tasks: Vec::new(),
        upcoming_tasks: Vec::new(),
        urgent_tasks: titles.clone(),
        priority_order: titles,
        workload_assessment: "moderate".to_string(),
        recommendations: Vec::new(),
        raw_tasks: tasks.to_vec(),
        warnings: vec![cause.to_string()],
    }
}

fn not_connected(cause: &str) -> TaskAnalysisResult {
    TaskAnalysisResult {
        summary: format!("Could not fetch tasks: {}", cause),
        recommendations: vec!["Connect your tasks account to enable task analysis".to_string()],
        warnings: vec![cause.to_string()],
        ..empty_result()
    }
}
