use std::process::ExitCode;

use serde::Deserialize;

use daybrief::{Meeting, PipelineConfig, PipelineEngine, TaskItem};

/// Input file shape: `{"meetings": [...], "tasks": [...]}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleInput {
    #[serde(default)]
    meetings: Vec<Meeting>,
    #[serde(default)]
    tasks: Vec<TaskItem>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: daybrief <schedule.json>");
        return ExitCode::FAILURE;
    };

    let input: ScheduleInput = match std::fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("error: {} is not a valid schedule file: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        Err(e) => {
            eprintln!("error: cannot read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = match PipelineEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = engine.run_manual(input.meetings, input.tasks).await;

    if let Some(response) = &state.final_response {
        println!("{}", response);
    }

    match serde_json::to_string_pretty(&state) {
        Ok(json) => {
            println!("\n--- full analysis ---");
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: could not serialize analysis: {}", e);
            ExitCode::FAILURE
        }
    }
}
