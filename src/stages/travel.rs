//! Travel stage.
//!
//! Manual mode estimates travel for meetings with physical locations
//! (reasoning-backed, conservative fallback). Live mode first pulls real
//! directions between consecutive locations from the data source, then
//! asks the reasoning backend to plan around them; a failed directions
//! fetch yields zero routes rather than guessed ones.

use async_trait::async_trait;
use serde_json::Value;

use crate::reasoning::{extract_json, ChatMessage};
use crate::types::{Meeting, Mode, RouteInfo, ScheduleState, TravelLeg, TravelResult};

use super::{list_field, prompts, reasoning_warning, str_field, Stage, StageContext};

pub struct TravelStage;

#[async_trait]
impl Stage for TravelStage {
    fn name(&self) -> &'static str {
        "travel"
    }

    async fn run(&self, state: &mut ScheduleState, ctx: &StageContext) {
        let meetings: Vec<Meeting> = state
            .effective_meetings()
            .iter()
            .filter(|m| m.requires_travel())
            .cloned()
            .collect();

        if state.effective_meetings().is_empty() {
            state.travel = Some(empty_result());
            return;
        }

        if meetings.is_empty() {
            state.travel = Some(TravelResult {
                summary: "No travel required — all meetings virtual or same location".to_string(),
                ..empty_result()
            });
            return;
        }

        let (routes, mut route_warnings) = match state.mode {
            Mode::Manual => (Vec::new(), Vec::new()),
            Mode::Live => fetch_routes(&meetings, ctx).await,
        };

        let routes_text = if routes.is_empty() {
            "No route data — estimate travel times".to_string()
        } else {
            serde_json::to_string_pretty(&routes).unwrap_or_default()
        };

        let payload = serde_json::to_string_pretty(&meetings).unwrap_or_default();
        let messages = [
            ChatMessage::system(prompts::TRAVEL),
            ChatMessage::user(format!(
                "Analyze travel requirements for these meetings:\n{}\n\nRoute data (if available):\n{}\n\nReturn ONLY JSON:",
                payload, routes_text
            )),
        ];

        let mut result = match ctx.client.invoke(&messages).await {
            Ok(reply) => match extract_json(&reply.content) {
                Some(value) => accept(&value, &meetings, &routes),
                None => degraded(&meetings, &routes, "Response did not match the expected schema"),
            },
            Err(e) => degraded(&meetings, &routes, &reasoning_warning(&e)),
        };
        result.warnings.append(&mut route_warnings);
        state.travel = Some(result);
    }
}

/// Directions between consecutive physical locations, starting from home.
/// Each failed leg becomes a warning; no route is fabricated.
async fn fetch_routes(meetings: &[Meeting], ctx: &StageContext) -> (Vec<RouteInfo>, Vec<String>) {
    let mut stops = vec![ctx.home_location.clone()];
    for m in meetings {
        if let Some(loc) = &m.location {
            if stops.last().map(String::as_str) != Some(loc.as_str()) {
                stops.push(loc.clone());
            }
        }
    }

    let mut routes = Vec::new();
    let mut warnings = Vec::new();
    for pair in stops.windows(2) {
        match ctx.source.fetch_directions(&pair[0], &pair[1]).await {
            Ok(route) => routes.push(route),
            Err(e) => {
                log::warn!("directions {} -> {} failed: {}", pair[0], pair[1], e);
                warnings.push(format!("No directions for {} -> {}: {}", pair[0], pair[1], e));
            }
        }
    }
    (routes, warnings)
}

fn accept(value: &Value, meetings: &[Meeting], routes: &[RouteInfo]) -> TravelResult {
    let Some(summary) = str_field(value, "summary") else {
        return degraded(meetings, routes, "Response did not match the expected schema");
    };

    TravelResult {
        summary,
        total_travel_time: str_field(value, "total_travel_time")
            .unwrap_or_else(|| total_from_routes(routes)),
        legs: Vec::new(),
        routes: routes.to_vec(),
        departure_times: list_field(value, "departure_times"),
        optimization_tips: list_field(value, "optimization_tips"),
        warnings: Vec::new(),
    }
}

pub fn empty_result() -> TravelResult {
    TravelResult {
        summary: "No travel needed — no meetings scheduled.".to_string(),
        total_travel_time: "0 minutes".to_string(),
        legs: Vec::new(),
        routes: Vec::new(),
        departure_times: Vec::new(),
        optimization_tips: Vec::new(),
        warnings: Vec::new(),
    }
}

/// Conservative per-meeting estimate when the reasoning chain is down:
/// one leg per physical meeting, flat 30-minute figure.
fn degraded(meetings: &[Meeting], routes: &[RouteInfo], cause: &str) -> TravelResult {
    let legs: Vec<TravelLeg> = meetings
        .iter()
        .map(|m| TravelLeg {
            meeting: m.title.clone(),
            location: m.location.clone().unwrap_or_else(|| "Unknown".to_string()),
            meeting_time: m.time.clone(),
            recommended_departure: "15 minutes early".to_string(),
            travel_duration: "30 minutes".to_string(),
            notes: "Basic estimate — live route data unavailable".to_string(),
        })
        .collect();

    let total = if routes.is_empty() {
        format!("{} min estimated", meetings.len() * 30)
    } else {
        total_from_routes(routes)
    };

    TravelResult {
        summary: format!("Basic travel plan for {} meetings", meetings.len()),
        total_travel_time: total,
        legs,
        routes: routes.to_vec(),
        departure_times: Vec::new(),
        optimization_tips: Vec::new(),
        warnings: vec![cause.to_string()],
    }
}

fn total_from_routes(routes: &[RouteInfo]) -> String {
    let total_secs: u64 = routes.iter().map(|r| r.duration_seconds).sum();
    format!("{} minutes", total_secs / 60)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::conflict::ConflictDetector;
    use crate::reasoning::testing::ScriptedBackend;
    use crate::reasoning::ReasoningClient;
    use crate::sources::testing::FixtureSource;
    use crate::sources::{DataSourceAdapter, UnlinkedSource};

    fn ctx(backend: Arc<ScriptedBackend>, source: Arc<dyn DataSourceAdapter>) -> StageContext {
        StageContext {
            client: ReasoningClient::new(vec![backend]),
            source,
            detector: ConflictDetector::default(),
            home_location: "Home".to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_meetings_is_empty_result() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "{}"));
        let c = ctx(backend.clone(), Arc::new(UnlinkedSource));
        let mut state = ScheduleState::manual(vec![], vec![]);

        TravelStage.run(&mut state, &c).await;

        let result = state.travel.unwrap();
        assert_eq!(result.summary, "No travel needed — no meetings scheduled.");
        assert_eq!(result.total_travel_time, "0 minutes");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_all_virtual_short_circuits() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "{}"));
        let c = ctx(backend.clone(), Arc::new(UnlinkedSource));
        let mut state = ScheduleState::manual(
            vec![
                Meeting::new("Standup", "9:00 AM", Some("Zoom")),
                Meeting::new("1:1", "10:00 AM", None),
            ],
            vec![],
        );

        TravelStage.run(&mut state, &c).await;

        let result = state.travel.unwrap();
        assert!(result.summary.contains("all meetings virtual"));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_degraded_builds_legs() {
        let backend = Arc::new(ScriptedBackend::ok("primary", "not json"));
        let c = ctx(backend, Arc::new(UnlinkedSource));
        let mut state = ScheduleState::manual(
            vec![
                Meeting::new("QBR", "10:00 AM", Some("Office")),
                Meeting::new("Lunch", "12:00 PM", Some("Cafe")),
            ],
            vec![],
        );

        TravelStage.run(&mut state, &c).await;

        let result = state.travel.unwrap();
        assert_eq!(result.legs.len(), 2);
        assert_eq!(result.legs[0].recommended_departure, "15 minutes early");
        assert_eq!(result.total_travel_time, "60 min estimated");
        assert!(!result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_live_routes_fetched_between_consecutive_stops() {
        let reply = r#"{"summary": "One hop from home", "total_travel_time": "25 minutes"}"#;
        let backend = Arc::new(ScriptedBackend::ok("primary", reply));
        let source = FixtureSource {
            routes: vec![RouteInfo {
                origin: "Home".into(),
                destination: "Office".into(),
                duration_seconds: 1500,
                distance_text: "12 km".into(),
                summary: "via Main St".into(),
            }],
            ..Default::default()
        };
        let c = ctx(backend, Arc::new(source));
        let mut state = ScheduleState::live();
        state.meetings = vec![Meeting::new("QBR", "10:00 AM", Some("Office"))];

        TravelStage.run(&mut state, &c).await;

        let result = state.travel.unwrap();
        assert_eq!(result.routes.len(), 1);
        assert_eq!(result.routes[0].destination, "Office");
        assert_eq!(result.summary, "One hop from home");
    }

    #[tokio::test]
    async fn test_live_directions_failure_keeps_zero_routes() {
        let reply = r#"{"summary": "Plan without routes"}"#;
        let backend = Arc::new(ScriptedBackend::ok("primary", reply));
        // FixtureSource with no routes: every directions call fails.
        let c = ctx(backend, Arc::new(FixtureSource::default()));
        let mut state = ScheduleState::live();
        state.meetings = vec![Meeting::new("QBR", "10:00 AM", Some("Office"))];

        TravelStage.run(&mut state, &c).await;

        let result = state.travel.unwrap();
        assert!(result.routes.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("Home -> Office")));
    }
}
