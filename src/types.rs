//! Core data model: the schedule state record and the typed results each
//! pipeline stage writes into it.
//!
//! One `ScheduleState` is owned exclusively by one pipeline run. Every
//! result slot starts empty and is written at most once, by exactly one
//! stage, in pipeline order. The fixed stage ordering (engine.rs) is what
//! guarantees a stage never reads a slot that hasn't been written yet.

use serde::{Deserialize, Serialize};

/// How a pipeline run sources its schedule data. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Caller supplies meetings and tasks directly.
    Manual,
    /// Fetch stages populate meetings and tasks from linked services.
    Live,
}

/// Location markers that mean "no travel required".
const VIRTUAL_MARKERS: &[&str] = &[
    "",
    "no location",
    "virtual",
    "online",
    "zoom",
    "google meet",
    "teams",
];

/// A single calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub title: String,
    /// Point or interval start, as a raw string ("10:00 AM", "2026-01-30 09:00").
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Meeting {
    pub fn new(title: &str, time: &str, location: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            time: time.to_string(),
            end_time: None,
            location: location.map(str::to_string),
        }
    }

    /// A meeting needs travel only when it has a physical location.
    pub fn requires_travel(&self) -> bool {
        match &self.location {
            None => false,
            Some(loc) => !VIRTUAL_MARKERS.contains(&loc.trim().to_lowercase().as_str()),
        }
    }
}

/// A to-do item with a deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub title: String,
    pub deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl TaskItem {
    pub fn new(title: &str, deadline: &str) -> Self {
        Self {
            title: title.to_string(),
            deadline: deadline.to_string(),
            priority: None,
        }
    }
}

// ============================================================================
// Conflicts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    TimeOverlap,
    Capacity,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// One detected scheduling conflict. Derived, never persisted; recomputed
/// each run from meetings + tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub description: String,
    /// Titles of the entities involved (meeting and task).
    pub entities: Vec<String>,
}

/// Canonical sentinel text rendered for a clean schedule. Downstream
/// consumers display this; internal branching uses the enum variant.
pub const NO_CONFLICTS_SENTINEL: &str = "No conflicts detected.";

/// Conflict detection outcome.
///
/// `NoConflicts` is a distinguished case, not an empty list: the planning
/// stage branches on this variant to produce its "schedule looks good"
/// response. It is never combined with conflict entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "conflicts", rename_all = "snake_case")]
pub enum ConflictOutcome {
    NoConflicts,
    Found(Vec<Conflict>),
}

impl ConflictOutcome {
    pub fn is_clear(&self) -> bool {
        matches!(self, ConflictOutcome::NoConflicts)
    }

    pub fn count(&self) -> usize {
        match self {
            ConflictOutcome::NoConflicts => 0,
            ConflictOutcome::Found(list) => list.len(),
        }
    }
}

// ============================================================================
// External fetch records
// ============================================================================

/// A route between two meeting locations, as returned by the directions
/// source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub origin: String,
    pub destination: String,
    pub duration_seconds: u64,
    pub distance_text: String,
    #[serde(default)]
    pub summary: String,
}

/// A lightweight inbox entry from the email source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub subject: String,
    pub from: String,
    pub is_unread: bool,
}

/// A contact record from the contacts source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

// ============================================================================
// Stage results
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResult {
    pub summary: String,
    pub total_events: usize,
    #[serde(default)]
    pub busy_periods: Vec<String>,
    #[serde(default)]
    pub free_slots: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub attendees_summary: String,
    /// Input echoed back for downstream stages.
    #[serde(default)]
    pub raw_events: Vec<Meeting>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysisResult {
    pub summary: String,
    pub total_tasks: usize,
    #[serde(default)]
    pub overdue_tasks: Vec<String>,
    #[serde(default)]
    pub today_tasks: Vec<String>,
    #[serde(default)]
    pub upcoming_tasks: Vec<String>,
    #[serde(default)]
    pub urgent_tasks: Vec<String>,
    #[serde(default)]
    pub priority_order: Vec<String>,
    #[serde(default)]
    pub workload_assessment: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Input echoed back for downstream stages.
    #[serde(default)]
    pub raw_tasks: Vec<TaskItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One leg of a travel plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelLeg {
    pub meeting: String,
    pub location: String,
    pub meeting_time: String,
    pub recommended_departure: String,
    pub travel_duration: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelResult {
    pub summary: String,
    pub total_travel_time: String,
    #[serde(default)]
    pub legs: Vec<TravelLeg>,
    #[serde(default)]
    pub routes: Vec<RouteInfo>,
    #[serde(default)]
    pub departure_times: Vec<String>,
    #[serde(default)]
    pub optimization_tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResult {
    pub summary: String,
    pub total_emails: usize,
    pub unread_count: usize,
    #[serde(default)]
    pub urgent_emails: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsResult {
    pub summary: String,
    #[serde(default)]
    pub meeting_contacts: Vec<String>,
    #[serde(default)]
    pub vip_contacts: Vec<String>,
    #[serde(default)]
    pub missing_info: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsResult {
    pub summary: String,
    #[serde(default)]
    pub data_insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesResult {
    pub summary: String,
    #[serde(default)]
    pub meeting_prep_notes: Vec<String>,
    #[serde(default)]
    pub follow_up_reminders: Vec<String>,
    #[serde(default)]
    pub key_notes: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResult {
    pub outcome: ConflictOutcome,
    pub conflict_count: usize,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub summary: String,
    #[serde(default)]
    pub schedule_blocks: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

// ============================================================================
// Pipeline state
// ============================================================================

/// The mutable record threaded through one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    pub mode: Mode,
    pub meetings: Vec<Meeting>,
    pub tasks: Vec<TaskItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_analysis: Option<TaskAnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel: Option<TravelResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<ContactsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets: Option<SheetsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<NotesResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<ConflictResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
}

impl ScheduleState {
    pub fn manual(meetings: Vec<Meeting>, tasks: Vec<TaskItem>) -> Self {
        Self::new(Mode::Manual, meetings, tasks)
    }

    pub fn live() -> Self {
        Self::new(Mode::Live, Vec::new(), Vec::new())
    }

    fn new(mode: Mode, meetings: Vec<Meeting>, tasks: Vec<TaskItem>) -> Self {
        Self {
            mode,
            meetings,
            tasks,
            calendar: None,
            task_analysis: None,
            travel: None,
            email: None,
            contacts: None,
            sheets: None,
            notes: None,
            conflicts: None,
            plan: None,
            final_response: None,
        }
    }

    /// The meetings downstream stages should work with: in Live mode the
    /// calendar fetch stage is authoritative, in Manual mode the caller is.
    pub fn effective_meetings(&self) -> &[Meeting] {
        match (&self.mode, &self.calendar) {
            (Mode::Live, Some(cal)) => &cal.raw_events,
            _ => &self.meetings,
        }
    }

    /// Same duality for tasks.
    pub fn effective_tasks(&self) -> &[TaskItem] {
        match (&self.mode, &self.task_analysis) {
            (Mode::Live, Some(ta)) => &ta.raw_tasks,
            _ => &self.tasks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_travel() {
        assert!(Meeting::new("QBR", "10:00 AM", Some("Office")).requires_travel());
        assert!(!Meeting::new("Standup", "9:00 AM", None).requires_travel());
        assert!(!Meeting::new("1:1", "9:00 AM", Some("Zoom")).requires_travel());
        assert!(!Meeting::new("Sync", "9:00 AM", Some("google meet")).requires_travel());
        assert!(!Meeting::new("Sync", "9:00 AM", Some("No location")).requires_travel());
        assert!(!Meeting::new("Sync", "9:00 AM", Some("  ")).requires_travel());
    }

    #[test]
    fn test_conflict_outcome_sentinel_is_distinct_from_empty_list() {
        let clear = ConflictOutcome::NoConflicts;
        let empty = ConflictOutcome::Found(vec![]);
        assert_ne!(clear, empty);
        assert!(clear.is_clear());
        assert!(!empty.is_clear());
        assert_eq!(clear.count(), 0);
    }

    #[test]
    fn test_effective_meetings_live_prefers_fetched() {
        let mut state = ScheduleState::live();
        state.calendar = Some(CalendarResult {
            raw_events: vec![Meeting::new("Fetched", "10:00 AM", None)],
            ..Default::default()
        });
        assert_eq!(state.effective_meetings()[0].title, "Fetched");
    }

    #[test]
    fn test_effective_meetings_manual_uses_input() {
        let state = ScheduleState::manual(
            vec![Meeting::new("Given", "10:00 AM", None)],
            vec![],
        );
        assert_eq!(state.effective_meetings()[0].title, "Given");
    }

    #[test]
    fn test_meeting_serde_camel_case() {
        let m = Meeting::new("Client Call", "10:00 AM", Some("Office"));
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["title"], "Client Call");
        assert_eq!(json["location"], "Office");
        // end_time omitted entirely when absent
        assert!(json.get("endTime").is_none());
    }
}
