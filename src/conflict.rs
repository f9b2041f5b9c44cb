//! Deterministic conflict detection over meetings and task deadlines.
//!
//! Flags every meeting/task pair whose time distance falls under a
//! configurable threshold. The rule deliberately captures "too close to
//! safely act" situations as well as literal overlaps; the threshold is a
//! safety margin, not an interval-intersection test.

use crate::timeparse::{delta_seconds, parse_time};
use crate::types::{Conflict, ConflictKind, ConflictOutcome, Meeting, Severity, TaskItem};

/// Default flagging threshold: within one hour.
pub const DEFAULT_THRESHOLD_SECS: i64 = 3600;

/// Pairs closer than this are High severity.
pub const HIGH_SEVERITY_SECS: i64 = 900;

/// Rule-based interval-proximity detector.
///
/// O(meetings x tasks); both collections are single-day, single-user sized,
/// so no interval tree is warranted.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    threshold_secs: i64,
    high_secs: i64,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self {
            threshold_secs: DEFAULT_THRESHOLD_SECS,
            high_secs: HIGH_SEVERITY_SECS,
        }
    }
}

/// Detection output: the outcome plus any time-parse warnings accumulated
/// along the way. Warnings never abort detection; the offending pair is
/// skipped.
#[derive(Debug, Clone)]
pub struct Detection {
    pub outcome: ConflictOutcome,
    pub warnings: Vec<String>,
}

impl ConflictDetector {
    pub fn new(threshold_secs: i64) -> Self {
        Self {
            threshold_secs,
            ..Self::default()
        }
    }

    /// Severity for a given time distance, or `None` when the pair is not
    /// flagged. Boundaries are strict: delta < 900s is High, 900s <= delta
    /// < threshold is Medium, delta >= threshold is clean. A pair at
    /// exactly the threshold is therefore not a conflict.
    pub fn severity_for(&self, delta_secs: i64) -> Option<Severity> {
        if delta_secs >= self.threshold_secs {
            None
        } else if delta_secs < self.high_secs {
            Some(Severity::High)
        } else {
            Some(Severity::Medium)
        }
    }

    /// Check every meeting against every task deadline.
    pub fn detect(&self, meetings: &[Meeting], tasks: &[TaskItem]) -> Detection {
        let mut conflicts = Vec::new();
        let mut warnings = Vec::new();

        for meeting in meetings {
            // Interval meetings conflict from their start time.
            let meeting_time = match parse_time(&meeting.time) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("conflict: skipping meeting '{}': {}", meeting.title, e);
                    warnings.push(format!("Meeting '{}': {}", meeting.title, e));
                    continue;
                }
            };

            for task in tasks {
                let deadline = match parse_time(&task.deadline) {
                    Ok(t) => t,
                    Err(e) => {
                        let warning = format!("Task '{}': {}", task.title, e);
                        if !warnings.contains(&warning) {
                            log::warn!("conflict: skipping task '{}': {}", task.title, e);
                            warnings.push(warning);
                        }
                        continue;
                    }
                };

                let delta = delta_seconds(&deadline, &meeting_time);
                let Some(severity) = self.severity_for(delta) else {
                    continue;
                };

                conflicts.push(Conflict {
                    kind: ConflictKind::TimeOverlap,
                    severity,
                    description: format!(
                        "Conflict between '{}' and task '{}'",
                        meeting.title, task.title
                    ),
                    entities: vec![meeting.title.clone(), task.title.clone()],
                });
            }
        }

        let outcome = if conflicts.is_empty() {
            ConflictOutcome::NoConflicts
        } else {
            ConflictOutcome::Found(conflicts)
        };

        Detection { outcome, warnings }
    }
}
