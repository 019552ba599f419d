//! Execution-facing task and statistics shapes.
//!
//! These are derived values: they are computed from a plan (or read from a
//! task repository) and never written back into the plan.

use serde::{Deserialize, Serialize};

/// Effort units planned for every task under the current policy.
pub const PLANNED_EFFORT_PER_TASK: u32 = 1;

/// Streak value reported until a real streak signal is wired in.
pub const PLACEHOLDER_STREAK_DAYS: u32 = 1;

/// One task as seen by the execution (focus) view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTask {
    /// Same id as the plan task it was derived from.
    pub id: String,
    pub title: String,
    pub planned_effort: u32,
    pub completed_effort: u32,
    pub completed: bool,
}

impl ExecutionTask {
    /// Effort units still open; negative once the task is over-delivered.
    pub fn remaining_effort(&self) -> i64 {
        i64::from(self.planned_effort) - i64::from(self.completed_effort)
    }
}

/// Aggregates shown in the "today" panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub completed_count: u32,
    /// Completed effort over planned effort, in `0.0..=1.0` for
    /// plan-derived stats. Zero when nothing is planned.
    pub effort_rate: f64,
    /// External signal; not derived from the plan.
    pub streak_days: u32,
}

impl TodayStats {
    /// Effort rate rounded to a whole percentage for display.
    pub fn effort_percent(&self) -> u32 {
        (self.effort_rate * 100.0).round().clamp(0.0, f64::from(u32::MAX)) as u32
    }
}

/// Completion of one sub-goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgoalProgress {
    pub subgoal_id: String,
    pub done: u32,
    pub total: u32,
    /// `done / total`, zero for an empty sub-goal.
    pub rate: f64,
}
