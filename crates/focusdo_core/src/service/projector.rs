//! Plan -> execution view projection.
//!
//! # Responsibility
//! - Flatten the plan into execution tasks.
//! - Pick the next task and aggregate today's statistics.
//!
//! # Invariants
//! - Every function here is pure: same plan in, same output out.
//! - Selection is stable: the first incomplete task in plan order wins.

use crate::model::execution::{
    ExecutionTask, SubgoalProgress, TodayStats, PLANNED_EFFORT_PER_TASK,
};
use crate::model::plan::{Plan, Task};

/// Flattens every plan task, sub-goal order first, then task order.
pub fn flatten(plan: &Plan) -> Vec<ExecutionTask> {
    plan.tasks().map(to_execution_task).collect()
}

/// Returns the first incomplete task in original order.
pub fn select_next(tasks: &[ExecutionTask]) -> Option<&ExecutionTask> {
    tasks.iter().find(|task| !task.completed)
}

/// Aggregates completion count and effort rate.
///
/// `streak_days` is passed through untouched.
pub fn today_stats(tasks: &[ExecutionTask], streak_days: u32) -> TodayStats {
    let planned: u64 = tasks.iter().map(|task| u64::from(task.planned_effort)).sum();
    let completed: u64 = tasks
        .iter()
        .map(|task| u64::from(task.completed_effort))
        .sum();
    let completed_count = tasks.iter().filter(|task| task.completed).count();

    TodayStats {
        completed_count: u32::try_from(completed_count).unwrap_or(u32::MAX),
        effort_rate: ratio(completed, planned),
        streak_days,
    }
}

/// Per sub-goal completion, in plan order.
pub fn subgoal_progress(plan: &Plan) -> Vec<SubgoalProgress> {
    plan.subgoals
        .iter()
        .map(|subgoal| {
            let (done, total) = subgoal.completion();
            SubgoalProgress {
                subgoal_id: subgoal.id.clone(),
                done: u32::try_from(done).unwrap_or(u32::MAX),
                total: u32::try_from(total).unwrap_or(u32::MAX),
                rate: ratio(done as u64, total as u64),
            }
        })
        .collect()
}

fn to_execution_task(task: &Task) -> ExecutionTask {
    ExecutionTask {
        id: task.id.clone(),
        title: task.title.clone(),
        planned_effort: PLANNED_EFFORT_PER_TASK,
        completed_effort: if task.done {
            PLANNED_EFFORT_PER_TASK
        } else {
            0
        },
        completed: task.done,
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}
