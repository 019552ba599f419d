//! Plan mutation intents and their reducer.
//!
//! # Responsibility
//! - Enumerate every mutation the plan supports.
//! - Apply one intent to an owned plan, moving untouched parts unchanged.
//!
//! # Invariants
//! - Reduction is total: unknown ids leave the plan unchanged.
//! - Ids of new entries travel inside the intent; the plan store mints
//!   them, presentation code never does.
//! - Matching follows id equality, so every entry sharing a duplicated id
//!   is affected alike.

use crate::model::plan::{EntityId, Plan, Subgoal, Task};

/// One user intent against the active plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    SetGoalTitle {
        title: String,
    },
    /// Appends a sub-goal. `title` is stored as-is (empty for the plain
    /// "add sub-goal" intent).
    AddSubgoal {
        id: EntityId,
        title: String,
    },
    UpdateSubgoalTitle {
        subgoal_id: EntityId,
        title: String,
    },
    RemoveSubgoal {
        subgoal_id: EntityId,
    },
    /// Appends a task to the named sub-goal.
    AddTask {
        subgoal_id: EntityId,
        task: Task,
    },
    UpdateTaskTitle {
        subgoal_id: EntityId,
        task_id: EntityId,
        title: String,
    },
    ToggleTaskDone {
        subgoal_id: EntityId,
        task_id: EntityId,
    },
    RemoveTask {
        subgoal_id: EntityId,
        task_id: EntityId,
    },
    /// Replaces the whole plan (reset or import).
    Replace {
        plan: Plan,
    },
}

impl PlanAction {
    /// Stable event name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetGoalTitle { .. } => "set_goal_title",
            Self::AddSubgoal { .. } => "add_subgoal",
            Self::UpdateSubgoalTitle { .. } => "update_subgoal_title",
            Self::RemoveSubgoal { .. } => "remove_subgoal",
            Self::AddTask { .. } => "add_task",
            Self::UpdateTaskTitle { .. } => "update_task_title",
            Self::ToggleTaskDone { .. } => "toggle_task_done",
            Self::RemoveTask { .. } => "remove_task",
            Self::Replace { .. } => "replace",
        }
    }
}

/// Reduces `plan` by `action` and returns the next plan.
///
/// `plan` is consumed: only the sub-goal and task on the path to the change
/// are rewritten, everything else is moved into the result.
pub fn reduce(mut plan: Plan, action: PlanAction) -> Plan {
    apply(&mut plan, action);
    plan
}

/// Applies `action` in place. Returns whether the plan changed.
pub fn apply(plan: &mut Plan, action: PlanAction) -> bool {
    match action {
        PlanAction::SetGoalTitle { title } => {
            if plan.goal_title == title {
                return false;
            }
            plan.goal_title = title;
            true
        }
        PlanAction::AddSubgoal { id, title } => {
            plan.subgoals.push(Subgoal {
                id,
                title,
                tasks: Vec::new(),
            });
            true
        }
        PlanAction::UpdateSubgoalTitle { subgoal_id, title } => {
            let mut changed = false;
            for subgoal in subgoals_mut(plan, &subgoal_id) {
                if subgoal.title != title {
                    subgoal.title.clone_from(&title);
                    changed = true;
                }
            }
            changed
        }
        PlanAction::RemoveSubgoal { subgoal_id } => {
            let before = plan.subgoals.len();
            plan.subgoals.retain(|subgoal| subgoal.id != subgoal_id);
            plan.subgoals.len() != before
        }
        PlanAction::AddTask { subgoal_id, task } => {
            let mut changed = false;
            for subgoal in subgoals_mut(plan, &subgoal_id) {
                subgoal.tasks.push(task.clone());
                changed = true;
            }
            changed
        }
        PlanAction::UpdateTaskTitle {
            subgoal_id,
            task_id,
            title,
        } => {
            let mut changed = false;
            for task in tasks_mut(plan, &subgoal_id, &task_id) {
                if task.title != title {
                    task.title.clone_from(&title);
                    changed = true;
                }
            }
            changed
        }
        PlanAction::ToggleTaskDone {
            subgoal_id,
            task_id,
        } => {
            let mut changed = false;
            for task in tasks_mut(plan, &subgoal_id, &task_id) {
                task.done = !task.done;
                changed = true;
            }
            changed
        }
        PlanAction::RemoveTask {
            subgoal_id,
            task_id,
        } => {
            let mut changed = false;
            for subgoal in subgoals_mut(plan, &subgoal_id) {
                let before = subgoal.tasks.len();
                subgoal.tasks.retain(|task| task.id != task_id);
                changed |= subgoal.tasks.len() != before;
            }
            changed
        }
        PlanAction::Replace { plan: next } => {
            *plan = next;
            true
        }
    }
}

fn subgoals_mut<'a>(
    plan: &'a mut Plan,
    subgoal_id: &'a str,
) -> impl Iterator<Item = &'a mut Subgoal> + 'a {
    plan.subgoals
        .iter_mut()
        .filter(move |subgoal| subgoal.id == subgoal_id)
}

fn tasks_mut<'a>(
    plan: &'a mut Plan,
    subgoal_id: &'a str,
    task_id: &'a str,
) -> impl Iterator<Item = &'a mut Task> + 'a {
    subgoals_mut(plan, subgoal_id)
        .flat_map(|subgoal| subgoal.tasks.iter_mut())
        .filter(move |task| task.id == task_id)
}
