//! Plan entity model.
//!
//! # Responsibility
//! - Define the goal -> sub-goal -> task hierarchy persisted per session.
//! - Own identifier generation for sub-goals and tasks.
//!
//! # Invariants
//! - Task ids are unique among siblings; sub-goal ids are unique in a plan
//!   as long as ids come from `new_entity_id`.
//! - Sequence order is insertion order and is semantically meaningful.
//! - Wire field names are stable (`goalTitle`, `subgoals`, `tasks`, `done`).
//!
//! # See also
//! - DESIGN.md (entity model)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a sub-goal or task.
///
/// Kept as a string so externally persisted ids of any shape survive
/// hydration untouched.
pub type EntityId = String;

/// Generates a collision-resistant identifier for a new sub-goal or task.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Atomic unit of work with a two-state completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub done: bool,
}

impl Task {
    /// Creates an untitled, incomplete task with a fresh id.
    pub fn new() -> Self {
        Self::titled("")
    }

    /// Creates an incomplete task with a fresh id.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            done: false,
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// Named grouping of tasks. Owns its tasks exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgoal {
    pub id: EntityId,
    pub title: String,
    pub tasks: Vec<Task>,
}

impl Subgoal {
    /// Creates an untitled sub-goal with no tasks.
    pub fn new() -> Self {
        Self::titled("")
    }

    /// Creates a sub-goal with a fresh id and no tasks.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    /// Returns the first task carrying `task_id`.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Returns `(done, total)` task counts.
    pub fn completion(&self) -> (usize, usize) {
        let done = self.tasks.iter().filter(|task| task.done).count();
        (done, self.tasks.len())
    }
}

impl Default for Subgoal {
    fn default() -> Self {
        Self::new()
    }
}

/// Root aggregate: one goal decomposed into ordered sub-goals.
///
/// This is the unit of persistence. Exactly one plan is active per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub goal_title: String,
    pub subgoals: Vec<Subgoal>,
}

impl Plan {
    /// Returns the default plan: empty goal, one blank sub-goal holding one
    /// blank task. Every call generates fresh ids.
    pub fn new_default() -> Self {
        Self {
            goal_title: String::new(),
            subgoals: default_subgoals(),
        }
    }

    /// Returns whether the plan has the default shape, ignoring ids.
    pub fn has_default_shape(&self) -> bool {
        if !self.goal_title.is_empty() || self.subgoals.len() != 1 {
            return false;
        }
        let subgoal = &self.subgoals[0];
        subgoal.title.is_empty()
            && subgoal.tasks.len() == 1
            && subgoal.tasks[0].title.is_empty()
            && !subgoal.tasks[0].done
    }

    /// Returns the first sub-goal carrying `subgoal_id`.
    pub fn subgoal(&self, subgoal_id: &str) -> Option<&Subgoal> {
        self.subgoals
            .iter()
            .find(|subgoal| subgoal.id == subgoal_id)
    }

    /// Iterates every task in sub-goal order, then task order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.subgoals.iter().flat_map(|subgoal| subgoal.tasks.iter())
    }

    /// Total number of tasks across all sub-goals.
    pub fn task_count(&self) -> usize {
        self.subgoals.iter().map(|subgoal| subgoal.tasks.len()).sum()
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new_default()
    }
}

/// Sub-goal sequence of the default plan.
pub(crate) fn default_subgoals() -> Vec<Subgoal> {
    let mut subgoal = Subgoal::new();
    subgoal.tasks.push(Task::new());
    vec![subgoal]
}
