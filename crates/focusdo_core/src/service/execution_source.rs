//! Swappable data sources for the execution view.
//!
//! # Responsibility
//! - Define the two-query contract the execution view depends on.
//! - Provide the plan-derived source and a seeded in-memory source.
//!
//! # Invariants
//! - The execution view never inspects which source it was composed with.
//! - Plan-derived queries never fail.
//!
//! # See also
//! - `repo::execution_repo` for the database-backed source.

use crate::model::execution::{ExecutionTask, TodayStats, PLACEHOLDER_STREAK_DAYS};
use crate::model::plan::Plan;
use crate::repo::RepoError;
use crate::service::projector::{flatten, select_next, today_stats};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SourceResult<T> = Result<T, SourceError>;

/// Failure of an execution data source query.
#[derive(Debug)]
pub enum SourceError {
    /// The backing repository failed.
    Repo(RepoError),
    /// The source cannot answer right now (offline remote, closed handle).
    Unavailable(String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Unavailable(reason) => write!(f, "execution source unavailable: {reason}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<RepoError> for SourceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Query contract of the execution view.
pub trait ExecutionSource {
    /// Task to work on now, `None` when nothing is left.
    fn next_task(&self) -> SourceResult<Option<ExecutionTask>>;
    /// Today's aggregate statistics.
    fn today_stats(&self) -> SourceResult<TodayStats>;
}

impl<S: ExecutionSource + ?Sized> ExecutionSource for &S {
    fn next_task(&self) -> SourceResult<Option<ExecutionTask>> {
        (**self).next_task()
    }

    fn today_stats(&self) -> SourceResult<TodayStats> {
        (**self).today_stats()
    }
}

/// Source derived from a plan snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PlanExecutionSource<'plan> {
    plan: &'plan Plan,
    streak_days: u32,
}

impl<'plan> PlanExecutionSource<'plan> {
    pub fn new(plan: &'plan Plan) -> Self {
        Self {
            plan,
            streak_days: PLACEHOLDER_STREAK_DAYS,
        }
    }

    /// Overrides the externally supplied streak value.
    pub fn with_streak_days(mut self, streak_days: u32) -> Self {
        self.streak_days = streak_days;
        self
    }

    /// Flattened execution tasks of the underlying plan.
    pub fn tasks(&self) -> Vec<ExecutionTask> {
        flatten(self.plan)
    }
}

impl ExecutionSource for PlanExecutionSource<'_> {
    fn next_task(&self) -> SourceResult<Option<ExecutionTask>> {
        let tasks = self.tasks();
        Ok(select_next(&tasks).cloned())
    }

    fn today_stats(&self) -> SourceResult<TodayStats> {
        Ok(today_stats(&self.tasks(), self.streak_days))
    }
}

/// Seeded, non-persistent source used during development and in tests.
///
/// Unlike the plan-derived source it prioritises: the incomplete task with
/// the most remaining effort is returned, ties keep seed order.
#[derive(Debug, Clone)]
pub struct InMemoryExecutionSource {
    tasks: Vec<ExecutionTask>,
    streak_days: u32,
    offline: bool,
}

impl InMemoryExecutionSource {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            streak_days: PLACEHOLDER_STREAK_DAYS,
            offline: false,
        }
    }

    /// Replaces the task list.
    pub fn seed(&mut self, tasks: Vec<ExecutionTask>) {
        self.tasks = tasks;
    }

    pub fn set_streak_days(&mut self, streak_days: u32) {
        self.streak_days = streak_days;
    }

    /// While offline every query fails with `SourceError::Unavailable`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn ensure_online(&self) -> SourceResult<()> {
        if self.offline {
            return Err(SourceError::Unavailable("in-memory source offline".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryExecutionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSource for InMemoryExecutionSource {
    fn next_task(&self) -> SourceResult<Option<ExecutionTask>> {
        self.ensure_online()?;
        let mut pending = self
            .tasks
            .iter()
            .filter(|task| !task.completed)
            .collect::<Vec<_>>();
        // sort_by is stable, so equal remaining effort keeps seed order.
        pending.sort_by(|a, b| b.remaining_effort().cmp(&a.remaining_effort()));
        Ok(pending.first().map(|task| (*task).clone()))
    }

    fn today_stats(&self) -> SourceResult<TodayStats> {
        self.ensure_online()?;
        Ok(today_stats(&self.tasks, self.streak_days))
    }
}
