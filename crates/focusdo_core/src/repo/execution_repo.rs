//! Database-backed execution task repository.
//!
//! # Responsibility
//! - Store execution tasks sourced from outside the local plan (a synced
//!   remote list, an import).
//! - Answer the execution view queries from that table.
//!
//! # Invariants
//! - List order is `sort_order ASC, task_id ASC`.
//! - `completed` is stored as 0/1; any other value is invalid data.

use crate::model::execution::{ExecutionTask, TodayStats, PLACEHOLDER_STREAK_DAYS};
use crate::repo::{RepoError, RepoResult};
use crate::service::execution_source::{ExecutionSource, SourceResult};
use crate::service::projector::{select_next, today_stats};
use rusqlite::{params, Connection, Row};

const EXECUTION_TASK_SELECT_SQL: &str = "SELECT
    task_id,
    title,
    planned_effort,
    completed_effort,
    completed
FROM execution_tasks";

/// Repository interface for execution task rows.
pub trait ExecutionTaskRepository {
    /// Replaces the full task list, preserving the given order.
    fn replace_all(&self, tasks: &[ExecutionTask]) -> RepoResult<()>;
    fn list_tasks(&self) -> RepoResult<Vec<ExecutionTask>>;
    /// Records completed effort for one task. Returns whether it existed.
    fn record_effort(&self, task_id: &str, completed_effort: u32) -> RepoResult<bool>;
}

/// SQLite-backed execution task repository and source.
pub struct SqliteExecutionSource<'conn> {
    conn: &'conn Connection,
    streak_days: u32,
}

impl<'conn> SqliteExecutionSource<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            streak_days: PLACEHOLDER_STREAK_DAYS,
        }
    }

    pub fn with_streak_days(mut self, streak_days: u32) -> Self {
        self.streak_days = streak_days;
        self
    }
}

impl ExecutionTaskRepository for SqliteExecutionSource<'_> {
    fn replace_all(&self, tasks: &[ExecutionTask]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM execution_tasks;", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO execution_tasks (
                    task_id,
                    title,
                    planned_effort,
                    completed_effort,
                    completed,
                    sort_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for (index, task) in tasks.iter().enumerate() {
                stmt.execute(params![
                    task.id.as_str(),
                    task.title.as_str(),
                    task.planned_effort,
                    task.completed_effort,
                    bool_to_int(task.completed),
                    index as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn list_tasks(&self) -> RepoResult<Vec<ExecutionTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EXECUTION_TASK_SELECT_SQL} ORDER BY sort_order ASC, task_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_execution_task_row(row)?);
        }
        Ok(tasks)
    }

    fn record_effort(&self, task_id: &str, completed_effort: u32) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE execution_tasks
             SET
                completed_effort = ?1,
                completed = CASE WHEN ?1 >= planned_effort THEN 1 ELSE 0 END
             WHERE task_id = ?2;",
            params![completed_effort, task_id],
        )?;
        Ok(changed > 0)
    }
}

impl ExecutionSource for SqliteExecutionSource<'_> {
    fn next_task(&self) -> SourceResult<Option<ExecutionTask>> {
        let tasks = self.list_tasks()?;
        Ok(select_next(&tasks).cloned())
    }

    fn today_stats(&self) -> SourceResult<TodayStats> {
        let tasks = self.list_tasks()?;
        Ok(today_stats(&tasks, self.streak_days))
    }
}

fn parse_execution_task_row(row: &Row<'_>) -> RepoResult<ExecutionTask> {
    let task_id: String = row.get("task_id")?;
    let planned_effort = effort_column(row, "planned_effort", &task_id)?;
    let completed_effort = effort_column(row, "completed_effort", &task_id)?;
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` for task `{task_id}`"
            )));
        }
    };

    Ok(ExecutionTask {
        title: row.get("title")?,
        id: task_id,
        planned_effort,
        completed_effort,
        completed,
    })
}

fn effort_column(row: &Row<'_>, column: &str, task_id: &str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid {column} value `{value}` for task `{task_id}`"
        ))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
