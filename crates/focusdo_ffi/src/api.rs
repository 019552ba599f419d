//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the plan session and execution view to Dart via FRB.
//! - Flatten core types into plain DTOs with stable field meaning.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One `PlanSession` owns one hydrated store; callers pass the handle
//!   explicitly, there is no process-global plan.

use focusdo_core::db::open_db;
use focusdo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    load_execution_view, ping as ping_inner, ExecutionTask, ExecutionView, HydrationSource,
    KeyValueStore, MemoryKeyValueStore, Plan, PlanStore, SqliteKeyValueStore, StorageResult,
    TodayStats,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const PLAN_DB_FILE_NAME: &str = "focusdo_plan.sqlite3";
const PLAN_DB_PATH_ENV: &str = "FOCUSDO_DB_PATH";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path for rolling logs.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task row in a plan snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub done: bool,
}

/// Sub-goal card in a plan snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgoalItem {
    pub id: String,
    pub title: String,
    pub tasks: Vec<TaskItem>,
}

/// Full plan snapshot returned after every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSnapshot {
    pub goal_title: String,
    pub subgoals: Vec<SubgoalItem>,
    /// Whether the latest write reached storage.
    pub persisted: bool,
}

/// Focus view task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTaskItem {
    pub id: String,
    pub title: String,
    pub planned_effort: u32,
    pub completed_effort: u32,
    pub completed: bool,
}

/// Focus view load state.
///
/// `status` is one of `loading|ready|error`.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusViewResponse {
    pub status: String,
    pub task: Option<FocusTaskItem>,
    pub completed_count: u32,
    /// Whole percentage, `0..=100`.
    pub effort_percent: u32,
    pub streak_days: u32,
    pub message: String,
}

/// Storage behind a plan session: the plan database when it opens, memory
/// otherwise.
enum SessionStorage {
    Sqlite(SqliteKeyValueStore),
    Memory(MemoryKeyValueStore),
}

impl KeyValueStore for SessionStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self {
            Self::Sqlite(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        match self {
            Self::Sqlite(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }
}

/// One hydrated plan session.
#[flutter_rust_bridge::frb(opaque)]
pub struct PlanSession {
    store: Mutex<PlanStore<SessionStorage>>,
    db_path: Option<PathBuf>,
}

impl PlanSession {
    /// Opens the plan database and hydrates the session.
    ///
    /// # FFI contract
    /// - `db_path`: optional override; otherwise `FOCUSDO_DB_PATH`, then a
    ///   file in the temp directory.
    /// - Never fails: when the database cannot be opened the session runs in
    ///   memory only, and `storage_path()` returns `None`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open(db_path: Option<String>) -> PlanSession {
        let path = resolve_plan_db_path(db_path);
        let opened = open_db(&path)
            .map_err(|err| err.to_string())
            .and_then(|conn| SqliteKeyValueStore::try_new(conn).map_err(|err| err.to_string()));

        let (storage, db_path) = match opened {
            Ok(store) => (SessionStorage::Sqlite(store), Some(path)),
            Err(err) => {
                warn!("event=plan_session_open module=ffi status=degraded error={err}");
                (SessionStorage::Memory(MemoryKeyValueStore::new()), None)
            }
        };

        PlanSession {
            store: Mutex::new(PlanStore::new(storage)),
            db_path,
        }
    }

    /// Opens a session that never touches disk.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open_in_memory() -> PlanSession {
        PlanSession {
            store: Mutex::new(PlanStore::new(SessionStorage::Memory(
                MemoryKeyValueStore::new(),
            ))),
            db_path: None,
        }
    }

    /// Database file backing this session, if any.
    #[flutter_rust_bridge::frb(sync)]
    pub fn storage_path(&self) -> Option<String> {
        self.db_path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
    }

    /// `stored|missing|read_failed|parse_failed`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn hydration(&self) -> String {
        let label = match self.lock().hydration() {
            HydrationSource::Stored => "stored",
            HydrationSource::Missing => "missing",
            HydrationSource::ReadFailed => "read_failed",
            HydrationSource::ParseFailed => "parse_failed",
        };
        label.to_string()
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn snapshot(&self) -> PlanSnapshot {
        let store = self.lock();
        to_snapshot(store.plan(), store.last_persist_ok())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_goal_title(&self, title: String) -> PlanSnapshot {
        self.mutate(|store| {
            store.set_goal_title(title);
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn add_subgoal(&self) -> PlanSnapshot {
        self.mutate(|store| {
            store.add_subgoal();
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn update_subgoal_title(&self, subgoal_id: String, title: String) -> PlanSnapshot {
        self.mutate(|store| {
            store.update_subgoal_title(&subgoal_id, title);
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn remove_subgoal(&self, subgoal_id: String) -> PlanSnapshot {
        self.mutate(|store| {
            store.remove_subgoal(&subgoal_id);
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn add_task(&self, subgoal_id: String) -> PlanSnapshot {
        self.mutate(|store| {
            store.add_task(&subgoal_id);
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn update_task_title(
        &self,
        subgoal_id: String,
        task_id: String,
        title: String,
    ) -> PlanSnapshot {
        self.mutate(|store| {
            store.update_task_title(&subgoal_id, &task_id, title);
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn toggle_task_done(&self, subgoal_id: String, task_id: String) -> PlanSnapshot {
        self.mutate(|store| {
            store.toggle_task_done(&subgoal_id, &task_id);
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn remove_task(&self, subgoal_id: String, task_id: String) -> PlanSnapshot {
        self.mutate(|store| {
            store.remove_task(&subgoal_id, &task_id);
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn clear_all(&self) -> PlanSnapshot {
        self.mutate(|store| {
            store.clear_all();
        })
    }

    /// Loads the focus view from the current plan.
    ///
    /// Plan-derived loads cannot fail; the `error` status is still mapped
    /// so the Dart side handles every source uniformly.
    #[flutter_rust_bridge::frb(sync)]
    pub fn focus_view(&self) -> FocusViewResponse {
        let store = self.lock();
        let source = store.execution_source();
        to_focus_response(load_execution_view(&source))
    }

    fn mutate(&self, f: impl FnOnce(&mut PlanStore<SessionStorage>)) -> PlanSnapshot {
        let mut store = self.lock();
        f(&mut store);
        to_snapshot(store.plan(), store.last_persist_ok())
    }

    fn lock(&self) -> MutexGuard<'_, PlanStore<SessionStorage>> {
        // A panic mid-mutation leaves a complete plan value behind, so the
        // poisoned guard is still usable.
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn resolve_plan_db_path(explicit: Option<String>) -> PathBuf {
    let configured = explicit.or_else(|| std::env::var(PLAN_DB_PATH_ENV).ok());
    match configured {
        Some(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => std::env::temp_dir().join(PLAN_DB_FILE_NAME),
    }
}

fn to_snapshot(plan: &Plan, persisted: bool) -> PlanSnapshot {
    PlanSnapshot {
        goal_title: plan.goal_title.clone(),
        subgoals: plan
            .subgoals
            .iter()
            .map(|subgoal| SubgoalItem {
                id: subgoal.id.clone(),
                title: subgoal.title.clone(),
                tasks: subgoal
                    .tasks
                    .iter()
                    .map(|task| TaskItem {
                        id: task.id.clone(),
                        title: task.title.clone(),
                        done: task.done,
                    })
                    .collect(),
            })
            .collect(),
        persisted,
    }
}

fn to_focus_response(view: ExecutionView) -> FocusViewResponse {
    match view {
        ExecutionView::Loading => FocusViewResponse {
            status: "loading".to_string(),
            task: None,
            completed_count: 0,
            effort_percent: 0,
            streak_days: 0,
            message: String::new(),
        },
        ExecutionView::Ready { task, stats } => ready_response(task, stats),
        ExecutionView::Error { message } => FocusViewResponse {
            status: "error".to_string(),
            task: None,
            completed_count: 0,
            effort_percent: 0,
            streak_days: 0,
            message,
        },
    }
}

fn ready_response(task: Option<ExecutionTask>, stats: TodayStats) -> FocusViewResponse {
    let message = if task.is_some() {
        String::new()
    } else {
        "All tasks done.".to_string()
    };
    FocusViewResponse {
        status: "ready".to_string(),
        task: task.map(|task| FocusTaskItem {
            id: task.id,
            title: task.title,
            planned_effort: task.planned_effort,
            completed_effort: task.completed_effort,
            completed: task.completed,
        }),
        completed_count: stats.completed_count,
        effort_percent: stats.effort_percent(),
        streak_days: stats.streak_days,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, init_logging, ping, PlanSession};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_invalid_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/focusdo".to_string()).is_empty());
    }

    #[test]
    fn session_mutations_return_updated_snapshots() {
        let session = PlanSession::open_in_memory();
        let initial = session.snapshot();
        assert_eq!(initial.subgoals.len(), 1);

        let snapshot = session.add_subgoal();
        let subgoal_id = snapshot.subgoals[1].id.clone();
        let snapshot = session.add_task(subgoal_id.clone());
        let task_id = snapshot.subgoals[1].tasks[0].id.clone();
        session.update_task_title(subgoal_id.clone(), task_id.clone(), "Write report".to_string());
        let snapshot = session.toggle_task_done(subgoal_id, task_id);

        assert!(snapshot.persisted);
        assert_eq!(snapshot.subgoals[1].tasks[0].title, "Write report");
        assert!(snapshot.subgoals[1].tasks[0].done);
    }

    #[test]
    fn focus_view_reports_next_task_and_stats() {
        let session = PlanSession::open_in_memory();
        let snapshot = session.snapshot();
        let subgoal_id = snapshot.subgoals[0].id.clone();
        let first_task = snapshot.subgoals[0].tasks[0].id.clone();
        session.add_task(subgoal_id.clone());
        session.toggle_task_done(subgoal_id, first_task);

        let view = session.focus_view();
        assert_eq!(view.status, "ready");
        assert_eq!(view.completed_count, 1);
        assert_eq!(view.effort_percent, 50);
        assert!(view.task.is_some());
    }

    #[test]
    fn file_session_rehydrates_after_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("plan.sqlite3");
        let path_str = path.to_str().expect("utf-8 path").to_string();

        let session = PlanSession::open(Some(path_str.clone()));
        assert_eq!(session.storage_path().as_deref(), Some(path_str.as_str()));
        assert_eq!(session.hydration(), "missing");
        session.set_goal_title("Stay focused".to_string());
        drop(session);

        let reopened = PlanSession::open(Some(path_str));
        assert_eq!(reopened.hydration(), "stored");
        assert_eq!(reopened.snapshot().goal_title, "Stay focused");
    }

    #[test]
    fn unopenable_database_degrades_to_memory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let session = PlanSession::open(Some(dir.path().to_string_lossy().into_owned()));
        assert_eq!(session.storage_path(), None);
        assert!(session.add_subgoal().persisted);
    }
}
