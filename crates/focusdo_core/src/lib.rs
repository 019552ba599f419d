//! Core planning logic for FocusDo.
//! This crate is the single source of truth for plan invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::action::{reduce, PlanAction};
pub use model::execution::{
    ExecutionTask, SubgoalProgress, TodayStats, PLACEHOLDER_STREAK_DAYS, PLANNED_EFFORT_PER_TASK,
};
pub use model::normalize::{
    decode_plan, normalize, normalize_str, normalize_with_report, NormalizeReport,
};
pub use model::plan::{new_entity_id, EntityId, Plan, Subgoal, Task};
pub use repo::execution_repo::{ExecutionTaskRepository, SqliteExecutionSource};
pub use repo::{RepoError, RepoResult};
pub use service::execution_source::{
    ExecutionSource, InMemoryExecutionSource, PlanExecutionSource, SourceError, SourceResult,
};
pub use service::execution_view::{load_execution_view, ExecutionPage, ExecutionView};
pub use service::plan_store::{encode_plan, HydrationSource, PlanStore};
pub use service::projector::{flatten, select_next, subgoal_progress, today_stats};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageKey,
    StorageResult, UnavailableKeyValueStore, PLAN_STORAGE_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
