//! Plan store: the single source of truth for the active plan.
//!
//! # Responsibility
//! - Hydrate the plan once from key-value storage on construction.
//! - Apply mutation intents and persist after every one.
//! - Answer execution view queries over the current plan.
//!
//! # Invariants
//! - Every operation is total; unknown ids are silent no-ops.
//! - Storage failures are logged and swallowed. The in-memory plan stays
//!   authoritative even when the stored copy is stale.
//! - Only ids, counts and statuses are logged, never titles.

use crate::model::action::{apply, PlanAction};
use crate::model::execution::{
    ExecutionTask, SubgoalProgress, TodayStats, PLACEHOLDER_STREAK_DAYS,
};
use crate::model::normalize::{normalize_with_report, NormalizeReport};
use crate::model::plan::{new_entity_id, EntityId, Plan, Task};
use crate::service::execution_source::PlanExecutionSource;
use crate::service::projector::{flatten, select_next, subgoal_progress, today_stats};
use crate::storage::{KeyValueStore, StorageKey};
use log::{debug, error, info, warn};

/// How the current plan was obtained at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationSource {
    /// Loaded and normalized from storage.
    Stored,
    /// Nothing stored under the key yet.
    Missing,
    /// Storage could not be read.
    ReadFailed,
    /// Stored text was not valid JSON.
    ParseFailed,
}

/// Owned session state over one storage facility.
pub struct PlanStore<S: KeyValueStore> {
    storage: S,
    key: StorageKey,
    plan: Plan,
    hydration: HydrationSource,
    last_persist_ok: bool,
}

impl<S: KeyValueStore> PlanStore<S> {
    /// Hydrates a store from `storage` under the default plan key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, StorageKey::plan())
    }

    /// Hydrates a store from `storage` under `key`.
    pub fn with_key(storage: S, key: StorageKey) -> Self {
        let (plan, hydration) = hydrate(&storage, &key);
        Self {
            storage,
            key,
            plan,
            hydration,
            last_persist_ok: true,
        }
    }

    /// Current plan snapshot.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn hydration(&self) -> HydrationSource {
        self.hydration
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    /// Whether the most recent write reached storage.
    pub fn last_persist_ok(&self) -> bool {
        self.last_persist_ok
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Releases the storage facility.
    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn set_goal_title(&mut self, title: impl Into<String>) -> &Plan {
        self.dispatch(PlanAction::SetGoalTitle {
            title: title.into(),
        })
    }

    /// Appends an untitled sub-goal and returns its id.
    pub fn add_subgoal(&mut self) -> EntityId {
        let id = new_entity_id();
        self.dispatch(PlanAction::AddSubgoal {
            id: id.clone(),
            title: String::new(),
        });
        id
    }

    /// Appends a titled sub-goal. A blank title (after trim) is a no-op.
    pub fn add_subgoal_with_title(&mut self, title: &str) -> Option<EntityId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = new_entity_id();
        self.dispatch(PlanAction::AddSubgoal {
            id: id.clone(),
            title: title.to_string(),
        });
        Some(id)
    }

    pub fn update_subgoal_title(&mut self, subgoal_id: &str, title: impl Into<String>) -> &Plan {
        self.dispatch(PlanAction::UpdateSubgoalTitle {
            subgoal_id: subgoal_id.to_string(),
            title: title.into(),
        })
    }

    /// Removes the sub-goal together with all of its tasks.
    pub fn remove_subgoal(&mut self, subgoal_id: &str) -> &Plan {
        self.dispatch(PlanAction::RemoveSubgoal {
            subgoal_id: subgoal_id.to_string(),
        })
    }

    /// Appends an untitled task. Returns its id, `None` if the sub-goal is
    /// unknown (the unchanged plan is persisted either way).
    pub fn add_task(&mut self, subgoal_id: &str) -> Option<EntityId> {
        self.push_task(subgoal_id, Task::new())
    }

    /// Appends a titled task. A blank title (after trim) is a no-op.
    pub fn add_task_with_title(&mut self, subgoal_id: &str, title: &str) -> Option<EntityId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        self.push_task(subgoal_id, Task::titled(title))
    }

    pub fn update_task_title(
        &mut self,
        subgoal_id: &str,
        task_id: &str,
        title: impl Into<String>,
    ) -> &Plan {
        self.dispatch(PlanAction::UpdateTaskTitle {
            subgoal_id: subgoal_id.to_string(),
            task_id: task_id.to_string(),
            title: title.into(),
        })
    }

    pub fn toggle_task_done(&mut self, subgoal_id: &str, task_id: &str) -> &Plan {
        self.dispatch(PlanAction::ToggleTaskDone {
            subgoal_id: subgoal_id.to_string(),
            task_id: task_id.to_string(),
        })
    }

    pub fn remove_task(&mut self, subgoal_id: &str, task_id: &str) -> &Plan {
        self.dispatch(PlanAction::RemoveTask {
            subgoal_id: subgoal_id.to_string(),
            task_id: task_id.to_string(),
        })
    }

    /// Resets to a fresh default plan.
    pub fn clear_all(&mut self) -> &Plan {
        self.dispatch(PlanAction::Replace {
            plan: Plan::new_default(),
        })
    }

    /// Replaces the plan with externally supplied JSON, normalized the same
    /// way as at hydration. Invalid JSON is a no-op; returns whether the
    /// text was accepted.
    pub fn replace_plan(&mut self, raw_json: &str) -> bool {
        let value = match serde_json::from_str::<serde_json::Value>(raw_json) {
            Ok(value) => value,
            Err(err) => {
                warn!("event=plan_import module=plan_store status=error error={err}");
                return false;
            }
        };
        let (plan, report) = normalize_with_report(&value);
        log_normalize_report("plan_import", &report);
        self.dispatch(PlanAction::Replace { plan });
        true
    }

    /// JSON encoding of the current plan, as persisted.
    pub fn export_plan(&self) -> String {
        encode_plan(&self.plan)
    }

    /// Applies one intent, then persists the result.
    pub fn dispatch(&mut self, action: PlanAction) -> &Plan {
        let name = action.name();
        let changed = apply(&mut self.plan, action);
        debug!("event=plan_dispatch module=plan_store action={name} changed={changed}");
        self.persist();
        &self.plan
    }

    /// Plan-derived execution source over the current snapshot.
    pub fn execution_source(&self) -> PlanExecutionSource<'_> {
        PlanExecutionSource::new(&self.plan)
    }

    /// First incomplete task in plan order.
    pub fn next_task(&self) -> Option<ExecutionTask> {
        select_next(&flatten(&self.plan)).cloned()
    }

    /// Today's stats with the placeholder streak value.
    pub fn today_stats(&self) -> TodayStats {
        today_stats(&flatten(&self.plan), PLACEHOLDER_STREAK_DAYS)
    }

    pub fn subgoal_progress(&self) -> Vec<SubgoalProgress> {
        subgoal_progress(&self.plan)
    }

    fn push_task(&mut self, subgoal_id: &str, task: Task) -> Option<EntityId> {
        if self.plan.subgoal(subgoal_id).is_none() {
            // Unchanged plan is still written back, like every other no-op.
            self.persist();
            return None;
        }
        let id = task.id.clone();
        self.dispatch(PlanAction::AddTask {
            subgoal_id: subgoal_id.to_string(),
            task,
        });
        Some(id)
    }

    fn persist(&mut self) {
        let encoded = encode_plan(&self.plan);
        match self.storage.set(self.key.as_str(), &encoded) {
            Ok(()) => {
                self.last_persist_ok = true;
            }
            Err(err) => {
                self.last_persist_ok = false;
                error!(
                    "event=plan_persist module=plan_store status=error key={} error={err}",
                    self.key
                );
            }
        }
    }
}

/// Serializes a plan into its persisted JSON form.
pub fn encode_plan(plan: &Plan) -> String {
    // Plan holds only strings, bools and vectors; serialization cannot fail.
    serde_json::to_string(plan).unwrap_or_else(|_| String::from("{}"))
}

fn hydrate<S: KeyValueStore>(storage: &S, key: &StorageKey) -> (Plan, HydrationSource) {
    let raw = match storage.get(key.as_str()) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=plan_hydrate module=plan_store status=ok source=missing key={key}");
            return (Plan::new_default(), HydrationSource::Missing);
        }
        Err(err) => {
            warn!("event=plan_hydrate module=plan_store status=error source=read key={key} error={err}");
            return (Plan::new_default(), HydrationSource::ReadFailed);
        }
    };

    let value = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=plan_hydrate module=plan_store status=error source=parse key={key} error={err}");
            return (Plan::new_default(), HydrationSource::ParseFailed);
        }
    };

    let (plan, report) = normalize_with_report(&value);
    log_normalize_report("plan_hydrate", &report);
    info!(
        "event=plan_hydrate module=plan_store status=ok source=stored key={key} subgoals={} tasks={}",
        plan.subgoals.len(),
        plan.task_count()
    );
    (plan, HydrationSource::Stored)
}

fn log_normalize_report(event: &str, report: &NormalizeReport) {
    if report.is_clean() {
        return;
    }
    warn!(
        "event={event} module=plan_store status=normalized root_replaced={} subgoals_defaulted={} generated_ids={} defaulted_fields={} duplicate_ids={}",
        report.root_replaced,
        report.subgoals_defaulted,
        report.generated_ids,
        report.defaulted_fields,
        report.duplicate_ids
    );
}
