//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `focusdo_core` linkage and hydrate a plan database.
//! - Print the execution view deterministically for local sanity checks.
//!
//! Usage: `focusdo [DB_PATH]`. Without a path the plan lives in memory.

use focusdo_core::db::open_db;
use focusdo_core::{
    load_execution_view, ExecutionView, KeyValueStore, MemoryKeyValueStore, PlanStore,
    SqliteKeyValueStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("focusdo_core ping={}", focusdo_core::ping());
    println!("focusdo_core version={}", focusdo_core::core_version());

    match std::env::args().nth(1) {
        Some(path) => {
            let storage = match open_db(&path)
                .map_err(|err| err.to_string())
                .and_then(|conn| SqliteKeyValueStore::try_new(conn).map_err(|err| err.to_string()))
            {
                Ok(storage) => storage,
                Err(err) => {
                    eprintln!("failed to open plan database `{path}`: {err}");
                    return ExitCode::FAILURE;
                }
            };
            report(&PlanStore::new(storage));
        }
        None => report(&PlanStore::new(MemoryKeyValueStore::new())),
    }

    ExitCode::SUCCESS
}

fn report<S: KeyValueStore>(store: &PlanStore<S>) {
    let plan = store.plan();
    println!("hydration={:?}", store.hydration());
    println!("goal={:?}", plan.goal_title);
    for progress in store.subgoal_progress() {
        println!(
            "subgoal={} done={}/{}",
            progress.subgoal_id, progress.done, progress.total
        );
    }

    match load_execution_view(&store.execution_source()) {
        ExecutionView::Ready { task, stats } => {
            match task {
                Some(task) => println!("next_task={} title={:?}", task.id, task.title),
                None => println!("next_task=none"),
            }
            println!(
                "completed={} effort_rate={}% streak_days={}",
                stats.completed_count,
                stats.effort_percent(),
                stats.streak_days
            );
        }
        ExecutionView::Loading => println!("execution_view=loading"),
        ExecutionView::Error { message } => println!("execution_view=error message={message}"),
    }
}
