use focusdo_core::db::open_db_in_memory;
use focusdo_core::{
    flatten, load_execution_view, select_next, subgoal_progress, today_stats, ExecutionPage,
    ExecutionSource, ExecutionTask, ExecutionTaskRepository, ExecutionView,
    InMemoryExecutionSource, MemoryKeyValueStore, Plan, PlanExecutionSource, PlanStore,
    SqliteExecutionSource, Subgoal, Task,
};

fn task(title: &str, done: bool) -> Task {
    let mut task = Task::titled(title);
    task.done = done;
    task
}

fn exec_task(id: &str, planned: u32, completed: u32) -> ExecutionTask {
    ExecutionTask {
        id: id.to_string(),
        title: id.to_uppercase(),
        planned_effort: planned,
        completed_effort: completed,
        completed: completed >= planned,
    }
}

fn plan_with(tasks: Vec<Task>) -> Plan {
    let mut subgoal = Subgoal::titled("only");
    subgoal.tasks = tasks;
    Plan {
        goal_title: "goal".to_string(),
        subgoals: vec![subgoal],
    }
}

#[test]
fn flatten_maps_each_task_to_one_effort_unit() {
    let mut first = Subgoal::titled("first");
    first.tasks = vec![task("a", true), task("b", false)];
    let mut second = Subgoal::titled("second");
    second.tasks = vec![task("c", false)];
    let plan = Plan {
        goal_title: String::new(),
        subgoals: vec![first, second],
    };

    let tasks = flatten(&plan);
    let titles = tasks.iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, ["a", "b", "c"]);
    assert_eq!(tasks[0].id, plan.subgoals[0].tasks[0].id);
    assert_eq!(
        (tasks[0].planned_effort, tasks[0].completed_effort, tasks[0].completed),
        (1, 1, true)
    );
    assert_eq!(
        (tasks[1].planned_effort, tasks[1].completed_effort, tasks[1].completed),
        (1, 0, false)
    );
}

#[test]
fn next_task_is_first_incomplete_in_order() {
    let plan = plan_with(vec![task("A", true), task("B", false), task("C", false)]);
    let tasks = flatten(&plan);
    assert_eq!(select_next(&tasks).map(|t| t.title.as_str()), Some("B"));

    let all_done = flatten(&plan_with(vec![task("A", true), task("B", true)]));
    assert!(select_next(&all_done).is_none());
    assert!(select_next(&[]).is_none());
}

#[test]
fn stats_compute_effort_rate_without_dividing_by_zero() {
    let tasks = vec![
        exec_task("a", 1, 1),
        exec_task("b", 1, 0),
        exec_task("c", 1, 1),
        exec_task("d", 1, 0),
    ];
    let stats = today_stats(&tasks, 3);
    assert_eq!(stats.completed_count, 2);
    assert_eq!(stats.effort_rate, 0.5);
    assert_eq!(stats.streak_days, 3);
    assert_eq!(stats.effort_percent(), 50);

    let empty = today_stats(&[], 1);
    assert_eq!(empty.completed_count, 0);
    assert_eq!(empty.effort_rate, 0.0);
}

#[test]
fn projection_is_pure() {
    let plan = plan_with(vec![task("A", false), task("B", true)]);
    let source = PlanExecutionSource::new(&plan);
    assert_eq!(source.next_task().unwrap(), source.next_task().unwrap());
    assert_eq!(source.today_stats().unwrap(), source.today_stats().unwrap());
    assert_eq!(flatten(&plan), flatten(&plan));
}

#[test]
fn subgoal_progress_reports_per_subgoal_rates() {
    let mut plan = plan_with(vec![task("A", true), task("B", false)]);
    plan.subgoals.push(Subgoal::titled("empty"));

    let progress = subgoal_progress(&plan);
    assert_eq!(progress.len(), 2);
    assert_eq!((progress[0].done, progress[0].total), (1, 2));
    assert_eq!(progress[0].rate, 0.5);
    assert_eq!((progress[1].done, progress[1].total), (0, 0));
    assert_eq!(progress[1].rate, 0.0);
}

#[test]
fn store_queries_follow_mutations() {
    let mut store = PlanStore::new(MemoryKeyValueStore::new());
    let subgoal_id = store.plan().subgoals[0].id.clone();
    let task_id = store.plan().subgoals[0].tasks[0].id.clone();
    assert_eq!(store.next_task().map(|t| t.id), Some(task_id.clone()));

    store.toggle_task_done(&subgoal_id, &task_id);
    assert_eq!(store.next_task(), None);
    let stats = store.today_stats();
    assert_eq!(stats.completed_count, 1);
    assert_eq!(stats.effort_rate, 1.0);
    assert_eq!(stats.streak_days, 1);
    assert_eq!(store.subgoal_progress()[0].done, 1);
}

#[test]
fn in_memory_source_prefers_largest_remaining_effort() {
    let mut source = InMemoryExecutionSource::new();
    source.seed(vec![
        exec_task("small", 1, 0),
        exec_task("big", 3, 1),
        exec_task("tied", 2, 0),
        exec_task("finished", 4, 4),
    ]);

    let next = source.next_task().unwrap().expect("pending task");
    assert_eq!(next.id, "big");
    let stats = source.today_stats().unwrap();
    assert_eq!(stats.completed_count, 1);
    assert_eq!(stats.effort_rate, 0.5);
}

#[test]
fn in_memory_source_ranks_over_delivered_task_last() {
    let over = ExecutionTask {
        completed: false,
        ..exec_task("over", 1, 2)
    };
    let even = ExecutionTask {
        completed: false,
        ..exec_task("even", 1, 1)
    };
    assert_eq!(over.remaining_effort(), -1);

    let mut source = InMemoryExecutionSource::new();
    source.seed(vec![over, even]);
    assert_eq!(source.next_task().unwrap().unwrap().id, "even");
}

#[test]
fn in_memory_source_keeps_seed_order_on_ties() {
    let mut source = InMemoryExecutionSource::new();
    source.seed(vec![exec_task("first", 2, 0), exec_task("second", 2, 0)]);
    assert_eq!(source.next_task().unwrap().unwrap().id, "first");
}

#[test]
fn sqlite_source_answers_from_repository_rows() {
    let conn = open_db_in_memory().unwrap();
    let source = SqliteExecutionSource::new(&conn).with_streak_days(4);
    source
        .replace_all(&[
            exec_task("t-b", 2, 2),
            exec_task("t-a", 2, 0),
            exec_task("t-c", 2, 1),
        ])
        .unwrap();

    let listed = source.list_tasks().unwrap();
    let ids = listed.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["t-b", "t-a", "t-c"]);

    assert_eq!(source.next_task().unwrap().unwrap().id, "t-a");
    assert!(source.record_effort("t-a", 2).unwrap());
    assert!(!source.record_effort("missing", 1).unwrap());
    assert_eq!(source.next_task().unwrap().unwrap().id, "t-c");

    let stats = source.today_stats().unwrap();
    assert_eq!(stats.completed_count, 2);
    assert_eq!(stats.effort_rate, 5.0 / 6.0);
    assert_eq!(stats.streak_days, 4);
}

#[test]
fn sqlite_source_rejects_invalid_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO execution_tasks (task_id, title, planned_effort, completed_effort, completed, sort_order)
         VALUES ('x', 'x', -1, 0, 0, 0);",
        [],
    )
    .unwrap_err();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO execution_tasks (task_id, title, planned_effort, completed_effort, completed, sort_order)
         VALUES ('x', 'x', 1, 0, 7, 0);",
    )
    .unwrap();

    let source = SqliteExecutionSource::new(&conn);
    let view = load_execution_view(&source);
    match view {
        ExecutionView::Error { message } => assert!(message.contains("invalid completed value")),
        other => panic!("expected error state, got {other:?}"),
    }
}

#[test]
fn page_moves_from_loading_to_ready() {
    let plan = plan_with(vec![task("A", true), task("B", false)]);
    let mut page = ExecutionPage::new(PlanExecutionSource::new(&plan));
    assert_eq!(*page.state(), ExecutionView::Loading);

    match page.load() {
        ExecutionView::Ready { task, stats } => {
            assert_eq!(task.as_ref().map(|t| t.title.as_str()), Some("B"));
            assert_eq!(stats.completed_count, 1);
        }
        other => panic!("expected ready state, got {other:?}"),
    }
    assert_eq!(page.attempts(), 1);
}

#[test]
fn failed_load_surfaces_error_and_retry_recovers() {
    let mut source = InMemoryExecutionSource::new();
    source.seed(vec![exec_task("a", 1, 0)]);
    source.set_offline(true);
    let mut page = ExecutionPage::new(source);

    assert!(page.load().is_error());
    assert!(page.retry().is_error());

    page.source_mut().set_offline(false);
    let state = page.retry();
    assert!(state.is_ready());
    assert_eq!(page.attempts(), 3);
}

#[test]
fn ready_with_no_pending_task_is_distinct_from_error() {
    let plan = plan_with(vec![task("A", true)]);
    let view = load_execution_view(&PlanExecutionSource::new(&plan));
    match view {
        ExecutionView::Ready { task, stats } => {
            assert!(task.is_none());
            assert_eq!(stats.effort_rate, 1.0);
        }
        other => panic!("expected ready state, got {other:?}"),
    }
}
