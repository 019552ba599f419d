use focusdo_core::{new_entity_id, reduce, Plan, PlanAction, Subgoal, Task};
use std::collections::HashSet;

#[test]
fn default_plan_has_one_blank_subgoal_with_one_blank_task() {
    let plan = Plan::new_default();

    assert_eq!(plan.goal_title, "");
    assert_eq!(plan.subgoals.len(), 1);
    assert_eq!(plan.subgoals[0].title, "");
    assert_eq!(plan.subgoals[0].tasks.len(), 1);
    assert_eq!(plan.subgoals[0].tasks[0].title, "");
    assert!(!plan.subgoals[0].tasks[0].done);
    assert!(plan.has_default_shape());
}

#[test]
fn default_plans_get_fresh_ids() {
    let first = Plan::new_default();
    let second = Plan::new_default();
    assert_ne!(first.subgoals[0].id, second.subgoals[0].id);
    assert_ne!(first, second);
}

#[test]
fn generated_ids_do_not_collide() {
    let ids = (0..1_000).map(|_| new_entity_id()).collect::<HashSet<_>>();
    assert_eq!(ids.len(), 1_000);
}

#[test]
fn lookups_return_first_match() {
    let mut subgoal = Subgoal::titled("Research");
    let task = Task::titled("Read");
    let task_id = task.id.clone();
    subgoal.tasks.push(task);
    let subgoal_id = subgoal.id.clone();
    let plan = Plan {
        goal_title: "Thesis".to_string(),
        subgoals: vec![subgoal],
    };

    assert_eq!(plan.subgoal(&subgoal_id).unwrap().title, "Research");
    assert_eq!(
        plan.subgoal(&subgoal_id).unwrap().task(&task_id).unwrap().title,
        "Read"
    );
    assert!(plan.subgoal("missing").is_none());
    assert_eq!(plan.task_count(), 1);
}

#[test]
fn remove_subgoal_cascades_to_its_tasks() {
    let mut plan = Plan::new_default();
    let doomed = plan.subgoals[0].clone();
    let mut keep = Subgoal::titled("Keep");
    keep.tasks.push(Task::titled("Stay"));
    plan.subgoals.push(keep);

    let plan = reduce(
        plan,
        PlanAction::RemoveSubgoal {
            subgoal_id: doomed.id.clone(),
        },
    );

    assert_eq!(plan.subgoals.len(), 1);
    assert!(plan.tasks().all(|task| task.id != doomed.tasks[0].id));
    assert_eq!(plan.tasks().count(), 1);
}

#[test]
fn untouched_subgoals_are_carried_over_unchanged() {
    let mut plan = Plan::new_default();
    plan.subgoals.push(Subgoal::titled("Other"));
    let untouched = plan.subgoals[1].clone();
    let target = plan.subgoals[0].id.clone();
    let task_id = plan.subgoals[0].tasks[0].id.clone();

    let plan = reduce(
        plan,
        PlanAction::ToggleTaskDone {
            subgoal_id: target,
            task_id,
        },
    );
    assert!(plan.subgoals[0].tasks[0].done);
    assert_eq!(plan.subgoals[1], untouched);
}
