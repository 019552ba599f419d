//! Defensive coercion of untrusted persisted data into a `Plan`.
//!
//! # Responsibility
//! - Convert any JSON value into a well-formed plan.
//! - Report which fields had to be substituted, for diagnostics only.
//!
//! # Invariants
//! - Normalization is total: it never panics and never returns an error.
//! - The resulting plan always has at least one sub-goal.
//! - Duplicate ids are reported but kept as-is.

use crate::model::plan::{default_subgoals, new_entity_id, Plan, Subgoal, Task};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Substitution counters collected while normalizing one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Root value was not an object; the default plan was returned.
    pub root_replaced: bool,
    /// Normalized sub-goal list was empty and replaced by the default one.
    pub subgoals_defaulted: bool,
    /// Ids generated because the stored id was missing or not a string.
    pub generated_ids: usize,
    /// Title/done/tasks fields replaced by their defaults.
    pub defaulted_fields: usize,
    /// Sub-goal ids seen more than once, plus task ids repeated within one
    /// sub-goal.
    pub duplicate_ids: usize,
}

impl NormalizeReport {
    /// Returns whether the input already was a well-formed plan.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Normalizes an arbitrary JSON value into a plan.
pub fn normalize(raw: &Value) -> Plan {
    normalize_with_report(raw).0
}

/// Parses JSON text and normalizes the result.
///
/// # Errors
/// - Returns the parse error when `text` is not valid JSON.
pub fn normalize_str(text: &str) -> Result<Plan, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    Ok(normalize(&value))
}

/// Decodes persisted text into a plan, falling back to the default plan on
/// parse failure.
pub fn decode_plan(text: &str) -> Plan {
    normalize_str(text).unwrap_or_else(|_| Plan::new_default())
}

/// Normalizes and returns substitution counters alongside the plan.
pub fn normalize_with_report(raw: &Value) -> (Plan, NormalizeReport) {
    let mut report = NormalizeReport::default();

    let Some(object) = raw.as_object() else {
        report.root_replaced = true;
        return (Plan::new_default(), report);
    };

    let goal_title = text_field(object, "goalTitle", &mut report);

    let mut subgoals = match object.get("subgoals").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|item| normalize_subgoal(item, &mut report))
            .collect::<Vec<_>>(),
        None => {
            report.defaulted_fields += 1;
            Vec::new()
        }
    };

    if subgoals.is_empty() {
        report.subgoals_defaulted = true;
        subgoals = default_subgoals();
    }

    report.duplicate_ids = count_duplicate_ids(&subgoals);

    (
        Plan {
            goal_title,
            subgoals,
        },
        report,
    )
}

fn normalize_subgoal(raw: &Value, report: &mut NormalizeReport) -> Subgoal {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or(&empty);

    let tasks = match object.get("tasks").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|item| normalize_task(item, report))
            .collect(),
        None => {
            report.defaulted_fields += 1;
            Vec::new()
        }
    };

    Subgoal {
        id: id_field(object, report),
        title: text_field(object, "title", report),
        tasks,
    }
}

fn normalize_task(raw: &Value, report: &mut NormalizeReport) -> Task {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or(&empty);

    let done = match object.get("done") {
        Some(Value::Bool(done)) => *done,
        _ => {
            report.defaulted_fields += 1;
            false
        }
    };

    Task {
        id: id_field(object, report),
        title: text_field(object, "title", report),
        done,
    }
}

fn id_field(object: &Map<String, Value>, report: &mut NormalizeReport) -> String {
    match object.get("id") {
        Some(Value::String(id)) => id.clone(),
        _ => {
            report.generated_ids += 1;
            new_entity_id()
        }
    }
}

fn text_field(object: &Map<String, Value>, key: &str, report: &mut NormalizeReport) -> String {
    match object.get(key) {
        Some(Value::String(text)) => text.clone(),
        _ => {
            report.defaulted_fields += 1;
            String::new()
        }
    }
}

fn count_duplicate_ids(subgoals: &[Subgoal]) -> usize {
    let mut duplicates = 0;
    let mut subgoal_ids = HashSet::new();
    for subgoal in subgoals {
        if !subgoal_ids.insert(subgoal.id.as_str()) {
            duplicates += 1;
        }
        let mut task_ids = HashSet::new();
        for task in &subgoal.tasks {
            if !task_ids.insert(task.id.as_str()) {
                duplicates += 1;
            }
        }
    }
    duplicates
}
