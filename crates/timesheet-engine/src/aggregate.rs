//! Per-task rollup of project entries.
//!
//! Rows of one task fold into a single aggregate with three reducers:
//! hours add up, the name is last-write-wins and the estimate is
//! first-non-null-wins. The two field reducers are public so that their
//! asymmetry is tested on its own.

use serde::Serialize;
use std::collections::HashMap;
use timesheet_core::{TaskId, TimeEntryRow};

/// Accumulated hours and retained estimate of one task
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskAggregate {
    pub task_id: TaskId,
    pub task_name: String,
    pub hours: f64,
    pub estimated_hours: Option<f64>,
}

impl TaskAggregate {
    fn start(row: &TimeEntryRow) -> Self {
        Self {
            task_id: row.task_id.clone(),
            task_name: row.task_name.clone(),
            hours: row.hours,
            estimated_hours: row.estimated_hours,
        }
    }

    fn absorb(&mut self, row: &TimeEntryRow) {
        self.hours += row.hours;
        take_latest_name(&mut self.task_name, &row.task_name);
        keep_first_estimate(&mut self.estimated_hours, row.estimated_hours);
    }
}

/// Name reducer: the most recently seen name replaces the current one
pub fn take_latest_name(current: &mut String, incoming: &str) {
    incoming.clone_into(current);
}

/// Estimate reducer: the first non-null value is kept for good
pub fn keep_first_estimate(current: &mut Option<f64>, incoming: Option<f64>) {
    if current.is_none() {
        *current = incoming;
    }
}

/// Fold rows by task id, in order of each task's first appearance
pub fn aggregate_tasks<'a>(rows: impl IntoIterator<Item = &'a TimeEntryRow>) -> Vec<TaskAggregate> {
    let mut tasks: Vec<TaskAggregate> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();

    for row in rows {
        if let Some(&slot) = slots.get(row.task_id.as_str()) {
            tasks[slot].absorb(row);
        } else {
            slots.insert(row.task_id.as_str(), tasks.len());
            tasks.push(TaskAggregate::start(row));
        }
    }

    tasks
}
