use crate::error::{AssignmentError, Result};
use crate::types::{Assignment, Instance, Task};
use std::sync::Arc;

/// A task together with the instance it currently runs on.
pub struct GroupTask<'a> {
    pub instance: &'a Instance,
    pub task: &'a Arc<Task>,
}

/// Extracts the tasks belonging to one datastream group from a whole-fleet
/// assignment, in the fleet's traversal order (instance order, then each
/// instance's task order). Fails if the group has no tasks at all: task
/// count is established by a higher-level strategy not specified here, and
/// dividing the partition count by zero tasks is a precondition failure,
/// not a degenerate valid case.
pub fn group_tasks<'a>(assignment: &'a Assignment, group: &str) -> Result<Vec<GroupTask<'a>>> {
    let tasks: Vec<GroupTask<'a>> = assignment
        .iter()
        .flat_map(|(instance, tasks)| tasks.iter().map(move |task| (instance, task)))
        .filter(|(_, task)| task.task_prefix == group)
        .map(|(instance, task)| GroupTask { instance, task })
        .collect();

    if tasks.is_empty() {
        return Err(AssignmentError::InvariantViolation(format!(
            "group {group} has no tasks; task count must be established before assign_partitions is called"
        )));
    }

    Ok(tasks)
}
