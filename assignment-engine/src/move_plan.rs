use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::{AssignmentError, Result};
use crate::group_view::group_tasks;
use crate::types::{Assignment, Instance, Partition, PartitionsMetadata, Task};
use crate::validate::validate;

/// Desired new home instance of each to-be-moved partition, as chosen by an
/// operator or a higher-level strategy. This crate does not itself decide
/// targets; it only executes a given target faithfully.
pub type TargetAssignment = BTreeMap<Instance, BTreeSet<Partition>>;

/// Computes a new whole-fleet assignment that relocates the partitions
/// named in `target_assignment` to their requested destination instances,
/// replacing at most one task per original task and recording lineage on
/// every receiving task.
pub fn move_partitions(
    current: &Assignment,
    target_assignment: &TargetAssignment,
    metadata: &PartitionsMetadata,
) -> Result<Assignment> {
    // Ensures the group exists at all; also a precondition shared with
    // assign_partitions.
    group_tasks(current, &metadata.group)?;

    // Step 1: partitions actually still in the group. Target entries for
    // partitions the group no longer owns are silently dropped.
    let mut all_to_reassign: BTreeSet<Partition> = BTreeSet::new();
    for partitions in target_assignment.values() {
        all_to_reassign.extend(partitions.iter().cloned());
    }
    all_to_reassign.retain(|p| metadata.partitions.contains(p));

    // Step 2: per-task release sets, and partition -> source task lineage.
    let mut to_release_by_task: HashMap<String, BTreeSet<Partition>> = HashMap::new();
    let mut source_of: HashMap<Partition, String> = HashMap::new();
    let mut to_release_total: BTreeSet<Partition> = BTreeSet::new();

    for tasks in current.values() {
        for task in tasks {
            if task.task_prefix != metadata.group {
                continue;
            }
            let release: BTreeSet<Partition> = task
                .partitions
                .intersection(&all_to_reassign)
                .cloned()
                .collect();
            if release.is_empty() {
                continue;
            }
            for p in &release {
                source_of.insert(p.clone(), task.name.clone());
                to_release_total.insert(p.clone());
            }
            to_release_by_task.insert(task.name.clone(), release);
        }
    }

    // Step 3: walk every instance that either already has tasks or is a
    // move destination.
    let instances: BTreeSet<&Instance> = current
        .keys()
        .chain(target_assignment.keys())
        .collect();

    let mut new_assignment = Assignment::new();
    for instance in instances {
        let existing_tasks = current.get(instance);

        let to_move_in: BTreeSet<Partition> = target_assignment
            .get(instance)
            .cloned()
            .unwrap_or_default()
            .intersection(&to_release_total)
            .cloned()
            .collect();

        let group_tasks_here: Vec<&Arc<Task>> = existing_tasks
            .map(|tasks| {
                tasks
                    .iter()
                    .filter(|t| t.task_prefix == metadata.group)
                    .collect()
            })
            .unwrap_or_default();

        let target_task_name = if to_move_in.is_empty() {
            None
        } else if let Some(min_task) = group_tasks_here
            .iter()
            .min_by_key(|t| t.partitions.len())
        {
            Some(min_task.name.clone())
        } else {
            return Err(AssignmentError::NoTargetTask {
                instance: instance.clone(),
            });
        };

        let Some(tasks) = existing_tasks else {
            // No tasks here at all; to_move_in must be empty or we'd have
            // already failed above. Nothing to carry into the output.
            continue;
        };

        let mut new_tasks = Vec::with_capacity(tasks.len());
        for task in tasks {
            if task.task_prefix != metadata.group {
                new_tasks.push(Arc::clone(task));
                continue;
            }

            let mut partitions = task.partitions.clone();
            let mut dependencies = task.dependencies.clone();
            let mut changed = false;

            if let Some(release) = to_release_by_task.get(&task.name) {
                for p in release {
                    partitions.remove(p);
                }
                changed = true;
            }

            if target_task_name.as_deref() == Some(task.name.as_str()) {
                for p in &to_move_in {
                    partitions.insert(p.clone());
                    if let Some(source) = source_of.get(p) {
                        dependencies.insert(source.clone());
                    }
                }
                changed = true;
            }

            if changed {
                new_tasks.push(Arc::new(Task {
                    name: task.name.clone(),
                    task_prefix: task.task_prefix.clone(),
                    partitions,
                    dependencies,
                }));
            } else {
                new_tasks.push(Arc::clone(task));
            }
        }
        new_assignment.insert(instance.clone(), new_tasks);
    }

    validate(&new_assignment, metadata)?;
    Ok(new_assignment)
}
