use std::collections::BTreeSet;
use std::sync::Arc;

use crate::entropy::EntropySource;
use crate::error::Result;
use crate::group_view::group_tasks;
use crate::types::{Assignment, Partition, PartitionsMetadata, Task};
use crate::validate::validate;

/// Computes a new whole-fleet assignment absorbing a changed partition set
/// for one datastream group, mutating existing tasks in place where
/// possible.
///
/// `entropy` drives the shuffle of newly-unassigned partitions before
/// they're handed out; pass a [`crate::entropy::SeededEntropy`] in tests
/// for reproducible results.
pub fn assign_partitions(
    current: &Assignment,
    metadata: &PartitionsMetadata,
    entropy: &dyn EntropySource,
) -> Result<Assignment> {
    let group_view = group_tasks(current, &metadata.group)?;
    let task_count = group_view.len();

    let assigned_partitions: BTreeSet<Partition> = group_view
        .iter()
        .flat_map(|gt| gt.task.partitions.iter().cloned())
        .collect();
    let mut unassigned: Vec<Partition> = metadata
        .partitions
        .difference(&assigned_partitions)
        .cloned()
        .collect();
    entropy.shuffle(&mut unassigned);

    let total = metadata.partitions.len();
    let base = total / task_count;
    let mut remainder = total % task_count;

    let mut new_assignment = Assignment::new();
    for (instance, tasks) in current {
        let mut new_tasks = Vec::with_capacity(tasks.len());
        for task in tasks {
            if task.task_prefix != metadata.group {
                new_tasks.push(Arc::clone(task));
                continue;
            }

            let mut partitions: BTreeSet<Partition> = task
                .partitions
                .intersection(&metadata.partitions)
                .cloned()
                .collect();
            let dropped = partitions.len() != task.partitions.len();

            let allowance = if remainder > 0 {
                remainder -= 1;
                base + 1
            } else {
                base
            };

            let mut added = false;
            while partitions.len() < allowance {
                match unassigned.pop() {
                    Some(p) => {
                        partitions.insert(p);
                        added = true;
                    }
                    None => break,
                }
            }

            if dropped || added {
                new_tasks.push(Arc::new(Task {
                    name: task.name.clone(),
                    task_prefix: task.task_prefix.clone(),
                    partitions,
                    dependencies: std::iter::once(task.name.clone()).collect(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{NoopEntropy, SeededEntropy};
    use crate::error::AssignmentError;

    fn task(name: &str, partitions: &[&str]) -> Arc<Task> {
        Arc::new(Task::with_partitions(
            name,
            "g",
            partitions.iter().map(|p| p.to_string()),
        ))
    }

    fn parts(ps: &[&str]) -> Vec<String> {
        ps.iter().map(|p| p.to_string()).collect()
    }

    /// One instance, two tasks, partition set grows
    /// from 5 to 7 — both tasks get replaced, split 4/3.
    #[test]
    fn balanced_reassignment() {
        let mut current = Assignment::new();
        current.insert(
            "i1".to_string(),
            vec![
                task("g-a", &["p1", "p2", "p3"]),
                task("g-b", &["p4", "p5"]),
            ],
        );
        let metadata = PartitionsMetadata::new("g", parts(&["p1", "p2", "p3", "p4", "p5", "p6", "p7"]));

        let result = assign_partitions(&current, &metadata, &NoopEntropy).unwrap();
        let tasks = &result["i1"];
        assert_eq!(tasks.len(), 2);
        let mut sizes: Vec<_> = tasks.iter().map(|t| t.partitions.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 4]);

        let mut all: BTreeSet<String> = BTreeSet::new();
        for t in tasks {
            all.extend(t.partitions.iter().cloned());
        }
        assert_eq!(all, metadata.partitions);

        // Both tasks changed size, so both are replaced (not the same Arc).
        assert!(!Arc::ptr_eq(&tasks[0], &current["i1"][0]));
        assert!(!Arc::ptr_eq(&tasks[1], &current["i1"][1]));
    }

    /// Metadata already matches current partitions —
    /// no task is replaced.
    #[test]
    fn sticky_noop() {
        let mut current = Assignment::new();
        current.insert(
            "i1".to_string(),
            vec![
                task("g-a", &["p1", "p2", "p3"]),
                task("g-b", &["p4", "p5"]),
            ],
        );
        let metadata = PartitionsMetadata::new("g", parts(&["p1", "p2", "p3", "p4", "p5"]));

        let result = assign_partitions(&current, &metadata, &NoopEntropy).unwrap();
        let tasks = &result["i1"];
        assert!(Arc::ptr_eq(&tasks[0], &current["i1"][0]));
        assert!(Arc::ptr_eq(&tasks[1], &current["i1"][1]));
    }

    #[test]
    fn zero_tasks_is_invariant_violation() {
        let current = Assignment::new();
        let metadata = PartitionsMetadata::new("g", parts(&["p1"]));
        assert!(matches!(
            assign_partitions(&current, &metadata, &NoopEntropy),
            Err(AssignmentError::InvariantViolation(_))
        ));
    }

    #[test]
    fn retired_partition_counts_as_change_even_if_refilled() {
        let mut current = Assignment::new();
        current.insert(
            "i1".to_string(),
            vec![task("g-a", &["p1", "p2"]), task("g-b", &["p3", "p4"])],
        );
        // p2 retires, p5 is new — g-a's partition count is unchanged (2)
        // but its membership changed, so it must still be replaced.
        let metadata = PartitionsMetadata::new("g", parts(&["p1", "p3", "p4", "p5"]));

        let result = assign_partitions(&current, &metadata, &NoopEntropy).unwrap();
        let tasks = &result["i1"];
        assert!(!Arc::ptr_eq(&tasks[0], &current["i1"][0]));
    }

    #[test]
    fn shuffle_changes_which_task_absorbs_growth_but_not_balance() {
        let mut current = Assignment::new();
        current.insert("i1".to_string(), vec![task("g-a", &[]), task("g-b", &[])]);
        let metadata = PartitionsMetadata::new("g", parts(&["p1", "p2", "p3"]));

        let a = assign_partitions(&current, &metadata, &SeededEntropy::new(1)).unwrap();
        let b = assign_partitions(&current, &metadata, &SeededEntropy::new(2)).unwrap();

        for result in [&a, &b] {
            let mut sizes: Vec<_> = result["i1"].iter().map(|t| t.partitions.len()).collect();
            sizes.sort_unstable();
            assert_eq!(sizes, vec![1, 2]);
        }
    }

    #[test]
    fn multi_instance_remainder_follows_traversal_order() {
        let mut current = Assignment::new();
        current.insert("i1".to_string(), vec![task("g-a", &[])]);
        current.insert("i2".to_string(), vec![task("g-b", &[])]);
        current.insert("i3".to_string(), vec![task("g-c", &[])]);
        let metadata = PartitionsMetadata::new("g", parts(&["p1", "p2", "p3", "p4"]));

        let result = assign_partitions(&current, &metadata, &NoopEntropy).unwrap();
        // base = 1, remainder = 1: the first task encountered in traversal
        // order (i1's g-a) gets the extra partition.
        assert_eq!(result["i1"][0].partitions.len(), 2);
        assert_eq!(result["i2"][0].partitions.len(), 1);
        assert_eq!(result["i3"][0].partitions.len(), 1);
    }
}
