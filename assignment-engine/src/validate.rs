use std::collections::BTreeSet;

use crate::error::{AssignmentError, Result};
use crate::types::{Assignment, PartitionsMetadata};

/// Verifies that, for the group named in `metadata`, every partition in
/// `metadata.partitions` appears in exactly one task's partition set, and
/// no task carries a partition outside that set.
///
/// This is the post-condition every public operation in this crate must
/// establish before returning. A failure here is fatal and unrecoverable
/// at this layer.
pub fn validate(assignment: &Assignment, metadata: &PartitionsMetadata) -> Result<()> {
    let mut seen = BTreeSet::new();
    for tasks in assignment.values() {
        for task in tasks {
            if task.task_prefix != metadata.group {
                continue;
            }
            for partition in &task.partitions {
                if !metadata.partitions.contains(partition) {
                    return Err(AssignmentError::InvariantViolation(format!(
                        "task {} carries partition {partition} which is not in the group's partition set",
                        task.name
                    )));
                }
                if !seen.insert(partition.clone()) {
                    return Err(AssignmentError::InvariantViolation(format!(
                        "partition {partition} is assigned to more than one task"
                    )));
                }
            }
        }
    }

    if seen != metadata.partitions {
        let missing: Vec<_> = metadata.partitions.difference(&seen).cloned().collect();
        return Err(AssignmentError::InvariantViolation(format!(
            "partitions missing from assignment: {missing:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Task;
    use std::sync::Arc;

    fn metadata(partitions: &[&str]) -> PartitionsMetadata {
        PartitionsMetadata::new("g", partitions.iter().map(|p| p.to_string()))
    }

    #[test]
    fn passes_on_exact_cover() {
        let mut assignment = Assignment::new();
        assignment.insert(
            "i1".to_string(),
            vec![Arc::new(Task::with_partitions(
                "g-0",
                "g",
                ["p1".to_string(), "p2".to_string()],
            ))],
        );
        assert!(validate(&assignment, &metadata(&["p1", "p2"])).is_ok());
    }

    #[test]
    fn fails_on_missing_partition() {
        let mut assignment = Assignment::new();
        assignment.insert(
            "i1".to_string(),
            vec![Arc::new(Task::with_partitions("g-0", "g", ["p1".to_string()]))],
        );
        assert!(matches!(
            validate(&assignment, &metadata(&["p1", "p2"])),
            Err(AssignmentError::InvariantViolation(_))
        ));
    }

    #[test]
    fn fails_on_duplicate_partition() {
        let mut assignment = Assignment::new();
        assignment.insert(
            "i1".to_string(),
            vec![
                Arc::new(Task::with_partitions("g-0", "g", ["p1".to_string()])),
                Arc::new(Task::with_partitions("g-1", "g", ["p1".to_string()])),
            ],
        );
        assert!(matches!(
            validate(&assignment, &metadata(&["p1"])),
            Err(AssignmentError::InvariantViolation(_))
        ));
    }

    #[test]
    fn fails_on_foreign_partition() {
        let mut assignment = Assignment::new();
        assignment.insert(
            "i1".to_string(),
            vec![Arc::new(Task::with_partitions(
                "g-0",
                "g",
                ["p1".to_string(), "stale".to_string()],
            ))],
        );
        assert!(matches!(
            validate(&assignment, &metadata(&["p1"])),
            Err(AssignmentError::InvariantViolation(_))
        ));
    }

    #[test]
    fn ignores_other_groups() {
        let mut assignment = Assignment::new();
        assignment.insert(
            "i1".to_string(),
            vec![
                Arc::new(Task::with_partitions("g-0", "g", ["p1".to_string()])),
                Arc::new(Task::with_partitions("other-0", "other", ["x".to_string()])),
            ],
        );
        assert!(validate(&assignment, &metadata(&["p1"])).is_ok());
    }
}
