use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Opaque worker identifier. The engine never interprets the string.
pub type Instance = String;

/// Opaque partition identifier. The engine never interprets the string.
pub type Partition = String;

/// A unit of work belonging to one datastream group.
///
/// `name` is the stable identity of a task across rebalances: a task is
/// never mutated in place, but a replacement carries the same `name` as the
/// task it supersedes. `dependencies` names prior tasks whose partitions
/// this task's current partition set absorbed; downstream consumers use it
/// to sequence startup against predecessor flushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub task_prefix: String,
    pub partitions: BTreeSet<Partition>,
    pub dependencies: BTreeSet<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, task_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            task_prefix: task_prefix.into(),
            partitions: BTreeSet::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_partitions(
        name: impl Into<String>,
        task_prefix: impl Into<String>,
        partitions: impl IntoIterator<Item = Partition>,
    ) -> Self {
        Self {
            name: name.into(),
            task_prefix: task_prefix.into(),
            partitions: partitions.into_iter().collect(),
            dependencies: BTreeSet::new(),
        }
    }
}

/// Whole-fleet assignment: every instance's tasks, across every datastream
/// group. A `BTreeMap` keeps instance traversal order deterministic, which
/// matters because the remainder of an uneven partition split is consumed
/// in traversal order (see `rebalance::assign_partitions`).
///
/// Tasks are held behind `Arc` so that an unchanged task is returned to the
/// caller as the literal same allocation — the stickiness property is
/// pointer identity, not just structural equality.
pub type Assignment = BTreeMap<Instance, Vec<Arc<Task>>>;

/// The partition universe for one datastream group, as known to the
/// coordinator calling into this engine.
#[derive(Debug, Clone)]
pub struct PartitionsMetadata {
    pub group: String,
    pub partitions: BTreeSet<Partition>,
}

impl PartitionsMetadata {
    pub fn new(group: impl Into<String>, partitions: impl IntoIterator<Item = Partition>) -> Self {
        Self {
            group: group.into(),
            partitions: partitions.into_iter().collect(),
        }
    }
}
