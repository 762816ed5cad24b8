use thiserror::Error;

/// Fatal failures surfaced from the assignment engine.
///
/// Neither variant is recoverable at this layer: the caller (a coordinator
/// that owns the whole-fleet assignment snapshot) must abort the rebalance
/// or move and retry with corrected inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("no group task exists on instance {instance} to receive moved partitions")]
    NoTargetTask { instance: String },
}

pub type Result<T> = std::result::Result<T, AssignmentError>;
