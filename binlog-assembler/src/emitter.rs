use crate::row_shape::ChangeRecord;

/// One transaction's worth of change records, stamped with the checkpoint
/// that identifies the point a downstream consumer should resume from if it
/// restarts after this batch.
///
/// `partition` is currently hardcoded to 0 everywhere this crate constructs
/// a batch — multi-partition output is a known limitation, not yet
/// supported.
#[derive(Debug, Clone)]
pub struct ProducerBatch {
    pub partition: i32,
    pub checkpoint: String,
    pub records: Vec<ChangeRecord>,
}

impl ProducerBatch {
    pub fn new(checkpoint: impl Into<String>, records: Vec<ChangeRecord>) -> Self {
        Self {
            partition: 0,
            checkpoint: checkpoint.into(),
            records,
        }
    }
}

/// Invoked once the batch has been durably accepted or has definitively
/// failed. Runs on whatever context the `Producer` implementation's async
/// work completes on — never assumed to be the caller's own thread/context.
pub type SendCallback = Box<dyn FnOnce(Result<(), SendError>) + Send>;

/// Downstream producer abstraction. The batch is either fully accepted or
/// fully failed — partial batches are never produced at this layer — so
/// implementations must not call `callback` more than once, and must not
/// report success unless every record in the batch was durably accepted.
pub trait Producer {
    fn send(&self, batch: ProducerBatch, callback: SendCallback);
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct SendError(pub String);
