use std::sync::{Arc, Mutex};

use common_kafka::transaction::TransactionalProducer;
use tokio::runtime::Handle;
use tracing::{error, warn};

use crate::emitter::{Producer, ProducerBatch, SendCallback, SendError};
use crate::row_shape::ChangeRecord;

/// `Producer` implementation backed by `common_kafka`'s transactional
/// producer: one Kafka transaction per batch, so the "fully accepted or
/// fully failed" contract is enforced by the broker itself rather
/// than by bookkeeping in this crate.
///
/// The producer is taken out of its slot for the duration of a send and put
/// back once the transaction resolves, matching `TransactionalProducer`'s
/// consuming `begin`/`commit`/`abort` API (`common/kafka/src/transaction.rs`).
/// Only one send can be in flight at a time; a second `send` call while one
/// is outstanding fails fast with `producer unavailable` rather than
/// queueing, since this crate emits one batch per committed transaction and
/// the assembler itself is driven by a single serial reader.
pub struct RdKafkaProducer {
    producer: Arc<Mutex<Option<TransactionalProducer>>>,
    topic: String,
    runtime: Handle,
}

impl RdKafkaProducer {
    pub fn new(producer: TransactionalProducer, topic: impl Into<String>, runtime: Handle) -> Self {
        Self {
            producer: Arc::new(Mutex::new(Some(producer))),
            topic: topic.into(),
            runtime,
        }
    }
}

impl Producer for RdKafkaProducer {
    fn send(&self, batch: ProducerBatch, callback: SendCallback) {
        let producer = Arc::clone(&self.producer);
        let topic = self.topic.clone();
        self.runtime.spawn(async move {
            let result = send_batch(&producer, &topic, batch).await;
            if let Err(err) = &result {
                error!("batch send failed: {err}");
            }
            callback(result);
        });
    }
}

async fn send_batch(
    producer: &Arc<Mutex<Option<TransactionalProducer>>>,
    topic: &str,
    batch: ProducerBatch,
) -> Result<(), SendError> {
    let taken = {
        let mut guard = producer.lock().unwrap();
        guard.take()
    };
    let Some(inner) = taken else {
        return Err(SendError("producer unavailable: a send is already in flight".to_string()));
    };

    let transaction = match inner.begin() {
        Ok(txn) => txn,
        Err(err) => return Err(SendError(format!("failed to begin transaction: {err}"))),
    };

    let checkpoint = batch.checkpoint.clone();
    let send_result = transaction
        .send_keyed_iter_to_kafka(
            topic,
            |_: &ChangeRecord| None::<String>,
            batch.records,
        )
        .await;

    match send_result {
        Ok(()) => match transaction.commit() {
            Ok(restored) => {
                *producer.lock().unwrap() = Some(restored);
                Ok(())
            }
            Err(err) => Err(SendError(format!(
                "failed to commit batch at checkpoint {checkpoint}: {err}"
            ))),
        },
        Err(err) => {
            warn!("aborting batch at checkpoint {checkpoint}: {err}");
            match transaction.abort() {
                Ok(restored) => {
                    *producer.lock().unwrap() = Some(restored);
                }
                Err(abort_err) => {
                    error!("failed to abort transaction after send failure: {abort_err}");
                }
            }
            Err(SendError(format!("failed to send batch: {err}")))
        }
    }
}
