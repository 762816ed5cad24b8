use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::checkpoint::Checkpoint;
use crate::emitter::{Producer, ProducerBatch};
use crate::error::Result;
use crate::event::{BinlogEvent, EventHeader};
use crate::gtid::Gtid;
use crate::row_shape::shape_row;
use crate::table_info::TableInfoProvider;

struct TxnState {
    gtid: Gtid,
    table_map: HashMap<u64, (String, String)>,
    pending: Vec<crate::row_shape::ChangeRecord>,
    position: u64,
    timestamp: u64,
}

enum AssemblerState {
    Idle,
    InTxn(TxnState),
}

/// Drives transaction assembly from a serial stream of binlog events. Owns
/// the current file name (survives rollbacks and transaction boundaries),
/// the open transaction if any, and the collaborators needed to turn row
/// events into change records.
pub struct Assembler<P, T> {
    state: AssemblerState,
    current_file: String,
    table_info: T,
    producer: P,
}

impl<P: Producer, T: TableInfoProvider> Assembler<P, T> {
    pub fn new(table_info: T, producer: P) -> Self {
        Self {
            state: AssemblerState::Idle,
            current_file: String::new(),
            table_info,
            producer,
        }
    }

    pub fn current_file(&self) -> &str {
        &self.current_file
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, AssemblerState::Idle)
    }

    /// Processes one binlog event. Returns `Err` only for `UnknownOpcode`,
    /// which indicates a classifier/event mismatch and is fatal — the
    /// caller is expected to fail hard rather than keep reading.
    pub fn on_event(&mut self, header: EventHeader, event: BinlogEvent) -> Result<()> {
        match &event {
            BinlogEvent::Rotate { file } | BinlogEvent::FormatDescription { file } => {
                self.current_file = file.clone();
                debug!(file = %self.current_file, "updated current binlog file");
            }
            _ => {}
        }

        if let AssemblerState::InTxn(txn) = &mut self.state {
            // Every event observed while a transaction is open moves the
            // recorded position/timestamp forward, even events that are
            // never themselves emitted.
            txn.position = header.position;
            txn.timestamp = header.timestamp;
        }

        match event {
            BinlogEvent::Rotate { .. } | BinlogEvent::FormatDescription { .. } | BinlogEvent::Stop => {}
            BinlogEvent::Gtid { source_bytes, sequence } => {
                self.open_txn(Gtid::from_bytes(&source_bytes, sequence), header);
            }
            BinlogEvent::Query { sql } => self.handle_query(&sql, header)?,
            BinlogEvent::Xid { .. } => self.close_txn_and_emit()?,
            BinlogEvent::TableMap { table_id, db, table } => {
                self.record_table_map(table_id, db, table);
            }
            BinlogEvent::WriteRows { .. }
            | BinlogEvent::WriteRowsV2 { .. }
            | BinlogEvent::UpdateRows { .. }
            | BinlogEvent::UpdateRowsV2 { .. }
            | BinlogEvent::DeleteRows { .. }
            | BinlogEvent::DeleteRowsV2 { .. } => self.handle_row_event(event)?,
            BinlogEvent::Unknown { type_name } => {
                warn!(event = type_name, "unknown binlog event type; skipped");
            }
        }

        Ok(())
    }

    fn open_txn(&mut self, gtid: Gtid, header: EventHeader) {
        if let AssemblerState::InTxn(_) = &self.state {
            warn!("received transaction-start while one was already open; ignoring");
            return;
        }
        info!(gtid = %gtid, "opening transaction");
        self.state = AssemblerState::InTxn(TxnState {
            gtid,
            table_map: HashMap::new(),
            pending: Vec::new(),
            position: header.position,
            timestamp: header.timestamp,
        });
    }

    fn handle_query(&mut self, sql: &str, header: EventHeader) -> Result<()> {
        match sql {
            "BEGIN" => self.open_txn(Gtid::none(), header),
            "COMMIT" => self.close_txn_and_emit()?,
            "ROLLBACK" => self.rollback(),
            other => debug!(sql = other, "ignorable query event"),
        }
        Ok(())
    }

    fn close_txn_and_emit(&mut self) -> Result<()> {
        let AssemblerState::InTxn(txn) = std::mem::replace(&mut self.state, AssemblerState::Idle)
        else {
            return Ok(());
        };

        if txn.pending.is_empty() {
            info!("closing empty transaction; nothing to emit");
            return Ok(());
        }

        let checkpoint = Checkpoint::new(
            txn.gtid.source_id.clone(),
            txn.gtid.sequence,
            self.current_file.clone(),
            txn.position,
        );
        let record_count = txn.pending.len();
        let batch = ProducerBatch::new(checkpoint.to_string(), txn.pending);
        info!(records = record_count, checkpoint = %batch.checkpoint, "emitting batch");

        self.producer.send(
            batch,
            Box::new(|result| {
                if let Err(err) = result {
                    // A failed send must be
                    // surfaced to a supervisor that can close the producer
                    // and rewind to the last durable checkpoint. This layer
                    // never silently acknowledges a failed batch.
                    error!("batch send failed, supervisor rewind required: {err}");
                }
            }),
        );

        Ok(())
    }

    fn rollback(&mut self) {
        if matches!(self.state, AssemblerState::InTxn(_)) {
            info!("rolling back transaction; discarding pending records");
        }
        self.state = AssemblerState::Idle;
    }

    fn record_table_map(&mut self, table_id: u64, db: String, table: String) {
        match &mut self.state {
            AssemblerState::InTxn(txn) => {
                txn.table_map.insert(table_id, (db, table));
            }
            AssemblerState::Idle => {
                warn!(table_id, "table map event outside open transaction; skipped");
            }
        }
    }

    fn handle_row_event(&mut self, event: BinlogEvent) -> Result<()> {
        let opcode = event.get_opcode()?;
        let Some((table_id, rows)) = event.table_id_and_rows() else {
            return Ok(());
        };

        let (db, table, gtid, timestamp) = {
            let AssemblerState::InTxn(txn) = &mut self.state else {
                warn!("row event outside open transaction; skipped");
                return Ok(());
            };
            let Some((db, table)) = txn.table_map.get(&table_id).cloned() else {
                error!(table_id, "unknown table-id at row time; event skipped");
                return Ok(());
            };
            (db, table, txn.gtid.clone(), txn.timestamp)
        };

        for row in rows {
            let columns = self.table_info.get_column_list(&db, &table);
            let record = shape_row(row, &columns, opcode, &gtid, timestamp, &db, &table);
            if let AssemblerState::InTxn(txn) = &mut self.state {
                txn.pending.push(record);
            }
        }

        Ok(())
    }
}
