use serde::Serialize;

use crate::error::{AssemblerError, Result};

/// One row's values, indexed by column ordinal. `None` represents SQL NULL.
/// Values are already stringified at this layer — physical row encoding is
/// out of scope.
pub type RowImage = Vec<Option<String>>;

/// Common header carried by every binlog event: its timestamp and the
/// reader's position immediately after it. The assembler records both on
/// its open transaction for every event it sees, including events that are
/// never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHeader {
    pub timestamp: u64,
    pub position: u64,
}

/// The typed union of binlog events the assembler's `on_event` callback
/// receives, as delivered by the upstream replication client.
#[derive(Debug, Clone)]
pub enum BinlogEvent {
    Rotate {
        file: String,
    },
    FormatDescription {
        file: String,
    },
    Stop,
    Gtid {
        source_bytes: Vec<u8>,
        sequence: u64,
    },
    Query {
        sql: String,
    },
    Xid {
        xid: u64,
    },
    TableMap {
        table_id: u64,
        db: String,
        table: String,
    },
    WriteRows {
        table_id: u64,
        rows: Vec<RowImage>,
    },
    WriteRowsV2 {
        table_id: u64,
        rows: Vec<RowImage>,
    },
    UpdateRows {
        table_id: u64,
        rows: Vec<RowImage>,
    },
    UpdateRowsV2 {
        table_id: u64,
        rows: Vec<RowImage>,
    },
    DeleteRows {
        table_id: u64,
        rows: Vec<RowImage>,
    },
    DeleteRowsV2 {
        table_id: u64,
        rows: Vec<RowImage>,
    },
    /// Anything else the replication client can hand us; carries only the
    /// event's name for logging.
    Unknown {
        type_name: &'static str,
    },
}

/// Row-mutation opcode. `UPDATE` events only ever supply the after-image
/// rows at this layer; the before-image, if the upstream client
/// exposes one, isn't represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Opcode::Insert => "INSERT",
            Opcode::Update => "UPDATE",
            Opcode::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

impl BinlogEvent {
    /// Derives the row-mutation opcode for the row-event variants.
    ///
    /// `DeleteRowsEvent` and `DeleteRowsEventV2` both normalize to
    /// `Opcode::Delete`. A dispatch table that instead swaps the two
    /// constants for this pair — V2 reporting V1's type and vice versa —
    /// would be a classifier bug, not an intended behavior; this
    /// implementation keeps the pair aligned.
    ///
    /// Returns `UnknownOpcode` for any variant that isn't a row mutation,
    /// which indicates a classifier/call-site mismatch and is fatal.
    pub fn get_opcode(&self) -> Result<Opcode> {
        match self {
            BinlogEvent::WriteRows { .. } | BinlogEvent::WriteRowsV2 { .. } => Ok(Opcode::Insert),
            BinlogEvent::UpdateRows { .. } | BinlogEvent::UpdateRowsV2 { .. } => Ok(Opcode::Update),
            BinlogEvent::DeleteRows { .. } | BinlogEvent::DeleteRowsV2 { .. } => Ok(Opcode::Delete),
            other => Err(AssemblerError::UnknownOpcode(other.type_name())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            BinlogEvent::Rotate { .. } => "Rotate",
            BinlogEvent::FormatDescription { .. } => "FormatDescription",
            BinlogEvent::Stop => "Stop",
            BinlogEvent::Gtid { .. } => "Gtid",
            BinlogEvent::Query { .. } => "Query",
            BinlogEvent::Xid { .. } => "Xid",
            BinlogEvent::TableMap { .. } => "TableMap",
            BinlogEvent::WriteRows { .. } => "WriteRows",
            BinlogEvent::WriteRowsV2 { .. } => "WriteRowsV2",
            BinlogEvent::UpdateRows { .. } => "UpdateRows",
            BinlogEvent::UpdateRowsV2 { .. } => "UpdateRowsV2",
            BinlogEvent::DeleteRows { .. } => "DeleteRows",
            BinlogEvent::DeleteRowsV2 { .. } => "DeleteRowsV2",
            BinlogEvent::Unknown { type_name } => type_name,
        }
    }

    pub(crate) fn table_id_and_rows(&self) -> Option<(u64, &[RowImage])> {
        match self {
            BinlogEvent::WriteRows { table_id, rows }
            | BinlogEvent::WriteRowsV2 { table_id, rows }
            | BinlogEvent::UpdateRows { table_id, rows }
            | BinlogEvent::UpdateRowsV2 { table_id, rows }
            | BinlogEvent::DeleteRows { table_id, rows }
            | BinlogEvent::DeleteRowsV2 { table_id, rows } => Some((*table_id, rows)),
            _ => None,
        }
    }
}
