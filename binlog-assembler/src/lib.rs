//! MySQL binlog transaction assembler.
//!
//! Consumes a binlog event stream (delivered serially via [`on_event`]),
//! tracks open transactions, shapes row mutations into self-describing
//! [`row_shape::ChangeRecord`]s, and emits each transaction atomically to a
//! downstream [`emitter::Producer`] with a monotonic [`checkpoint::Checkpoint`].
//!
//! [`on_event`]: state_machine::Assembler::on_event

pub mod checkpoint;
pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod gtid;
pub mod kafka_emitter;
pub mod row_shape;
pub mod state_machine;
pub mod table_info;

pub use checkpoint::Checkpoint;
pub use config::AssemblerConfig;
pub use emitter::{Producer, ProducerBatch, SendCallback, SendError};
pub use error::{AssemblerError, Result};
pub use event::{BinlogEvent, EventHeader, Opcode, RowImage};
pub use gtid::Gtid;
pub use kafka_emitter::RdKafkaProducer;
pub use row_shape::ChangeRecord;
pub use state_machine::Assembler;
pub use table_info::{CachingTableInfo, ColumnInfo, TableInfoProvider};
