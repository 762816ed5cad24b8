use thiserror::Error;

/// Fatal failures surfaced from the assembler.
///
/// `UnknownOpcode` indicates a classifier/event mismatch and is treated as a
/// supervisor-crash condition rather than something a caller can recover
/// from in place. Non-fatal anomalies (an unknown table-id at row time) are
/// not represented here — they're logged at the call site and the event is
/// skipped, and processing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    #[error("unknown opcode for event variant {0}")]
    UnknownOpcode(&'static str),
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
