use std::fmt;

/// Opaque resume token handed to the downstream producer alongside each
/// emitted batch. Its exact textual form is a contract with the downstream
/// consumer; this crate only guarantees it encodes the four
/// fields and that successive checkpoints are non-decreasing in
/// `(file, position)` order for a single assembler instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub source_id: String,
    pub sequence: u64,
    pub file: String,
    pub position: u64,
}

impl Checkpoint {
    pub fn new(source_id: impl Into<String>, sequence: u64, file: impl Into<String>, position: u64) -> Self {
        Self {
            source_id: source_id.into(),
            sequence,
            file: file.into(),
            position,
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}:{}",
            self.source_id, self.sequence, self.file, self.position
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_encodes_all_four_fields() {
        let checkpoint = Checkpoint::new("src", 42, "binlog.000002", 1024);
        assert_eq!(checkpoint.to_string(), "src:42@binlog.000002:1024");
    }
}
