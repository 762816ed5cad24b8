use std::fmt;

/// Global transaction identifier: a source UUID plus a monotonically
/// increasing sequence number within that source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gtid {
    pub source_id: String,
    pub sequence: u64,
}

impl Gtid {
    /// The GTID with no transaction observed yet: source-id is the literal
    /// `"None"` and sequence is zero, matching the description of
    /// the state before a `GtidEvent` has arrived for the open transaction.
    pub fn none() -> Self {
        Self {
            source_id: "None".to_string(),
            sequence: 0,
        }
    }

    pub fn from_bytes(source_bytes: &[u8], sequence: u64) -> Self {
        Self {
            source_id: format_source_id(source_bytes),
            sequence,
        }
    }
}

impl fmt::Display for Gtid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_id, self.sequence)
    }
}

/// Renders a source-id byte sequence as `aabbccdd-eeff-gghh-iijj-kkllmmnnoopp`
/// using byte-length groups `4-2-2-2-6` over a 16-byte input. Short inputs
/// are zero-padded to 16 bytes before grouping; over-long inputs are
/// truncated to the first 16 bytes. Neither case is expected in practice —
/// binlog GTID event payloads are always 16 bytes — but the formatter must
/// not panic on malformed input.
pub fn format_source_id(bytes: &[u8]) -> String {
    const GROUPS: [usize; 5] = [4, 2, 2, 2, 6];

    let mut padded = [0u8; 16];
    let take = bytes.len().min(16);
    padded[..take].copy_from_slice(&bytes[..take]);

    let mut groups = Vec::with_capacity(GROUPS.len());
    let mut offset = 0;
    for len in GROUPS {
        let chunk = &padded[offset..offset + len];
        let hex: String = chunk.iter().map(|b| format!("{b:02x}")).collect();
        groups.push(hex);
        offset += len;
    }
    groups.join("-")
}
