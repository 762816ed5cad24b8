use serde::Serialize;
use serde_json::{Map, Value};

use crate::event::{Opcode, RowImage};
use crate::gtid::Gtid;
use crate::table_info::ColumnInfo;

/// A single row mutation, fully self-describing: a downstream consumer
/// needs nothing but this struct (plus the checkpoint attached to its
/// batch) to apply the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub opcode: Opcode,
    pub gtid: String,
    pub timestamp: u64,
    pub db: String,
    pub table: String,
    pub key: Value,
    pub value: Value,
}

/// Joins one row image with its table's column metadata to produce a
/// change record: the key projection is restricted to
/// key-flagged columns, the value projection covers every column the
/// provider knows about. Columns beyond the row's own length, or row
/// values beyond the known column count, are ignored rather than causing
/// an error — a schema/row mismatch here is a caching staleness symptom,
/// not something this layer can correct.
pub fn shape_row(
    row: &RowImage,
    columns: &[ColumnInfo],
    opcode: Opcode,
    gtid: &Gtid,
    timestamp: u64,
    db: &str,
    table: &str,
) -> ChangeRecord {
    let mut key = Map::new();
    let mut value = Map::new();

    for column in columns {
        let Some(raw) = row.get(column.ordinal) else {
            continue;
        };
        let rendered = match raw {
            Some(s) => Value::String(s.clone()),
            None => Value::Null,
        };
        if column.is_key {
            key.insert(column.name.clone(), rendered.clone());
        }
        value.insert(column.name.clone(), rendered);
    }

    ChangeRecord {
        opcode,
        gtid: gtid.to_string(),
        timestamp,
        db: db.to_string(),
        table: table.to_string(),
        key: Value::Object(key),
        value: Value::Object(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo { name: "c1".to_string(), is_key: true, ordinal: 0 },
            ColumnInfo { name: "c2".to_string(), is_key: false, ordinal: 1 },
        ]
    }

    #[test]
    fn key_projection_is_restricted_to_key_columns() {
        let row: RowImage = vec![Some("1".to_string()), Some("x".to_string())];
        let gtid = Gtid::from_bytes(&(1..=16).collect::<Vec<u8>>(), 42);
        let record = shape_row(&row, &columns(), Opcode::Insert, &gtid, 1000, "d", "t");

        assert_eq!(record.key, serde_json::json!({ "c1": "1" }));
        assert_eq!(record.value, serde_json::json!({ "c1": "1", "c2": "x" }));
        assert_eq!(record.gtid, "01020304-0506-0708-090a-0b0c0d0e0f10:42");
    }

    #[test]
    fn null_values_render_as_json_null() {
        let row: RowImage = vec![Some("1".to_string()), None];
        let gtid = Gtid::none();
        let record = shape_row(&row, &columns(), Opcode::Update, &gtid, 1000, "d", "t");
        assert_eq!(record.value["c2"], Value::Null);
    }

    #[test]
    fn missing_row_values_are_skipped() {
        let row: RowImage = vec![Some("1".to_string())];
        let gtid = Gtid::none();
        let record = shape_row(&row, &columns(), Opcode::Delete, &gtid, 1000, "d", "t");
        assert!(!record.value.as_object().unwrap().contains_key("c2"));
    }
}
