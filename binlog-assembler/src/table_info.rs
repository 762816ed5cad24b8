use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

/// A single column of a table, as known to the schema provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub is_key: bool,
    pub ordinal: usize,
}

/// Synchronous source of column metadata for a `db.table`. Schema discovery
/// beyond what this trait exposes is out of scope here; an
/// implementation typically queries `information_schema` or a cached schema
/// registry snapshot.
pub trait TableInfoProvider {
    fn get_column_list(&self, db: &str, table: &str) -> Vec<ColumnInfo>;
}

/// Read-through cache over a [`TableInfoProvider`], keyed by `db.table`.
/// Caches for process lifetime: schema-change invalidation is not handled
/// here — after an `ALTER TABLE`, this cache will
/// keep serving the pre-change column list until the process restarts. A
/// single `RwLock` is enough because there is exactly one writer, the
/// assembler's own reader thread; it only needs to be safe for concurrent
/// reads if a caller shares it across threads.
pub struct CachingTableInfo<P> {
    inner: P,
    cache: RwLock<HashMap<String, Vec<ColumnInfo>>>,
}

impl<P: TableInfoProvider> CachingTableInfo<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(db: &str, table: &str) -> String {
        format!("{db}.{table}")
    }
}

impl<P: TableInfoProvider> TableInfoProvider for CachingTableInfo<P> {
    fn get_column_list(&self, db: &str, table: &str) -> Vec<ColumnInfo> {
        let key = Self::cache_key(db, table);

        if let Some(columns) = self.cache.read().unwrap().get(&key) {
            return columns.clone();
        }

        let columns = self.inner.get_column_list(db, table);
        debug!(db, table, columns = columns.len(), "fetched column list");
        self.cache
            .write()
            .unwrap()
            .insert(key, columns.clone());
        columns
    }
}
