//! Process-wide statement cache keyed by [`QueryKey`].
//!
//! A [`PreparedQuery`] is a catalog entry that has been compiled against the
//! library schema: its SQL is known to be valid and its parameter and column
//! counts are recorded. SQLite statement handles belong to a connection, so
//! the handle itself lives in each pooled connection's `prepare_cached`
//! cache; this cache decides which keys are known good and compiles the rest
//! on demand.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rusqlite::{CachedStatement, Connection};

use crate::error::QueryError;
use crate::queries::QueryKey;

/// A catalog query validated against the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    key: QueryKey,
    sql: &'static str,
    parameter_count: usize,
    column_count: usize,
}

impl PreparedQuery {
    pub fn key(&self) -> QueryKey {
        self.key
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// The connection's cached statement handle for this query.
    pub fn statement<'c>(&self, conn: &'c Connection) -> Result<CachedStatement<'c>, QueryError> {
        log::debug!("{}: {}", self.key, self.sql);
        Ok(conn.prepare_cached(self.sql)?)
    }
}

/// Outcome of compiling the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimeReport {
    pub compiled: usize,
    pub failed: Vec<QueryKey>,
}

impl PrimeReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read-mostly map from catalog key to compiled query.
///
/// Lookups take a shared lock. A miss compiles outside any lock and inserts
/// the finished entry; two requests missing the same key at once both
/// compile and the first insert wins. Entries are only ever inserted whole.
#[derive(Debug, Default)]
pub struct StatementCache {
    entries: RwLock<HashMap<QueryKey, Arc<PreparedQuery>>>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `key`, compiling it on `conn` if missing.
    pub fn get_or_compile(
        &self,
        conn: &Connection,
        key: QueryKey,
    ) -> Result<Arc<PreparedQuery>, QueryError> {
        if let Some(prepared) = self.read().get(&key) {
            return Ok(Arc::clone(prepared));
        }

        log::warn!("Missing statement for {key}, compiling on demand");
        let prepared = Arc::new(compile(conn, key)?);
        let mut entries = self.write();
        Ok(Arc::clone(entries.entry(key).or_insert(prepared)))
    }

    /// Compile every catalog key on `conn`.
    ///
    /// Each failure is logged with its key and SQL; keys that compile are
    /// cached regardless. Returns [`QueryError::Prime`] if any key failed.
    pub fn prime(&self, conn: &Connection) -> Result<PrimeReport, QueryError> {
        let keys = QueryKey::all();
        let total = keys.len();
        let mut report = PrimeReport::default();
        for key in keys {
            match compile(conn, key) {
                Ok(prepared) => {
                    self.write().insert(key, Arc::new(prepared));
                    report.compiled += 1;
                }
                Err(e) => {
                    log::error!("{e}\n  {}", key.sql());
                    report.failed.push(key);
                }
            }
        }
        if report.is_ok() {
            log::debug!("Compiled {} catalog queries", report.compiled);
            Ok(report)
        } else {
            Err(QueryError::Prime {
                failed: report.failed.len(),
                total,
            })
        }
    }

    pub fn contains(&self, key: QueryKey) -> bool {
        self.read().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every entry. Used at shutdown before the connections close.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<QueryKey, Arc<PreparedQuery>>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<QueryKey, Arc<PreparedQuery>>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn compile(conn: &Connection, key: QueryKey) -> Result<PreparedQuery, QueryError> {
    let sql = key.sql();
    let stmt = conn
        .prepare_cached(sql)
        .map_err(|source| QueryError::Configuration { key, source })?;
    Ok(PreparedQuery {
        key,
        sql,
        parameter_count: stmt.parameter_count(),
        column_count: stmt.column_count(),
    })
}
