//! Per-request query context.

use rusqlite::{CachedStatement, Connection};

use crate::error::QueryError;
use crate::queries::QueryKey;
use crate::statements::StatementCache;
use crate::store::RequestScope;

/// The connection, statement cache and cancellation scope one request's
/// queries run against. Borrowed for the duration of a single checkout.
#[derive(Clone, Copy)]
pub struct QueryContext<'a> {
    pub conn: &'a Connection,
    pub statements: &'a StatementCache,
    pub scope: &'a RequestScope,
}

impl<'a> QueryContext<'a> {
    pub fn new(
        conn: &'a Connection,
        statements: &'a StatementCache,
        scope: &'a RequestScope,
    ) -> Self {
        Self {
            conn,
            statements,
            scope,
        }
    }

    /// Statement handle for a catalog key, compiling it on a cache miss.
    pub fn statement(&self, key: QueryKey) -> Result<CachedStatement<'a>, QueryError> {
        self.scope.check()?;
        let prepared = self.statements.get_or_compile(self.conn, key)?;
        prepared.statement(self.conn)
    }

    /// Statement handle for SQL built at request time (searches, id filters).
    pub fn dynamic(&self, sql: &str) -> Result<CachedStatement<'a>, QueryError> {
        self.scope.check()?;
        log::debug!("dynamic: {sql}");
        Ok(self.conn.prepare_cached(sql)?)
    }

    /// Checked between streamed rows.
    pub fn check(&self) -> Result<(), QueryError> {
        self.scope.check()
    }
}

/// Convert a row count or offset to an SQLite integer parameter.
pub(crate) fn sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
