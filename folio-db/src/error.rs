//! Error type shared by every catalog query.

use folio_catalog::EntityFamily;
use rusqlite::ErrorCode;
use thiserror::Error;

use crate::queries::QueryKey;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Query execution or row decoding failed in the store.
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),
    /// A catalog query does not compile against the library schema.
    #[error("Query {key} does not compile: {source}")]
    Configuration {
        key: QueryKey,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{failed} of {total} catalog queries failed to compile, see logs")]
    Prime { failed: usize, total: usize },
    #[error("No {family} with id {id}")]
    NotFound { family: EntityFamily, id: i64 },
    #[error("Request cancelled")]
    Cancelled,
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        // An interrupted statement means the request scope was cancelled
        if err.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
            Self::Cancelled
        } else {
            Self::Sqlite(err)
        }
    }
}
