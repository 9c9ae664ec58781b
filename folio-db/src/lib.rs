//! Read-only query engine over a Calibre library database.
//!
//! Turns list, search and detail requests from `folio-catalog` into SQLite
//! queries (via rusqlite with bundled feature), with bounded-cost pagination
//! and batched relation loading. [`Catalog`] is the entry point.

pub mod aggregate;
pub mod context;
pub mod engine;
pub mod error;
pub mod listing;
pub mod queries;
pub mod relations;
pub mod schema;
pub mod search;
pub mod statements;
pub mod store;

pub use context::QueryContext;
pub use engine::{Catalog, EngineConfig};
pub use error::QueryError;
pub use queries::{QueryKey, QueryKind};
pub use relations::RelationMap;
pub use schema::{REQUIRED_TABLES, SchemaError, check_schema, create_schema, open_memory};
pub use search::{SearchQuery, build_search, substring_pattern};
pub use statements::{PreparedQuery, PrimeReport, StatementCache};
pub use store::{CatalogStore, RequestScope, StoreConfig};
