//! Library catalog data model and request normalization.
//!
//! This crate defines the read-only records served by the catalog (books,
//! authors, series and their aggregates) and the request types used to ask
//! for them, without any database dependencies. `folio-db` fills these types
//! from a Calibre library.

pub mod request;
pub mod types;

pub use request::{
    Direction, EntityFamily, ListRequest, MatchMode, PageRequest, SearchRequest, Sort, SortField,
    DEFAULT_PAGE_SIZE,
};
pub use types::*;
