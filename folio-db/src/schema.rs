//! Calibre library schema: presence check and a creation helper.
//!
//! The library database is owned by Calibre; this crate never migrates it.
//! [`check_schema`] verifies that every table the query catalog reads is
//! present. [`create_schema`] builds the same subset of the Calibre schema
//! for tests and demo libraries.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Library database has no '{0}' table. Is this a Calibre metadata.db?")]
    MissingTable(String),
}

/// Tables read by the query catalog.
pub const REQUIRED_TABLES: &[&str] = &[
    "books",
    "authors",
    "series",
    "tags",
    "data",
    "languages",
    "publishers",
    "books_authors_link",
    "books_series_link",
    "books_tags_link",
    "books_languages_link",
    "books_publishers_link",
];

/// Fail with the first required table that does not exist.
pub fn check_schema(conn: &Connection) -> Result<(), SchemaError> {
    let mut stmt = conn
        .prepare("SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)")?;
    for table in REQUIRED_TABLES {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            return Err(SchemaError::MissingTable(table.to_string()));
        }
    }
    Ok(())
}

/// Create the catalog tables if they don't exist.
///
/// Idempotent: existing tables and indexes are left alone.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Open an in-memory database with the catalog schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL DEFAULT 'Unknown' COLLATE NOCASE,
    sort TEXT COLLATE NOCASE,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    pubdate TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    series_index REAL NOT NULL DEFAULT 1.0,
    author_sort TEXT COLLATE NOCASE,
    isbn TEXT DEFAULT '' COLLATE NOCASE,
    lccn TEXT DEFAULT '' COLLATE NOCASE,
    path TEXT NOT NULL DEFAULT '',
    flags INTEGER NOT NULL DEFAULT 1,
    uuid TEXT,
    has_cover BOOL DEFAULT 0,
    last_modified TIMESTAMP NOT NULL DEFAULT '2000-01-01 00:00:00+00:00'
);
CREATE INDEX IF NOT EXISTS books_idx ON books (sort COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS authors (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE,
    sort TEXT COLLATE NOCASE,
    link TEXT NOT NULL DEFAULT '',
    UNIQUE(name)
);
CREATE INDEX IF NOT EXISTS authors_idx ON authors (sort COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS series (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE,
    sort TEXT COLLATE NOCASE,
    UNIQUE (name)
);
CREATE INDEX IF NOT EXISTS series_idx ON series (sort COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE,
    UNIQUE (name)
);

CREATE TABLE IF NOT EXISTS languages (
    id INTEGER PRIMARY KEY,
    lang_code TEXT NOT NULL COLLATE NOCASE,
    UNIQUE(lang_code)
);

CREATE TABLE IF NOT EXISTS publishers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE,
    sort TEXT COLLATE NOCASE,
    UNIQUE(name)
);

CREATE TABLE IF NOT EXISTS data (
    id INTEGER PRIMARY KEY,
    book INTEGER NOT NULL,
    format TEXT NOT NULL COLLATE NOCASE,
    uncompressed_size INTEGER NOT NULL,
    name TEXT NOT NULL,
    UNIQUE(book, format)
);
CREATE INDEX IF NOT EXISTS data_idx ON data (book);

CREATE TABLE IF NOT EXISTS books_authors_link (
    id INTEGER PRIMARY KEY,
    book INTEGER NOT NULL,
    author INTEGER NOT NULL,
    UNIQUE(book, author)
);
CREATE INDEX IF NOT EXISTS books_authors_link_bidx ON books_authors_link (book);
CREATE INDEX IF NOT EXISTS books_authors_link_aidx ON books_authors_link (author);

CREATE TABLE IF NOT EXISTS books_series_link (
    id INTEGER PRIMARY KEY,
    book INTEGER NOT NULL,
    series INTEGER NOT NULL,
    UNIQUE(book)
);
CREATE INDEX IF NOT EXISTS books_series_link_bidx ON books_series_link (book);
CREATE INDEX IF NOT EXISTS books_series_link_sidx ON books_series_link (series);

CREATE TABLE IF NOT EXISTS books_tags_link (
    id INTEGER PRIMARY KEY,
    book INTEGER NOT NULL,
    tag INTEGER NOT NULL,
    UNIQUE(book, tag)
);
CREATE INDEX IF NOT EXISTS books_tags_link_bidx ON books_tags_link (book);
CREATE INDEX IF NOT EXISTS books_tags_link_tidx ON books_tags_link (tag);

CREATE TABLE IF NOT EXISTS books_languages_link (
    id INTEGER PRIMARY KEY,
    book INTEGER NOT NULL,
    lang_code INTEGER NOT NULL,
    item_order INTEGER NOT NULL DEFAULT 0,
    UNIQUE(book, lang_code)
);
CREATE INDEX IF NOT EXISTS books_languages_link_bidx ON books_languages_link (book);

CREATE TABLE IF NOT EXISTS books_publishers_link (
    id INTEGER PRIMARY KEY,
    book INTEGER NOT NULL,
    publisher INTEGER NOT NULL,
    UNIQUE(book)
);
CREATE INDEX IF NOT EXISTS books_publishers_link_bidx ON books_publishers_link (book);
"#;
