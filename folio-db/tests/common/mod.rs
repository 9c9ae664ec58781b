#![allow(dead_code)]

use std::path::Path;

use folio_db::{Catalog, CatalogStore, EngineConfig, StoreConfig, create_schema, open_memory};
use rusqlite::Connection;

/// Seven books, five authors (one without books), three series (one empty).
///
/// Book 1 carries the full detail set: files, language, publisher, isbn.
/// Book 5 has two authors; book 6 has no series; book 7 has no authors and
/// a title full of LIKE wildcards.
pub const SAMPLE_LIBRARY: &str = r#"
INSERT INTO authors (id, name, sort) VALUES
    (1, 'Frank Herbert', 'Herbert, Frank'),
    (2, 'Isaac Asimov', 'Asimov, Isaac'),
    (3, 'Brian Herbert', 'Herbert, Brian'),
    (4, 'Kevin J. Anderson', 'Anderson, Kevin J.'),
    (5, 'Unread Author', 'Author, Unread');

INSERT INTO series (id, name, sort) VALUES
    (1, 'Dune', 'Dune'),
    (2, 'Foundation', 'Foundation'),
    (3, 'Empty Shelf', 'Empty Shelf');

INSERT INTO tags (id, name) VALUES (1, 'sf'), (2, 'classic'), (3, 'prequel');

INSERT INTO books (id, title, sort, series_index, timestamp, pubdate, isbn, lccn, path, uuid, has_cover) VALUES
    (1, 'Dune', 'Dune', 1.0, '2020-01-02 03:04:05+00:00', '1965-08-01 00:00:00+00:00',
        '9780441013593', '', 'Frank Herbert/Dune (1)', 'uuid-dune', 1),
    (2, 'Dune Messiah', 'Dune Messiah', 2.0, '2020-01-03 00:00:00+00:00', '1969-01-01 00:00:00+00:00',
        '', '', 'Frank Herbert/Dune Messiah (2)', 'uuid-messiah', 0),
    (3, 'Foundation', 'Foundation', 1.0, '2020-01-04 00:00:00+00:00', '1951-01-01 00:00:00+00:00',
        '', '', 'Isaac Asimov/Foundation (3)', 'uuid-foundation', 1),
    (4, 'Foundation and Empire', 'Foundation and Empire', 2.0, '2020-01-05 00:00:00+00:00',
        '1952-01-01 00:00:00+00:00', '', '', 'Isaac Asimov/Foundation and Empire (4)', 'uuid-empire', 0),
    (5, 'The Butlerian Jihad', 'Butlerian Jihad, The', 0.5, '2020-01-06 00:00:00+00:00',
        '2002-01-01 00:00:00+00:00', '', '', 'Brian Herbert/The Butlerian Jihad (5)', 'uuid-jihad', 0),
    (6, 'I, Robot', 'I, Robot', 1.0, '2020-01-07 00:00:00+00:00', '1950-01-01 00:00:00+00:00',
        '', '', 'Isaac Asimov/I, Robot (6)', 'uuid-robot', 0),
    (7, '100% Pure_Fiction', '100% Pure_Fiction', 1.0, '2020-01-08 00:00:00+00:00',
        '2001-01-01 00:00:00+00:00', '', '', 'Unknown/100% Pure_Fiction (7)', 'uuid-pure', 0);

INSERT INTO books_authors_link (id, book, author) VALUES
    (1, 1, 1), (2, 2, 1), (3, 3, 2), (4, 4, 2), (5, 5, 3), (6, 5, 4), (7, 6, 2);

INSERT INTO books_series_link (book, series) VALUES
    (1, 1), (2, 1), (5, 1), (3, 2), (4, 2);

INSERT INTO books_tags_link (book, tag) VALUES
    (1, 1), (1, 2), (2, 1), (3, 1), (3, 2), (5, 3);

INSERT INTO languages (id, lang_code) VALUES (1, 'eng'), (2, 'fra');
INSERT INTO books_languages_link (book, lang_code, item_order) VALUES (1, 1, 0), (1, 2, 1);

INSERT INTO publishers (id, name, sort) VALUES (1, 'Chilton Books', 'Chilton Books');
INSERT INTO books_publishers_link (book, publisher) VALUES (1, 1);

INSERT INTO data (book, format, uncompressed_size, name) VALUES
    (1, 'EPUB', 1024, 'Dune - Frank Herbert'),
    (1, 'PDF', 4096, 'Dune - Frank Herbert');
"#;

/// In-memory connection with the schema and the sample library.
pub fn sample_connection() -> Connection {
    let conn = open_memory().unwrap();
    conn.execute_batch(SAMPLE_LIBRARY).unwrap();
    conn
}

/// Catalog over an in-memory sample library.
pub fn sample_catalog() -> Catalog {
    catalog_with(EngineConfig::default())
}

pub fn catalog_with(config: EngineConfig) -> Catalog {
    Catalog::new(CatalogStore::from_connection(sample_connection()), config)
}

/// Catalog over an in-memory library holding only the given book titles,
/// with ids assigned in order.
pub fn catalog_of_titles(titles: &[&str]) -> Catalog {
    let conn = open_memory().unwrap();
    for title in titles {
        conn.execute(
            "INSERT INTO books (title, sort) VALUES (?1, ?1)",
            [title],
        )
        .unwrap();
    }
    Catalog::new(CatalogStore::from_connection(conn), EngineConfig::default())
}

/// Catalog over an in-memory library of `count` books titled "title 1",
/// "title 2", and so on.
pub fn catalog_of_generated_books(count: usize) -> Catalog {
    let conn = open_memory().unwrap();
    conn.execute(
        "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < ?1) \
         INSERT INTO books (title, sort) SELECT 'title ' || i, 'title ' || i FROM n",
        [count as i64],
    )
    .unwrap();
    Catalog::new(CatalogStore::from_connection(conn), EngineConfig::default())
}

/// Write the sample library to a database file at `path`.
pub fn write_sample_library(path: &Path) {
    let conn = Connection::open(path).unwrap();
    create_schema(&conn).unwrap();
    conn.execute_batch(SAMPLE_LIBRARY).unwrap();
    conn.close().unwrap();
}

/// Pooled read-only catalog over a sample library file.
pub fn file_catalog(path: &Path, pool_size: usize) -> Catalog {
    write_sample_library(path);
    let store = StoreConfig {
        pool_size,
        ..StoreConfig::default()
    };
    Catalog::open(path, &store, EngineConfig::default()).unwrap()
}
