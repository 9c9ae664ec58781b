//! The query catalog: every SQL statement the engine runs, indexed by
//! [`QueryKey`].
//!
//! Sortable kinds come in four orderings (id or name, ascending or
//! descending). Each variant is assembled at compile time with `concat!`, so
//! the sort/page path never builds SQL at request time. Only search queries
//! are built per request (see [`crate::search`]), from the templates at the
//! bottom of this module.

use std::fmt;

use folio_catalog::{EntityFamily, Sort};

use crate::search::{IdFilterTemplate, SearchTemplate};

// ── Fragments ───────────────────────────────────────────────────────────────
//
// Macros rather than consts so `concat!` can join them at compile time.
// Name orderings break ties on id so a primary page and the relation
// subquery over the same window always pick the same rows.

macro_rules! page {
    () => {
        " LIMIT ?1 OFFSET ?2"
    };
}

macro_rules! books_base {
    () => {
        "SELECT books.id, books.title, books.series_index, series.name, series.id \
         FROM books \
         LEFT OUTER JOIN books_series_link ON books.id = books_series_link.book \
         LEFT OUTER JOIN series ON series.id = books_series_link.series"
    };
}
macro_rules! books_id_asc {
    () => {
        " ORDER BY books.id"
    };
}
macro_rules! books_id_desc {
    () => {
        " ORDER BY books.id DESC"
    };
}
macro_rules! books_title_asc {
    () => {
        " ORDER BY books.sort, books.id"
    };
}
macro_rules! books_title_desc {
    () => {
        " ORDER BY books.sort DESC, books.id DESC"
    };
}

macro_rules! books_tags_base {
    () => {
        "SELECT tags.name, books_tags_link.book \
         FROM tags, books_tags_link \
         WHERE tags.id = books_tags_link.tag \
         AND books_tags_link.book IN (SELECT books.id FROM books"
    };
}
macro_rules! books_tags_end {
    () => {
        ") ORDER BY books_tags_link.book, tags.name"
    };
}

macro_rules! books_authors_base {
    () => {
        "SELECT authors.id, authors.name, books_authors_link.book \
         FROM authors, books_authors_link \
         WHERE books_authors_link.author = authors.id \
         AND books_authors_link.book IN (SELECT books.id FROM books"
    };
}
macro_rules! books_authors_end {
    () => {
        ") ORDER BY books_authors_link.id"
    };
}

macro_rules! authors_base {
    () => {
        "SELECT authors.id, authors.name, count(books_authors_link.book) \
         FROM authors, books_authors_link \
         WHERE authors.id = books_authors_link.author \
         GROUP BY authors.id"
    };
}
macro_rules! authors_id_asc {
    () => {
        " ORDER BY authors.id"
    };
}
macro_rules! authors_id_desc {
    () => {
        " ORDER BY authors.id DESC"
    };
}
macro_rules! authors_name_asc {
    () => {
        " ORDER BY authors.sort, authors.id"
    };
}
macro_rules! authors_name_desc {
    () => {
        " ORDER BY authors.sort DESC, authors.id DESC"
    };
}

macro_rules! series_base {
    () => {
        "SELECT series.id, series.name, count(books_series_link.book) \
         FROM series \
         LEFT OUTER JOIN books_series_link ON books_series_link.series = series.id \
         GROUP BY series.id"
    };
}
macro_rules! series_id_asc {
    () => {
        " ORDER BY series.id"
    };
}
macro_rules! series_id_desc {
    () => {
        " ORDER BY series.id DESC"
    };
}
macro_rules! series_name_asc {
    () => {
        " ORDER BY series.sort, series.id"
    };
}
macro_rules! series_name_desc {
    () => {
        " ORDER BY series.sort DESC, series.id DESC"
    };
}

macro_rules! series_authors_base {
    () => {
        "SELECT DISTINCT authors.id, authors.name, books_series_link.series \
         FROM authors, books_authors_link, books_series_link \
         WHERE books_authors_link.book = books_series_link.book \
         AND books_authors_link.author = authors.id \
         AND books_series_link.series IN (SELECT series.id FROM series"
    };
}
macro_rules! series_authors_end {
    () => {
        ") ORDER BY books_series_link.series, authors.name, authors.id"
    };
}

// ── Keys ────────────────────────────────────────────────────────────────────

/// Every distinct query shape in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKind {
    // Sortable, page-windowed.
    Books,
    BooksTags,
    BooksAuthors,
    Authors,
    Series,
    SeriesAuthors,
    // Single record and its relations.
    Book,
    BookTags,
    BookAuthors,
    BookFiles,
    BookCount,
    SeriesById,
    SeriesBooks,
    SeriesAuthorsById,
    Author,
    AuthorBooks,
    AuthorCoauthors,
}

impl QueryKind {
    pub const ALL: [QueryKind; 17] = [
        Self::Books,
        Self::BooksTags,
        Self::BooksAuthors,
        Self::Authors,
        Self::Series,
        Self::SeriesAuthors,
        Self::Book,
        Self::BookTags,
        Self::BookAuthors,
        Self::BookFiles,
        Self::BookCount,
        Self::SeriesById,
        Self::SeriesBooks,
        Self::SeriesAuthorsById,
        Self::Author,
        Self::AuthorBooks,
        Self::AuthorCoauthors,
    ];

    /// Whether the kind comes in id/name × asc/desc variants.
    pub fn is_sortable(self) -> bool {
        matches!(
            self,
            Self::Books
                | Self::BooksTags
                | Self::BooksAuthors
                | Self::Authors
                | Self::Series
                | Self::SeriesAuthors
        )
    }

    /// The entity family whose table drives the query.
    pub fn family(self) -> EntityFamily {
        match self {
            Self::Books
            | Self::BooksTags
            | Self::BooksAuthors
            | Self::Book
            | Self::BookTags
            | Self::BookAuthors
            | Self::BookFiles
            | Self::BookCount => EntityFamily::Book,
            Self::Authors | Self::Author | Self::AuthorBooks | Self::AuthorCoauthors => {
                EntityFamily::Author
            }
            Self::Series
            | Self::SeriesAuthors
            | Self::SeriesById
            | Self::SeriesBooks
            | Self::SeriesAuthorsById => EntityFamily::Series,
        }
    }
}

/// Composite key of the query catalog.
///
/// Fixed (non-sortable) kinds always have both flags cleared, so each of them
/// maps to exactly one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    kind: QueryKind,
    by_name: bool,
    desc: bool,
}

impl QueryKey {
    /// Key for a sortable kind in the given order. Fixed kinds ignore the sort.
    pub fn sorted(kind: QueryKind, sort: Sort) -> Self {
        if kind.is_sortable() {
            Self {
                kind,
                by_name: sort.by_name(),
                desc: sort.desc(),
            }
        } else {
            Self::fixed(kind)
        }
    }

    pub fn fixed(kind: QueryKind) -> Self {
        Self {
            kind,
            by_name: false,
            desc: false,
        }
    }

    pub fn kind(self) -> QueryKind {
        self.kind
    }

    pub fn by_name(self) -> bool {
        self.by_name
    }

    pub fn desc(self) -> bool {
        self.desc
    }

    /// Every key in the catalog.
    pub fn all() -> Vec<QueryKey> {
        let mut keys = Vec::with_capacity(35);
        for kind in QueryKind::ALL {
            if kind.is_sortable() {
                for by_name in [false, true] {
                    for desc in [false, true] {
                        keys.push(Self {
                            kind,
                            by_name,
                            desc,
                        });
                    }
                }
            } else {
                keys.push(Self::fixed(kind));
            }
        }
        keys
    }

    /// SQL text for this key.
    pub fn sql(self) -> &'static str {
        use QueryKind as K;
        match (self.kind, self.by_name, self.desc) {
            (K::Books, false, false) => concat!(books_base!(), books_id_asc!(), page!()),
            (K::Books, false, true) => concat!(books_base!(), books_id_desc!(), page!()),
            (K::Books, true, false) => concat!(books_base!(), books_title_asc!(), page!()),
            (K::Books, true, true) => concat!(books_base!(), books_title_desc!(), page!()),

            (K::BooksTags, false, false) => {
                concat!(books_tags_base!(), books_id_asc!(), page!(), books_tags_end!())
            }
            (K::BooksTags, false, true) => {
                concat!(books_tags_base!(), books_id_desc!(), page!(), books_tags_end!())
            }
            (K::BooksTags, true, false) => {
                concat!(books_tags_base!(), books_title_asc!(), page!(), books_tags_end!())
            }
            (K::BooksTags, true, true) => {
                concat!(books_tags_base!(), books_title_desc!(), page!(), books_tags_end!())
            }

            (K::BooksAuthors, false, false) => {
                concat!(books_authors_base!(), books_id_asc!(), page!(), books_authors_end!())
            }
            (K::BooksAuthors, false, true) => {
                concat!(books_authors_base!(), books_id_desc!(), page!(), books_authors_end!())
            }
            (K::BooksAuthors, true, false) => {
                concat!(books_authors_base!(), books_title_asc!(), page!(), books_authors_end!())
            }
            (K::BooksAuthors, true, true) => {
                concat!(books_authors_base!(), books_title_desc!(), page!(), books_authors_end!())
            }

            (K::Authors, false, false) => concat!(authors_base!(), authors_id_asc!(), page!()),
            (K::Authors, false, true) => concat!(authors_base!(), authors_id_desc!(), page!()),
            (K::Authors, true, false) => concat!(authors_base!(), authors_name_asc!(), page!()),
            (K::Authors, true, true) => concat!(authors_base!(), authors_name_desc!(), page!()),

            (K::Series, false, false) => concat!(series_base!(), series_id_asc!(), page!()),
            (K::Series, false, true) => concat!(series_base!(), series_id_desc!(), page!()),
            (K::Series, true, false) => concat!(series_base!(), series_name_asc!(), page!()),
            (K::Series, true, true) => concat!(series_base!(), series_name_desc!(), page!()),

            (K::SeriesAuthors, false, false) => {
                concat!(series_authors_base!(), series_id_asc!(), page!(), series_authors_end!())
            }
            (K::SeriesAuthors, false, true) => {
                concat!(series_authors_base!(), series_id_desc!(), page!(), series_authors_end!())
            }
            (K::SeriesAuthors, true, false) => {
                concat!(series_authors_base!(), series_name_asc!(), page!(), series_authors_end!())
            }
            (K::SeriesAuthors, true, true) => {
                concat!(series_authors_base!(), series_name_desc!(), page!(), series_authors_end!())
            }

            (K::Book, _, _) => SQL_BOOK,
            (K::BookTags, _, _) => SQL_BOOK_TAGS,
            (K::BookAuthors, _, _) => SQL_BOOK_AUTHORS,
            (K::BookFiles, _, _) => SQL_BOOK_FILES,
            (K::BookCount, _, _) => SQL_BOOK_COUNT,
            (K::SeriesById, _, _) => SQL_SERIES,
            (K::SeriesBooks, _, _) => SQL_SERIES_BOOKS,
            (K::SeriesAuthorsById, _, _) => SQL_SERIES_AUTHORS,
            (K::Author, _, _) => SQL_AUTHOR,
            (K::AuthorBooks, _, _) => SQL_AUTHOR_BOOKS,
            (K::AuthorCoauthors, _, _) => SQL_AUTHOR_COAUTHORS,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_sortable() {
            let field = if self.by_name { "name" } else { "id" };
            let dir = if self.desc { "desc" } else { "asc" };
            write!(f, "{:?}({field},{dir})", self.kind)
        } else {
            write!(f, "{:?}", self.kind)
        }
    }
}

// ── Single record queries ───────────────────────────────────────────────────

const SQL_BOOK: &str = "SELECT books.id, books.title, books.series_index, series.name, series.id, \
     CAST(strftime('%s', books.timestamp) AS INTEGER), \
     CAST(strftime('%Y', books.pubdate) AS INTEGER), \
     books.isbn, books.lccn, books.path, books.uuid, books.has_cover, \
     languages.lang_code, publishers.name \
     FROM books \
     LEFT OUTER JOIN books_languages_link ON books_languages_link.book = books.id \
     LEFT OUTER JOIN languages ON languages.id = books_languages_link.lang_code \
     LEFT OUTER JOIN books_series_link ON books.id = books_series_link.book \
     LEFT OUTER JOIN series ON series.id = books_series_link.series \
     LEFT OUTER JOIN books_publishers_link ON books.id = books_publishers_link.book \
     LEFT OUTER JOIN publishers ON publishers.id = books_publishers_link.publisher \
     WHERE books.id = ?1 \
     ORDER BY books_languages_link.item_order LIMIT 1";

const SQL_BOOK_TAGS: &str = "SELECT tags.name FROM tags, books_tags_link \
     WHERE tags.id = books_tags_link.tag AND books_tags_link.book = ?1 \
     ORDER BY tags.name";

const SQL_BOOK_AUTHORS: &str = "SELECT authors.id, authors.name FROM authors, books_authors_link \
     WHERE books_authors_link.author = authors.id AND books_authors_link.book = ?1 \
     ORDER BY books_authors_link.id";

const SQL_BOOK_FILES: &str = "SELECT data.name, data.format, data.uncompressed_size \
     FROM data WHERE data.book = ?1 ORDER BY data.format";

const SQL_BOOK_COUNT: &str = "SELECT count(id) FROM books";

const SQL_SERIES: &str = "SELECT series.id, series.name, count(books_series_link.book) \
     FROM series \
     LEFT OUTER JOIN books_series_link ON books_series_link.series = series.id \
     WHERE series.id = ?1 GROUP BY series.id";

const SQL_SERIES_BOOKS: &str = "SELECT books.id, books.title, books.series_index FROM books \
     JOIN books_series_link ON books.id = books_series_link.book \
     WHERE books_series_link.series = ?1 \
     ORDER BY books.series_index, books.id";

const SQL_SERIES_AUTHORS: &str = "SELECT DISTINCT authors.id, authors.name \
     FROM authors, books_authors_link, books_series_link \
     WHERE books_authors_link.book = books_series_link.book \
     AND books_authors_link.author = authors.id \
     AND books_series_link.series = ?1 \
     ORDER BY authors.name, authors.id";

const SQL_AUTHOR: &str = "SELECT authors.id, authors.name FROM authors WHERE authors.id = ?1";

const SQL_AUTHOR_BOOKS: &str = "SELECT books.id, books.title, books.series_index, series.name, series.id \
     FROM books \
     JOIN books_authors_link ON books.id = books_authors_link.book \
     LEFT OUTER JOIN books_series_link ON books.id = books_series_link.book \
     LEFT OUTER JOIN series ON series.id = books_series_link.series \
     WHERE books_authors_link.author = ?1 \
     ORDER BY books.id";

const SQL_AUTHOR_COAUTHORS: &str = "SELECT DISTINCT authors.id, authors.name \
     FROM authors, books_authors_link \
     WHERE books_authors_link.author = authors.id \
     AND books_authors_link.book IN \
         (SELECT book FROM books_authors_link WHERE author = ?1) \
     AND authors.id != ?1 \
     ORDER BY authors.id";

// ── Search templates ────────────────────────────────────────────────────────

pub(crate) const BOOKS_SEARCH: SearchTemplate = SearchTemplate {
    base: concat!(books_base!(), " WHERE "),
    predicate: "books.sort LIKE ? ESCAPE '\\'",
    suffix: " ORDER BY books.sort, books.id",
};

pub(crate) const AUTHORS_SEARCH: SearchTemplate = SearchTemplate {
    base: "SELECT authors.id, authors.name, count(books_authors_link.book) \
           FROM authors \
           LEFT OUTER JOIN books_authors_link ON authors.id = books_authors_link.author \
           WHERE ",
    predicate: "authors.sort LIKE ? ESCAPE '\\'",
    suffix: " GROUP BY authors.id ORDER BY authors.sort, authors.id",
};

pub(crate) const SERIES_SEARCH: SearchTemplate = SearchTemplate {
    base: "SELECT series.id, series.name, count(books_series_link.book) \
           FROM series \
           LEFT OUTER JOIN books_series_link ON books_series_link.series = series.id \
           WHERE ",
    predicate: "series.sort LIKE ? ESCAPE '\\'",
    suffix: " GROUP BY series.id ORDER BY series.sort, series.id",
};

// Relations of an explicit id set, used for search pages.

pub(crate) const BOOK_AUTHORS_FOR_IDS: IdFilterTemplate = IdFilterTemplate {
    base: "SELECT authors.id, authors.name, books_authors_link.book \
           FROM authors, books_authors_link \
           WHERE books_authors_link.author = authors.id \
           AND books_authors_link.book IN ",
    suffix: " ORDER BY books_authors_link.id",
};

pub(crate) const BOOK_TAGS_FOR_IDS: IdFilterTemplate = IdFilterTemplate {
    base: "SELECT tags.name, books_tags_link.book \
           FROM tags, books_tags_link \
           WHERE tags.id = books_tags_link.tag \
           AND books_tags_link.book IN ",
    suffix: " ORDER BY books_tags_link.book, tags.name",
};

pub(crate) const SERIES_AUTHORS_FOR_IDS: IdFilterTemplate = IdFilterTemplate {
    base: "SELECT DISTINCT authors.id, authors.name, books_series_link.series \
           FROM authors, books_authors_link, books_series_link \
           WHERE books_authors_link.book = books_series_link.book \
           AND books_authors_link.author = authors.id \
           AND books_series_link.series IN ",
    suffix: " ORDER BY books_series_link.series, authors.name, authors.id",
};

#[cfg(test)]
mod tests {
    use super::*;
    use folio_catalog::{Direction, SortField};

    #[test]
    fn catalog_has_35_distinct_keys() {
        let keys = QueryKey::all();
        assert_eq!(keys.len(), 35);
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 35);
    }

    #[test]
    fn fixed_kinds_ignore_sort() {
        let sort = Sort::new(SortField::Name, Direction::Desc);
        let key = QueryKey::sorted(QueryKind::Book, sort);
        assert_eq!(key, QueryKey::fixed(QueryKind::Book));
        assert!(!key.by_name() && !key.desc());
    }

    #[test]
    fn sortable_variants_differ_only_in_order() {
        let asc = QueryKey::sorted(QueryKind::Books, Sort::new(SortField::Name, Direction::Asc));
        let desc = QueryKey::sorted(QueryKind::Books, Sort::new(SortField::Name, Direction::Desc));
        assert!(asc.sql().ends_with("ORDER BY books.sort, books.id LIMIT ?1 OFFSET ?2"));
        assert!(desc.sql().ends_with("ORDER BY books.sort DESC, books.id DESC LIMIT ?1 OFFSET ?2"));
    }

    #[test]
    fn relation_window_uses_primary_ordering() {
        let sort = Sort::new(SortField::Id, Direction::Desc);
        let tags = QueryKey::sorted(QueryKind::BooksTags, sort).sql();
        assert!(
            tags.contains("(SELECT books.id FROM books ORDER BY books.id DESC LIMIT ?1 OFFSET ?2)")
        );
        let authors = QueryKey::sorted(QueryKind::SeriesAuthors, sort).sql();
        assert!(authors.contains(
            "(SELECT series.id FROM series ORDER BY series.id DESC LIMIT ?1 OFFSET ?2)"
        ));
    }

    #[test]
    fn display_names_the_variant() {
        let key = QueryKey::sorted(QueryKind::Authors, Sort::new(SortField::Name, Direction::Desc));
        assert_eq!(key.to_string(), "Authors(name,desc)");
        assert_eq!(QueryKey::fixed(QueryKind::BookCount).to_string(), "BookCount");
    }
}
