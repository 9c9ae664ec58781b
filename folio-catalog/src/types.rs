//! Data model types for the library catalog.
//!
//! Primary records come straight from one row of a list query. Aggregates
//! carry the one-to-many relations merged in after the primary fetch, and
//! detail records are the fully loaded view of a single entity.

use serde::{Deserialize, Serialize};

// ── Series ──────────────────────────────────────────────────────────────────

/// A book series reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub name: String,
}

/// A series in a listing, with its book count and the authors of its books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    #[serde(flatten)]
    pub series: Series,
    pub count: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
}

/// A single series with every book in it, ordered by series index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDetail {
    #[serde(flatten)]
    pub summary: SeriesSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub books: Vec<Book>,
}

// ── Author ──────────────────────────────────────────────────────────────────

/// An author reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// An author in a listing, with the number of books credited to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    #[serde(flatten)]
    pub author: Author,
    pub count: i64,
}

/// A single author with their books, the series those books belong to,
/// and everyone they share a book with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub books: Vec<Book>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coauthors: Vec<Author>,
}

// ── Book ────────────────────────────────────────────────────────────────────

/// Basic book data as returned by list queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(rename = "series_idx")]
    pub series_index: f64,
    /// `None` when the book is not part of a series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Series>,
}

/// A book in a listing, with its authors and tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(flatten)]
    pub book: Book,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A downloadable file (one format) of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookFile {
    pub name: String,
    pub format: String,
    pub size: i64,
}

impl BookFile {
    /// Relative path of the file inside the book's library folder.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format.to_lowercase())
    }
}

/// Everything the catalog knows about one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub summary: BookSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<BookFile>,
    /// Date added to the library, as a Unix timestamp.
    pub timestamp: Option<i64>,
    /// Publication year.
    pub pubdate: Option<i64>,
    pub isbn: Option<String>,
    pub lccn: Option<String>,
    /// Book folder, relative to the library root.
    pub path: String,
    pub uuid: Option<String>,
    pub has_cover: bool,
    pub lang: Option<String>,
    pub publisher: Option<String>,
}

impl BookDetail {
    pub fn id(&self) -> i64 {
        self.summary.book.id
    }

    pub fn title(&self) -> &str {
        &self.summary.book.title
    }
}

// ── Listings ────────────────────────────────────────────────────────────────

/// Number of matches reported for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchCount {
    /// Every matching row was counted.
    Exact(usize),
    /// The scan stopped at a configured cap; at least this many rows match.
    AtLeast(usize),
}

impl SearchCount {
    pub fn value(self) -> usize {
        match self {
            Self::Exact(n) | Self::AtLeast(n) => n,
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// One page of results for an entity family.
///
/// `count` is only set for searches. A sorted page learns `more` by
/// overfetching a single row and never counts the whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub results: Vec<T>,
    pub more: bool,
    pub count: Option<SearchCount>,
}

impl<T> Listing<T> {
    pub fn page(results: Vec<T>, more: bool) -> Self {
        Self {
            results,
            more,
            count: None,
        }
    }

    pub fn search(results: Vec<T>, count: SearchCount, limit: usize) -> Self {
        let more = match count {
            SearchCount::Exact(n) => n > limit,
            SearchCount::AtLeast(_) => true,
        };
        Self {
            results,
            more,
            count: Some(count),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
