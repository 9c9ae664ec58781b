//! Merge primary records with their relations, and assemble detail records.

use std::collections::BTreeMap;

use folio_catalog::{
    Author, AuthorDetail, Book, BookDetail, BookSummary, EntityFamily, Series, SeriesDetail,
    SeriesSummary,
};
use rusqlite::OptionalExtension;

use crate::context::QueryContext;
use crate::error::QueryError;
use crate::listing::{series_from_parts, series_summary_from_row};
use crate::queries::{QueryKey, QueryKind};
use crate::relations::{self, RelationMap};

// ── Merges ──────────────────────────────────────────────────────────────────

/// Attach each book's authors and tags. A book missing from a map gets an
/// empty list.
pub fn assemble_books(
    books: Vec<Book>,
    authors: &RelationMap<Author>,
    tags: &RelationMap<String>,
) -> Vec<BookSummary> {
    books
        .into_iter()
        .map(|book| BookSummary {
            authors: children_of(authors, book.id),
            tags: children_of(tags, book.id),
            book,
        })
        .collect()
}

/// Attach each series' authors. A series missing from the map gets an empty
/// list.
pub fn assemble_series(
    series: Vec<SeriesSummary>,
    authors: &RelationMap<Author>,
) -> Vec<SeriesSummary> {
    series
        .into_iter()
        .map(|mut s| {
            s.authors = children_of(authors, s.series.id);
            s
        })
        .collect()
}

fn children_of<T: Clone>(map: &RelationMap<T>, id: i64) -> Vec<T> {
    map.get(&id).cloned().unwrap_or_default()
}

// ── Details ─────────────────────────────────────────────────────────────────
//
// The detail query runs first, then each relation in turn. The first
// failure aborts; a detail record is never returned half-loaded.

/// Load one book with its authors, tags and files.
pub fn book_detail(ctx: &QueryContext<'_>, id: i64) -> Result<BookDetail, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::Book))?;
    let detail = stmt
        .query_row([id], |row| {
            Ok(BookDetail {
                summary: BookSummary {
                    book: Book {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        series_index: row.get::<_, Option<f64>>(2)?.unwrap_or(1.0),
                        series: series_from_parts(row.get(4)?, row.get(3)?),
                    },
                    authors: Vec::new(),
                    tags: Vec::new(),
                },
                files: Vec::new(),
                timestamp: row.get(5)?,
                pubdate: row.get(6)?,
                isbn: non_empty(row.get(7)?),
                lccn: non_empty(row.get(8)?),
                path: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                uuid: non_empty(row.get(10)?),
                has_cover: row.get::<_, Option<bool>>(11)?.unwrap_or(false),
                lang: non_empty(row.get(12)?),
                publisher: non_empty(row.get(13)?),
            })
        })
        .optional()?;
    let mut detail = detail.ok_or(QueryError::NotFound {
        family: EntityFamily::Book,
        id,
    })?;

    detail.summary.tags = relations::book_tags(ctx, id)?;
    detail.summary.authors = relations::book_authors(ctx, id)?;
    detail.files = relations::book_files(ctx, id)?;
    Ok(detail)
}

/// Load one author with their books, the series of those books, and
/// co-authors.
pub fn author_detail(ctx: &QueryContext<'_>, id: i64) -> Result<AuthorDetail, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::Author))?;
    let author = stmt
        .query_row([id], |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()?
        .ok_or(QueryError::NotFound {
            family: EntityFamily::Author,
            id,
        })?;

    let books = relations::author_books(ctx, id)?;
    let series = distinct_series(&books);
    let coauthors = relations::author_coauthors(ctx, id)?;
    Ok(AuthorDetail {
        author,
        books,
        series,
        coauthors,
    })
}

/// Load one series with its books and their authors.
pub fn series_detail(ctx: &QueryContext<'_>, id: i64) -> Result<SeriesDetail, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::SeriesById))?;
    let mut summary = stmt
        .query_row([id], series_summary_from_row)
        .optional()?
        .ok_or(QueryError::NotFound {
            family: EntityFamily::Series,
            id,
        })?;

    let books = relations::series_books(ctx, id)?;
    summary.authors = relations::series_authors(ctx, id)?;
    Ok(SeriesDetail { summary, books })
}

/// Series appearing on `books`, once each, ordered by id.
fn distinct_series(books: &[Book]) -> Vec<Series> {
    books
        .iter()
        .filter_map(|b| b.series.as_ref())
        .map(|s| (s.id, s))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .cloned()
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
