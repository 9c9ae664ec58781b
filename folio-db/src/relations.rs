//! One-to-many relation queries.
//!
//! Window variants fetch the children of every parent on a page with a single
//! query over the same sort and limit/offset window as the primary page, so a
//! page costs a fixed number of queries whatever its size. Id variants do the
//! same for an explicit parent set (search pages). Parent variants load the
//! children of one record for detail views.

use std::collections::HashMap;

use folio_catalog::{Author, Book, BookFile, PageRequest, Sort};
use rusqlite::{Params, Row, Statement, params_from_iter};

use crate::context::{QueryContext, sql_int};
use crate::error::QueryError;
use crate::listing::book_from_row;
use crate::queries::{
    BOOK_AUTHORS_FOR_IDS, BOOK_TAGS_FOR_IDS, QueryKey, QueryKind, SERIES_AUTHORS_FOR_IDS,
};
use crate::search::{IdFilterTemplate, build_id_filter};

/// Children grouped by parent id.
pub type RelationMap<T> = HashMap<i64, Vec<T>>;

// ── Page windows ────────────────────────────────────────────────────────────

/// Authors of every book in the `(sort, page)` window, keyed by book id.
pub fn book_authors_for_window(
    ctx: &QueryContext<'_>,
    sort: Sort,
    page: PageRequest,
) -> Result<RelationMap<Author>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::sorted(QueryKind::BooksAuthors, sort))?;
    group_rows(ctx, &mut stmt, window_params(page), author_with_parent)
}

/// Tags of every book in the `(sort, page)` window, keyed by book id.
pub fn book_tags_for_window(
    ctx: &QueryContext<'_>,
    sort: Sort,
    page: PageRequest,
) -> Result<RelationMap<String>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::sorted(QueryKind::BooksTags, sort))?;
    group_rows(ctx, &mut stmt, window_params(page), tag_with_parent)
}

/// Authors of the books of every series in the `(sort, page)` window, keyed
/// by series id.
pub fn series_authors_for_window(
    ctx: &QueryContext<'_>,
    sort: Sort,
    page: PageRequest,
) -> Result<RelationMap<Author>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::sorted(QueryKind::SeriesAuthors, sort))?;
    group_rows(ctx, &mut stmt, window_params(page), author_with_parent)
}

/// The primary page overfetches by one; relations cover exactly `limit` rows.
fn window_params(page: PageRequest) -> [i64; 2] {
    [sql_int(page.limit()), sql_int(page.offset())]
}

// ── Explicit id sets ────────────────────────────────────────────────────────

/// Authors of each listed book, keyed by book id.
pub fn book_authors_for_ids(
    ctx: &QueryContext<'_>,
    ids: &[i64],
) -> Result<RelationMap<Author>, QueryError> {
    group_for_ids(ctx, &BOOK_AUTHORS_FOR_IDS, ids, author_with_parent)
}

/// Tags of each listed book, keyed by book id.
pub fn book_tags_for_ids(
    ctx: &QueryContext<'_>,
    ids: &[i64],
) -> Result<RelationMap<String>, QueryError> {
    group_for_ids(ctx, &BOOK_TAGS_FOR_IDS, ids, tag_with_parent)
}

/// Authors of the books of each listed series, keyed by series id.
pub fn series_authors_for_ids(
    ctx: &QueryContext<'_>,
    ids: &[i64],
) -> Result<RelationMap<Author>, QueryError> {
    group_for_ids(ctx, &SERIES_AUTHORS_FOR_IDS, ids, author_with_parent)
}

fn group_for_ids<T>(
    ctx: &QueryContext<'_>,
    template: &IdFilterTemplate,
    ids: &[i64],
    split: fn(&Row<'_>) -> rusqlite::Result<(i64, T)>,
) -> Result<RelationMap<T>, QueryError> {
    let Some(sql) = build_id_filter(template, ids.len()) else {
        return Ok(RelationMap::new());
    };
    let mut stmt = ctx.dynamic(&sql)?;
    group_rows(ctx, &mut stmt, params_from_iter(ids.iter()), split)
}

// ── Single parent ───────────────────────────────────────────────────────────

pub fn book_authors(ctx: &QueryContext<'_>, book_id: i64) -> Result<Vec<Author>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::BookAuthors))?;
    collect_rows(ctx, &mut stmt, [book_id], author_from_row)
}

pub fn book_tags(ctx: &QueryContext<'_>, book_id: i64) -> Result<Vec<String>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::BookTags))?;
    collect_rows(ctx, &mut stmt, [book_id], |row| row.get(0))
}

/// Downloadable formats of a book.
pub fn book_files(ctx: &QueryContext<'_>, book_id: i64) -> Result<Vec<BookFile>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::BookFiles))?;
    collect_rows(ctx, &mut stmt, [book_id], |row| {
        Ok(BookFile {
            name: row.get(0)?,
            format: row.get(1)?,
            size: row.get(2)?,
        })
    })
}

/// Distinct authors across the books of a series.
pub fn series_authors(ctx: &QueryContext<'_>, series_id: i64) -> Result<Vec<Author>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::SeriesAuthorsById))?;
    collect_rows(ctx, &mut stmt, [series_id], author_from_row)
}

/// Books of a series in series-index order.
pub fn series_books(ctx: &QueryContext<'_>, series_id: i64) -> Result<Vec<Book>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::SeriesBooks))?;
    collect_rows(ctx, &mut stmt, [series_id], |row| {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            series_index: row.get(2)?,
            series: None,
        })
    })
}

/// Books credited to an author, with their series.
pub fn author_books(ctx: &QueryContext<'_>, author_id: i64) -> Result<Vec<Book>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::AuthorBooks))?;
    collect_rows(ctx, &mut stmt, [author_id], book_from_row)
}

/// Everyone sharing at least one book with an author, excluding the author.
pub fn author_coauthors(
    ctx: &QueryContext<'_>,
    author_id: i64,
) -> Result<Vec<Author>, QueryError> {
    let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::AuthorCoauthors))?;
    collect_rows(ctx, &mut stmt, [author_id], author_from_row)
}

// ── Row helpers ─────────────────────────────────────────────────────────────

/// Stream rows into a map from parent id to children, in row order.
fn group_rows<T, P: Params>(
    ctx: &QueryContext<'_>,
    stmt: &mut Statement<'_>,
    params: P,
    split: fn(&Row<'_>) -> rusqlite::Result<(i64, T)>,
) -> Result<RelationMap<T>, QueryError> {
    let mut rows = stmt.query(params)?;
    let mut grouped = RelationMap::new();
    while let Some(row) = rows.next()? {
        ctx.check()?;
        let (parent, child) = split(row)?;
        grouped.entry(parent).or_insert_with(Vec::new).push(child);
    }
    Ok(grouped)
}

fn collect_rows<T, P: Params>(
    ctx: &QueryContext<'_>,
    stmt: &mut Statement<'_>,
    params: P,
    map: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, QueryError> {
    let mut rows = stmt.query(params)?;
    let mut children = Vec::new();
    while let Some(row) = rows.next()? {
        ctx.check()?;
        children.push(map(row)?);
    }
    Ok(children)
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// `authors.id, authors.name, parent_id`
fn author_with_parent(row: &Row<'_>) -> rusqlite::Result<(i64, Author)> {
    Ok((row.get(2)?, author_from_row(row)?))
}

/// `tags.name, book_id`
fn tag_with_parent(row: &Row<'_>) -> rusqlite::Result<(i64, String)> {
    Ok((row.get(1)?, row.get(0)?))
}
