//! Primary list queries: one sorted page, or one search, per entity family.
//!
//! The two paths count differently on purpose. A sorted page overfetches a
//! single row to learn whether another page exists and costs O(limit). A
//! search streams every match so it can report how many there are, and
//! costs O(matches) unless a scan cap is configured.

use folio_catalog::{
    Author, AuthorSummary, Book, PageRequest, SearchCount, SearchRequest, Series, SeriesSummary,
    Sort,
};
use rusqlite::{Row, params, params_from_iter};

use crate::context::{QueryContext, sql_int};
use crate::error::QueryError;
use crate::queries::{AUTHORS_SEARCH, BOOKS_SEARCH, QueryKey, QueryKind, SERIES_SEARCH};
use crate::search::{SearchTemplate, build_search};

// Upper bound on up-front allocation for caller-supplied page sizes.
const PREALLOC_LIMIT: usize = 256;

// ── Sorted pages ────────────────────────────────────────────────────────────

/// One page of books and whether another page follows.
pub fn books_page(
    ctx: &QueryContext<'_>,
    sort: Sort,
    page: PageRequest,
) -> Result<(Vec<Book>, bool), QueryError> {
    fetch_page(ctx, QueryKey::sorted(QueryKind::Books, sort), page, book_from_row)
}

/// One page of authors (with book counts) and whether another page follows.
pub fn authors_page(
    ctx: &QueryContext<'_>,
    sort: Sort,
    page: PageRequest,
) -> Result<(Vec<AuthorSummary>, bool), QueryError> {
    fetch_page(
        ctx,
        QueryKey::sorted(QueryKind::Authors, sort),
        page,
        author_summary_from_row,
    )
}

/// One page of series (with book counts, no authors yet) and whether another
/// page follows.
pub fn series_page(
    ctx: &QueryContext<'_>,
    sort: Sort,
    page: PageRequest,
) -> Result<(Vec<SeriesSummary>, bool), QueryError> {
    fetch_page(
        ctx,
        QueryKey::sorted(QueryKind::Series, sort),
        page,
        series_summary_from_row,
    )
}

/// Overfetch-by-one: ask for `limit + 1` rows. If the extra row arrives there
/// is another page, and the extra row is dropped.
fn fetch_page<T>(
    ctx: &QueryContext<'_>,
    key: QueryKey,
    page: PageRequest,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<(Vec<T>, bool), QueryError> {
    let limit = page.limit();
    let mut stmt = ctx.statement(key)?;
    let mut rows = stmt.query(params![
        sql_int(limit.saturating_add(1)),
        sql_int(page.offset())
    ])?;

    let mut records = Vec::with_capacity(limit.min(PREALLOC_LIMIT));
    let mut more = false;
    while let Some(row) = rows.next()? {
        ctx.check()?;
        if records.len() == limit {
            more = true;
            break;
        }
        records.push(map(row)?);
    }
    Ok((records, more))
}

// ── Searches ────────────────────────────────────────────────────────────────

/// First `limit` books whose sort title matches, and the match count.
pub fn books_search(
    ctx: &QueryContext<'_>,
    search: &SearchRequest,
    limit: usize,
    scan_cap: Option<usize>,
) -> Result<(Vec<Book>, SearchCount), QueryError> {
    fetch_search(ctx, &BOOKS_SEARCH, search, limit, scan_cap, book_from_row)
}

/// First `limit` authors whose sort name matches, and the match count.
pub fn authors_search(
    ctx: &QueryContext<'_>,
    search: &SearchRequest,
    limit: usize,
    scan_cap: Option<usize>,
) -> Result<(Vec<AuthorSummary>, SearchCount), QueryError> {
    fetch_search(
        ctx,
        &AUTHORS_SEARCH,
        search,
        limit,
        scan_cap,
        author_summary_from_row,
    )
}

/// First `limit` series whose sort name matches, and the match count.
pub fn series_search(
    ctx: &QueryContext<'_>,
    search: &SearchRequest,
    limit: usize,
    scan_cap: Option<usize>,
) -> Result<(Vec<SeriesSummary>, SearchCount), QueryError> {
    fetch_search(
        ctx,
        &SERIES_SEARCH,
        search,
        limit,
        scan_cap,
        series_summary_from_row,
    )
}

/// Run a search with no LIMIT, keep the first `limit` rows and count all of
/// them. With a scan cap the count stops at `max(cap, limit)` and is
/// reported as [`SearchCount::AtLeast`] if more rows remain.
fn fetch_search<T>(
    ctx: &QueryContext<'_>,
    template: &SearchTemplate,
    search: &SearchRequest,
    limit: usize,
    scan_cap: Option<usize>,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<(Vec<T>, SearchCount), QueryError> {
    let query = build_search(template, search);
    let cap = scan_cap.map(|cap| cap.max(limit));

    let mut stmt = ctx.dynamic(&query.sql)?;
    let mut rows = stmt.query(params_from_iter(query.binds.iter()))?;

    let mut records = Vec::with_capacity(limit.min(PREALLOC_LIMIT));
    let mut count = 0usize;
    while let Some(row) = rows.next()? {
        ctx.check()?;
        if cap.is_some_and(|cap| count == cap) {
            return Ok((records, SearchCount::AtLeast(count)));
        }
        if records.len() < limit {
            records.push(map(row)?);
        }
        count += 1;
    }
    Ok((records, SearchCount::Exact(count)))
}

// ── Row mapping ─────────────────────────────────────────────────────────────

/// `id, title, series_index, series.name, series.id`. The series is only set
/// when both series columns are non-null.
pub(crate) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let series_name: Option<String> = row.get(3)?;
    let series_id: Option<i64> = row.get(4)?;
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        series_index: row.get::<_, Option<f64>>(2)?.unwrap_or(1.0),
        series: series_from_parts(series_id, series_name),
    })
}

pub(crate) fn series_from_parts(id: Option<i64>, name: Option<String>) -> Option<Series> {
    match (id, name) {
        (Some(id), Some(name)) => Some(Series { id, name }),
        _ => None,
    }
}

fn author_summary_from_row(row: &Row<'_>) -> rusqlite::Result<AuthorSummary> {
    Ok(AuthorSummary {
        author: Author {
            id: row.get(0)?,
            name: row.get(1)?,
        },
        count: row.get(2)?,
    })
}

pub(crate) fn series_summary_from_row(row: &Row<'_>) -> rusqlite::Result<SeriesSummary> {
    Ok(SeriesSummary {
        series: Series {
            id: row.get(0)?,
            name: row.get(1)?,
        },
        count: row.get(2)?,
        authors: Vec::new(),
    })
}
