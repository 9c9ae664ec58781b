//! The catalog facade: list, search and detail operations per entity family.
//!
//! Every operation checks out one pooled connection and runs all of its
//! queries there under the caller's [`RequestScope`]: the primary query
//! first, then the relation queries over the same window, then the merge.

use std::path::Path;

use folio_catalog::{
    AuthorDetail, AuthorSummary, BookDetail, BookSummary, ListRequest, Listing, PageRequest,
    SearchRequest, SeriesDetail, SeriesSummary, Sort,
};

use crate::aggregate;
use crate::context::QueryContext;
use crate::error::QueryError;
use crate::listing;
use crate::queries::{QueryKey, QueryKind};
use crate::relations;
use crate::schema::SchemaError;
use crate::statements::{PrimeReport, StatementCache};
use crate::store::{CatalogStore, RequestScope, StoreConfig};

/// Query engine settings.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Stop counting search matches after this many rows. `None` scans every
    /// match and reports an exact count.
    pub max_search_scan: Option<usize>,
}

/// Read-only catalog over a Calibre library.
pub struct Catalog {
    store: CatalogStore,
    statements: StatementCache,
    config: EngineConfig,
}

impl Catalog {
    pub fn new(store: CatalogStore, config: EngineConfig) -> Self {
        Self {
            store,
            statements: StatementCache::new(),
            config,
        }
    }

    /// Open the library database at `path`.
    pub fn open(
        path: &Path,
        store_config: &StoreConfig,
        config: EngineConfig,
    ) -> Result<Self, SchemaError> {
        Ok(Self::new(CatalogStore::open(path, store_config)?, config))
    }

    pub fn statements(&self) -> &StatementCache {
        &self.statements
    }

    /// Compile every catalog query up front.
    pub fn prime(&self, scope: &RequestScope) -> Result<PrimeReport, QueryError> {
        self.store
            .with_connection(scope, |conn| self.statements.prime(conn))
    }

    // ── Books ───────────────────────────────────────────────────────────────

    pub fn list_books(
        &self,
        scope: &RequestScope,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Listing<BookSummary>, QueryError> {
        self.run(scope, |ctx| {
            let (books, more) = listing::books_page(ctx, sort, page)?;
            let authors = relations::book_authors_for_window(ctx, sort, page)?;
            let tags = relations::book_tags_for_window(ctx, sort, page)?;
            Ok(Listing::page(
                aggregate::assemble_books(books, &authors, &tags),
                more,
            ))
        })
    }

    pub fn search_books(
        &self,
        scope: &RequestScope,
        search: &SearchRequest,
        page: PageRequest,
    ) -> Result<Listing<BookSummary>, QueryError> {
        self.run(scope, |ctx| {
            let (books, count) =
                listing::books_search(ctx, search, page.limit(), self.config.max_search_scan)?;
            let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
            let authors = relations::book_authors_for_ids(ctx, &ids)?;
            let tags = relations::book_tags_for_ids(ctx, &ids)?;
            Ok(Listing::search(
                aggregate::assemble_books(books, &authors, &tags),
                count,
                page.limit(),
            ))
        })
    }

    /// Search when the request carries terms, otherwise the sorted page.
    pub fn books(
        &self,
        scope: &RequestScope,
        request: &ListRequest,
    ) -> Result<Listing<BookSummary>, QueryError> {
        match &request.search {
            Some(search) => self.search_books(scope, search, request.page),
            None => self.list_books(scope, request.sort, request.page),
        }
    }

    pub fn book(&self, scope: &RequestScope, id: i64) -> Result<BookDetail, QueryError> {
        self.run(scope, |ctx| aggregate::book_detail(ctx, id))
    }

    /// Number of books in the library.
    pub fn book_count(&self, scope: &RequestScope) -> Result<i64, QueryError> {
        self.run(scope, |ctx| {
            let mut stmt = ctx.statement(QueryKey::fixed(QueryKind::BookCount))?;
            Ok(stmt.query_row([], |row| row.get(0))?)
        })
    }

    // ── Authors ─────────────────────────────────────────────────────────────

    pub fn list_authors(
        &self,
        scope: &RequestScope,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Listing<AuthorSummary>, QueryError> {
        self.run(scope, |ctx| {
            let (authors, more) = listing::authors_page(ctx, sort, page)?;
            Ok(Listing::page(authors, more))
        })
    }

    pub fn search_authors(
        &self,
        scope: &RequestScope,
        search: &SearchRequest,
        page: PageRequest,
    ) -> Result<Listing<AuthorSummary>, QueryError> {
        self.run(scope, |ctx| {
            let (authors, count) =
                listing::authors_search(ctx, search, page.limit(), self.config.max_search_scan)?;
            Ok(Listing::search(authors, count, page.limit()))
        })
    }

    pub fn authors(
        &self,
        scope: &RequestScope,
        request: &ListRequest,
    ) -> Result<Listing<AuthorSummary>, QueryError> {
        match &request.search {
            Some(search) => self.search_authors(scope, search, request.page),
            None => self.list_authors(scope, request.sort, request.page),
        }
    }

    pub fn author(&self, scope: &RequestScope, id: i64) -> Result<AuthorDetail, QueryError> {
        self.run(scope, |ctx| aggregate::author_detail(ctx, id))
    }

    // ── Series ──────────────────────────────────────────────────────────────

    pub fn list_series(
        &self,
        scope: &RequestScope,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Listing<SeriesSummary>, QueryError> {
        self.run(scope, |ctx| {
            let (series, more) = listing::series_page(ctx, sort, page)?;
            let authors = relations::series_authors_for_window(ctx, sort, page)?;
            Ok(Listing::page(
                aggregate::assemble_series(series, &authors),
                more,
            ))
        })
    }

    pub fn search_series(
        &self,
        scope: &RequestScope,
        search: &SearchRequest,
        page: PageRequest,
    ) -> Result<Listing<SeriesSummary>, QueryError> {
        self.run(scope, |ctx| {
            let (series, count) =
                listing::series_search(ctx, search, page.limit(), self.config.max_search_scan)?;
            let ids: Vec<i64> = series.iter().map(|s| s.series.id).collect();
            let authors = relations::series_authors_for_ids(ctx, &ids)?;
            Ok(Listing::search(
                aggregate::assemble_series(series, &authors),
                count,
                page.limit(),
            ))
        })
    }

    pub fn series_list(
        &self,
        scope: &RequestScope,
        request: &ListRequest,
    ) -> Result<Listing<SeriesSummary>, QueryError> {
        match &request.search {
            Some(search) => self.search_series(scope, search, request.page),
            None => self.list_series(scope, request.sort, request.page),
        }
    }

    pub fn series(&self, scope: &RequestScope, id: i64) -> Result<SeriesDetail, QueryError> {
        self.run(scope, |ctx| aggregate::series_detail(ctx, id))
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Drop the statement cache, then close every pooled connection.
    pub fn close(self) -> Result<(), QueryError> {
        self.statements.clear();
        self.store.close()
    }

    fn run<T>(
        &self,
        scope: &RequestScope,
        f: impl FnOnce(&QueryContext<'_>) -> Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        self.store.with_connection(scope, |conn| {
            f(&QueryContext::new(conn, &self.statements, scope))
        })
    }
}
