//! Request types: entity family, sort order, page window and search terms.
//!
//! Callers are best-effort UI layers, so out-of-range values are normalized
//! here instead of being rejected: unknown sort fields fall back to id order,
//! bad page numbers clamp to the first page, and blank search terms are
//! dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The unit of listing and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityFamily {
    Book,
    Author,
    Series,
}

impl EntityFamily {
    /// Name of the display field the family sorts on besides its id.
    pub fn name_field(self) -> &'static str {
        match self {
            Self::Book => "title",
            Self::Author | Self::Series => "name",
        }
    }

    /// Plural label used in result listings (`"books"`, `"authors"`, `"series"`).
    pub fn plural(self) -> &'static str {
        match self {
            Self::Book => "books",
            Self::Author => "authors",
            Self::Series => "series",
        }
    }
}

impl fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Book => write!(f, "book"),
            Self::Author => write!(f, "author"),
            Self::Series => write!(f, "series"),
        }
    }
}

// ── Sort ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Id,
    /// Title for books, name for authors and series.
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parse `"asc"`/`"desc"`; anything else is ascending.
    pub fn parse_loose(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// Sort order of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    pub const fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Build a sort from raw request strings.
    ///
    /// The field only selects name order when it equals the family's name
    /// field (`title` for books, `name` otherwise); any other value sorts by id.
    pub fn from_params(family: EntityFamily, field: &str, direction: &str) -> Self {
        let field = if field.eq_ignore_ascii_case(family.name_field()) {
            SortField::Name
        } else {
            SortField::Id
        };
        Self::new(field, Direction::parse_loose(direction))
    }

    pub fn by_name(self) -> bool {
        self.field == SortField::Name
    }

    pub fn desc(self) -> bool {
        self.direction == Direction::Desc
    }
}

// ── Page ────────────────────────────────────────────────────────────────────

/// A normalized page window: `limit >= 1`, `offset >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    limit: usize,
    offset: usize,
}

impl PageRequest {
    /// Window from an explicit limit and offset. A zero limit becomes one.
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: limit.max(1),
            offset,
        }
    }

    /// Window from a 1-based page number and a page size.
    ///
    /// A page size of zero or less selects [`DEFAULT_PAGE_SIZE`]. Page numbers
    /// below one give offset zero.
    pub fn from_page(page: i64, per_page: i64) -> Self {
        let limit = if per_page <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            usize::try_from(per_page).unwrap_or(usize::MAX)
        };
        let offset = per_page
            .max(0)
            .saturating_mul(page.saturating_sub(1))
            .max(0);
        Self::new(limit, usize::try_from(offset).unwrap_or(usize::MAX))
    }

    pub fn limit(self) -> usize {
        self.limit
    }

    pub fn offset(self) -> usize {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}

// ── Search ──────────────────────────────────────────────────────────────────

/// How multiple search terms combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every term must match.
    All,
    /// At least one term must match.
    #[default]
    Any,
}

/// A free-text search. Always holds at least one non-blank term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRequest {
    terms: Vec<String>,
    mode: MatchMode,
}

impl SearchRequest {
    /// Build a search from raw terms. Blank terms are discarded; returns
    /// `None` when nothing is left, meaning the request is not a search.
    pub fn new<I, S>(terms: I, mode: MatchMode) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            None
        } else {
            Some(Self { terms, mode })
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }
}

// ── List request ────────────────────────────────────────────────────────────

/// A list request: either a sorted page or a search.
///
/// Search and sort/page are mutually exclusive. When `search` is set the
/// sort is ignored and results come in name order from the first match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub sort: Sort,
    pub page: PageRequest,
    pub search: Option<SearchRequest>,
}

impl ListRequest {
    pub fn sorted(sort: Sort, page: PageRequest) -> Self {
        Self {
            sort,
            page,
            search: None,
        }
    }

    pub fn search(search: SearchRequest, page: PageRequest) -> Self {
        Self {
            sort: Sort::default(),
            page,
            search: Some(search),
        }
    }

    pub fn is_search(&self) -> bool {
        self.search.is_some()
    }
}
