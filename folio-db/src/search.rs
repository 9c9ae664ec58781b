//! Runtime query builder for free-text search.
//!
//! Only the *shape* of a search query depends on the request: one predicate
//! per term, joined by `AND` or `OR`. Term values are always bound as
//! parameters and never written into the SQL text.

use folio_catalog::{MatchMode, SearchRequest};

/// Fixed parts of a search query for one entity family.
#[derive(Debug, Clone, Copy)]
pub struct SearchTemplate {
    /// Everything up to and including `WHERE `.
    pub base: &'static str,
    /// One substring predicate with a single `?` placeholder.
    pub predicate: &'static str,
    /// Grouping and ordering after the predicates.
    pub suffix: &'static str,
}

/// Fixed parts of a relation query filtered on an explicit parent id set.
#[derive(Debug, Clone, Copy)]
pub struct IdFilterTemplate {
    /// Everything up to and including `IN `.
    pub base: &'static str,
    pub suffix: &'static str,
}

/// An executable search: SQL text plus one bind value per term, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub sql: String,
    pub binds: Vec<String>,
}

/// Build the search query for `search` from `template`.
pub fn build_search(template: &SearchTemplate, search: &SearchRequest) -> SearchQuery {
    let joiner = match search.mode() {
        MatchMode::All => " AND ",
        MatchMode::Any => " OR ",
    };
    let terms = search.terms();

    let mut sql = String::with_capacity(
        template.base.len()
            + template.suffix.len()
            + terms.len() * (template.predicate.len() + joiner.len())
            + 2,
    );
    sql.push_str(template.base);
    sql.push('(');
    for i in 0..terms.len() {
        if i > 0 {
            sql.push_str(joiner);
        }
        sql.push_str(template.predicate);
    }
    sql.push(')');
    sql.push_str(template.suffix);

    let binds = terms.iter().map(|t| substring_pattern(t)).collect();
    SearchQuery { sql, binds }
}

/// Build `base (?, ?, …) suffix` with one placeholder per id.
///
/// Returns `None` for an empty id set; there is nothing to query.
pub fn build_id_filter(template: &IdFilterTemplate, count: usize) -> Option<String> {
    if count == 0 {
        return None;
    }
    let mut sql = String::with_capacity(template.base.len() + template.suffix.len() + count * 3);
    sql.push_str(template.base);
    sql.push('(');
    for i in 0..count {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('?');
    }
    sql.push(')');
    sql.push_str(template.suffix);
    Some(sql)
}

/// Wrap a term as a `LIKE` pattern matching it as a literal substring.
///
/// `\`, `%` and `_` are escaped; predicates declare `ESCAPE '\'`.
pub fn substring_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
