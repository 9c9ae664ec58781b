//! `folio books|authors|series`: listings, searches, and detail views by id.

use folio_catalog::{
    AuthorSummary, BookSummary, EntityFamily, ListRequest, Listing, MatchMode, PageRequest,
    SearchCount, SearchRequest, SeriesSummary, Sort,
};
use folio_db::RequestScope;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;

use crate::cli_types::ListArgs;
use crate::config::Settings;
use crate::{CliError, log_blank};

use super::{open_catalog, print_json, show, truncate_str};

const TITLE_WIDTH: usize = 48;

/// JSON envelope for a listing.
#[derive(Serialize)]
struct ListOutput<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    /// False when the search stopped counting at the scan cap.
    #[serde(skip_serializing_if = "is_true")]
    count_exact: bool,
    results: &'a [T],
}

fn is_true(b: &bool) -> bool {
    *b
}

impl<'a, T> ListOutput<'a, T> {
    fn new(family: EntityFamily, listing: &'a Listing<T>) -> Self {
        Self {
            kind: family.plural(),
            more: listing.more,
            count: listing.count.map(SearchCount::value),
            count_exact: listing.count.is_none_or(SearchCount::is_exact),
            results: &listing.results,
        }
    }
}

/// Turn command-line arguments into a normalized list request.
pub(crate) fn list_request(
    family: EntityFamily,
    args: &ListArgs,
    settings: &Settings,
) -> ListRequest {
    let per_page = args.per_page.unwrap_or(settings.per_page.value);
    let page = PageRequest::from_page(args.page, per_page);
    let mode = if args.all { MatchMode::All } else { MatchMode::Any };
    match SearchRequest::new(&args.terms, mode) {
        Some(search) => ListRequest::search(search, page),
        None => ListRequest::sorted(Sort::from_params(family, &args.sort, &args.order), page),
    }
}

// ── Books ───────────────────────────────────────────────────────────────────

pub(crate) fn run_books(settings: &Settings, args: &ListArgs, json: bool) -> Result<(), CliError> {
    let catalog = open_catalog(settings)?;
    let scope = RequestScope::new();

    if let Some(id) = args.id {
        let book = catalog.book(&scope, id)?;
        if json {
            print_json(&book)?;
        } else {
            show::print_book(&book);
        }
    } else {
        let request = list_request(EntityFamily::Book, args, settings);
        let listing = catalog.books(&scope, &request)?;
        if json {
            print_json(&ListOutput::new(EntityFamily::Book, &listing))?;
        } else {
            print_header(EntityFamily::Book, &request, args.page);
            for summary in &listing.results {
                print_book_line(summary);
            }
            print_footer(&listing, args.page);
        }
    }

    catalog.close()?;
    Ok(())
}

fn print_book_line(summary: &BookSummary) {
    let book = &summary.book;
    let authors: Vec<&str> = summary.authors.iter().map(|a| a.name.as_str()).collect();
    let mut line = format!(
        "  {:>6}  {}",
        book.id,
        truncate_str(&book.title, TITLE_WIDTH).if_supports_color(Stdout, |t| t.bold()),
    );
    if !authors.is_empty() {
        line.push_str(&format!(
            "  {}",
            authors.join(", ").if_supports_color(Stdout, |t| t.cyan())
        ));
    }
    if let Some(series) = &book.series {
        line.push_str(&format!("  [{} #{}]", series.name, book.series_index));
    }
    if !summary.tags.is_empty() {
        line.push_str(&format!(
            "  {}",
            summary.tags.join(", ").if_supports_color(Stdout, |t| t.dimmed())
        ));
    }
    log::info!("{line}");
}

// ── Authors ─────────────────────────────────────────────────────────────────

pub(crate) fn run_authors(
    settings: &Settings,
    args: &ListArgs,
    json: bool,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings)?;
    let scope = RequestScope::new();

    if let Some(id) = args.id {
        let author = catalog.author(&scope, id)?;
        if json {
            print_json(&author)?;
        } else {
            show::print_author(&author);
        }
    } else {
        let request = list_request(EntityFamily::Author, args, settings);
        let listing = catalog.authors(&scope, &request)?;
        if json {
            print_json(&ListOutput::new(EntityFamily::Author, &listing))?;
        } else {
            print_header(EntityFamily::Author, &request, args.page);
            for summary in &listing.results {
                print_author_line(summary);
            }
            print_footer(&listing, args.page);
        }
    }

    catalog.close()?;
    Ok(())
}

fn print_author_line(summary: &AuthorSummary) {
    log::info!(
        "  {:>6}  {}  {}",
        summary.author.id,
        truncate_str(&summary.author.name, TITLE_WIDTH).if_supports_color(Stdout, |t| t.bold()),
        plural(summary.count, "book").if_supports_color(Stdout, |t| t.dimmed()),
    );
}

// ── Series ──────────────────────────────────────────────────────────────────

pub(crate) fn run_series(
    settings: &Settings,
    args: &ListArgs,
    json: bool,
) -> Result<(), CliError> {
    let catalog = open_catalog(settings)?;
    let scope = RequestScope::new();

    if let Some(id) = args.id {
        let series = catalog.series(&scope, id)?;
        if json {
            print_json(&series)?;
        } else {
            show::print_series(&series);
        }
    } else {
        let request = list_request(EntityFamily::Series, args, settings);
        let listing = catalog.series_list(&scope, &request)?;
        if json {
            print_json(&ListOutput::new(EntityFamily::Series, &listing))?;
        } else {
            print_header(EntityFamily::Series, &request, args.page);
            for summary in &listing.results {
                print_series_line(summary);
            }
            print_footer(&listing, args.page);
        }
    }

    catalog.close()?;
    Ok(())
}

fn print_series_line(summary: &SeriesSummary) {
    let authors: Vec<&str> = summary.authors.iter().map(|a| a.name.as_str()).collect();
    log::info!(
        "  {:>6}  {}  {}  {}",
        summary.series.id,
        truncate_str(&summary.series.name, TITLE_WIDTH).if_supports_color(Stdout, |t| t.bold()),
        plural(summary.count, "book").if_supports_color(Stdout, |t| t.dimmed()),
        authors.join(", ").if_supports_color(Stdout, |t| t.cyan()),
    );
}

// ── Shared output ───────────────────────────────────────────────────────────

fn print_header(family: EntityFamily, request: &ListRequest, page: i64) {
    let title = match &request.search {
        Some(search) => {
            let joiner = match search.mode() {
                MatchMode::All => " and ",
                MatchMode::Any => " or ",
            };
            format!("Search {}: {}", family.plural(), search.terms().join(joiner))
        }
        None => format!("{} (page {})", capitalize(family.plural()), page.max(1)),
    };
    log::info!("{}", title.if_supports_color(Stdout, |t| t.bold()));
    log_blank();
}

fn print_footer<T>(listing: &Listing<T>, page: i64) {
    if listing.is_empty() {
        log::info!("  {}", "No results".if_supports_color(Stdout, |t| t.dimmed()));
    }
    log_blank();
    match listing.count {
        Some(SearchCount::Exact(n)) => log::info!("{} found", plural_usize(n, "match")),
        Some(SearchCount::AtLeast(n)) => {
            log::info!("At least {} found", plural_usize(n, "match"))
        }
        None if listing.more => log::info!(
            "More results: {}",
            format!("--page {}", page.max(1) + 1).if_supports_color(Stdout, |t| t.green())
        ),
        None => {}
    }
}

fn plural(n: i64, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {}", plural_noun(noun))
    }
}

fn plural_usize(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {}", plural_noun(noun))
    }
}

fn plural_noun(noun: &str) -> String {
    if noun.ends_with("ch") || noun.ends_with('s') {
        format!("{noun}es")
    } else {
        format!("{noun}s")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
