//! Detail views for a single book, author or series.

use folio_catalog::{Author, AuthorDetail, Book, BookDetail, SeriesDetail};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::log_blank;

use super::{format_date, format_file_size};

pub(crate) fn print_book(book: &BookDetail) {
    let summary = &book.summary;
    log::info!(
        "{}  {}",
        book.title().if_supports_color(Stdout, |t| t.bold()),
        format!("(id {})", book.id()).if_supports_color(Stdout, |t| t.dimmed())
    );
    if !summary.authors.is_empty() {
        log::info!(
            "  by {}",
            names(&summary.authors).if_supports_color(Stdout, |t| t.cyan())
        );
    }
    log_blank();

    if let Some(series) = &summary.book.series {
        field("Series", format!("{} #{}", series.name, summary.book.series_index));
    }
    if !summary.tags.is_empty() {
        field("Tags", summary.tags.join(", "));
    }
    if let Some(publisher) = &book.publisher {
        field("Publisher", publisher);
    }
    if let Some(year) = book.pubdate {
        field("Published", year);
    }
    if let Some(lang) = &book.lang {
        field("Language", lang);
    }
    if let Some(isbn) = &book.isbn {
        field("ISBN", isbn);
    }
    if let Some(lccn) = &book.lccn {
        field("LCCN", lccn);
    }
    if let Some(added) = book.timestamp {
        field("Added", format_date(added));
    }
    field("Path", &book.path);
    if let Some(uuid) = &book.uuid {
        field("UUID", uuid);
    }
    field("Cover", if book.has_cover { "yes" } else { "no" });

    if !book.files.is_empty() {
        log_blank();
        log::info!("{}", "Files".if_supports_color(Stdout, |t| t.bold()));
        for file in &book.files {
            log::info!(
                "  {:<6} {:>10}  {}",
                file.format.if_supports_color(Stdout, |t| t.green()),
                format_file_size(file.size),
                file.file_name(),
            );
        }
    }
}

pub(crate) fn print_author(author: &AuthorDetail) {
    log::info!("{}", author.author.name.if_supports_color(Stdout, |t| t.bold()));
    log_blank();

    if !author.series.is_empty() {
        let series: Vec<&str> = author.series.iter().map(|s| s.name.as_str()).collect();
        field("Series", series.join(", "));
    }
    if !author.coauthors.is_empty() {
        field("Co-authors", names(&author.coauthors));
    }

    log_blank();
    log::info!(
        "{} ({})",
        "Books".if_supports_color(Stdout, |t| t.bold()),
        author.books.len()
    );
    for book in &author.books {
        book_line(book);
    }
}

pub(crate) fn print_series(series: &SeriesDetail) {
    let summary = &series.summary;
    log::info!("{}", summary.series.name.if_supports_color(Stdout, |t| t.bold()));
    if !summary.authors.is_empty() {
        log::info!(
            "  by {}",
            names(&summary.authors).if_supports_color(Stdout, |t| t.cyan())
        );
    }
    log_blank();

    log::info!(
        "{} ({})",
        "Books".if_supports_color(Stdout, |t| t.bold()),
        summary.count
    );
    for book in &series.books {
        log::info!(
            "  {:>5}  {}  {}",
            format!("#{}", book.series_index).if_supports_color(Stdout, |t| t.dimmed()),
            book.title,
            format!("(id {})", book.id).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
}

fn book_line(book: &Book) {
    let series = match &book.series {
        Some(series) => format!("  [{} #{}]", series.name, book.series_index),
        None => String::new(),
    };
    log::info!(
        "  {:>6}  {}{}",
        book.id,
        book.title,
        series.if_supports_color(Stdout, |t| t.dimmed())
    );
}

fn field(label: &str, value: impl std::fmt::Display) {
    log::info!(
        "  {:<11} {}",
        format!("{label}:").if_supports_color(Stdout, |t| t.dimmed()),
        value
    );
}

fn names(authors: &[Author]) -> String {
    authors
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
