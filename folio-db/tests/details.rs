mod common;

use common::{sample_catalog, sample_connection};
use folio_catalog::*;
use folio_db::*;

fn names(authors: &[Author]) -> Vec<&str> {
    authors.iter().map(|a| a.name.as_str()).collect()
}

#[test]
fn book_detail_has_everything() {
    let catalog = sample_catalog();
    let book = catalog.book(&RequestScope::new(), 1).unwrap();

    assert_eq!(book.id(), 1);
    assert_eq!(book.title(), "Dune");
    assert_eq!(names(&book.summary.authors), vec!["Frank Herbert"]);
    assert_eq!(book.summary.tags, vec!["classic", "sf"]);
    assert_eq!(book.summary.book.series.as_ref().map(|s| s.id), Some(1));

    assert_eq!(book.timestamp, Some(1_577_934_245));
    assert_eq!(book.pubdate, Some(1965));
    assert_eq!(book.isbn.as_deref(), Some("9780441013593"));
    assert_eq!(book.lccn, None);
    assert_eq!(book.path, "Frank Herbert/Dune (1)");
    assert_eq!(book.uuid.as_deref(), Some("uuid-dune"));
    assert!(book.has_cover);
    // First language by item order
    assert_eq!(book.lang.as_deref(), Some("eng"));
    assert_eq!(book.publisher.as_deref(), Some("Chilton Books"));

    let formats: Vec<&str> = book.files.iter().map(|f| f.format.as_str()).collect();
    assert_eq!(formats, vec!["EPUB", "PDF"]);
    assert_eq!(book.files[0].size, 1024);
    assert_eq!(book.files[1].file_name(), "Dune - Frank Herbert.pdf");
}

#[test]
fn sparse_book_detail() {
    let catalog = sample_catalog();
    let book = catalog.book(&RequestScope::new(), 7).unwrap();
    assert!(book.summary.authors.is_empty());
    assert!(book.summary.tags.is_empty());
    assert_eq!(book.summary.book.series, None);
    assert!(book.files.is_empty());
    assert_eq!(book.isbn, None);
    assert_eq!(book.lang, None);
    assert_eq!(book.publisher, None);
    assert!(!book.has_cover);
}

#[test]
fn author_detail_derives_series_and_coauthors() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();

    let asimov = catalog.author(&scope, 2).unwrap();
    assert_eq!(asimov.author.name, "Isaac Asimov");
    let books: Vec<i64> = asimov.books.iter().map(|b| b.id).collect();
    assert_eq!(books, vec![3, 4, 6]);
    // Two Foundation books, one without series
    assert_eq!(asimov.series, vec![Series { id: 2, name: "Foundation".into() }]);
    assert!(asimov.coauthors.is_empty());

    let brian = catalog.author(&scope, 3).unwrap();
    assert_eq!(names(&brian.coauthors), vec!["Kevin J. Anderson"]);
    assert_eq!(brian.series.len(), 1);
    assert_eq!(brian.series[0].name, "Dune");
}

#[test]
fn author_without_books_is_found() {
    let catalog = sample_catalog();
    let author = catalog.author(&RequestScope::new(), 5).unwrap();
    assert_eq!(author.author.name, "Unread Author");
    assert!(author.books.is_empty());
    assert!(author.series.is_empty());
    assert!(author.coauthors.is_empty());
}

#[test]
fn series_detail_orders_books_by_index() {
    let catalog = sample_catalog();
    let dune = catalog.series(&RequestScope::new(), 1).unwrap();
    assert_eq!(dune.summary.series.name, "Dune");
    assert_eq!(dune.summary.count, 3);
    assert_eq!(
        names(&dune.summary.authors),
        vec!["Brian Herbert", "Frank Herbert", "Kevin J. Anderson"]
    );

    let books: Vec<(i64, f64)> = dune.books.iter().map(|b| (b.id, b.series_index)).collect();
    assert_eq!(books, vec![(5, 0.5), (1, 1.0), (2, 2.0)]);
    assert!(dune.books.iter().all(|b| b.series.is_none()));
}

#[test]
fn empty_series_is_found() {
    let catalog = sample_catalog();
    let empty = catalog.series(&RequestScope::new(), 3).unwrap();
    assert_eq!(empty.summary.count, 0);
    assert!(empty.books.is_empty());
    assert!(empty.summary.authors.is_empty());
}

#[test]
fn missing_ids_are_not_found() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();

    let err = catalog.book(&scope, 99).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        QueryError::NotFound {
            family: EntityFamily::Book,
            id: 99
        }
    ));

    assert!(matches!(
        catalog.author(&scope, 99),
        Err(QueryError::NotFound {
            family: EntityFamily::Author,
            ..
        })
    ));
    assert!(matches!(
        catalog.series(&scope, 99),
        Err(QueryError::NotFound {
            family: EntityFamily::Series,
            ..
        })
    ));
}

#[test]
fn not_found_message_names_the_record() {
    let catalog = sample_catalog();
    let err = catalog.series(&RequestScope::new(), 42).unwrap_err();
    assert_eq!(err.to_string(), "No series with id 42");
}

#[test]
fn relation_failure_fails_the_whole_request() {
    let conn = sample_connection();
    conn.execute_batch("DROP TABLE books_tags_link").unwrap();
    let catalog = Catalog::new(CatalogStore::from_connection(conn), EngineConfig::default());
    let scope = RequestScope::new();

    // The primary queries still compile; only the tag relation is broken
    let page = catalog.list_books(&scope, Sort::default(), PageRequest::new(3, 0));
    assert!(
        matches!(
            &page,
            Err(QueryError::Configuration { key, .. }) if key.kind() == QueryKind::BooksTags
        ),
        "{page:?}"
    );

    let detail = catalog.book(&scope, 1);
    assert!(
        matches!(
            &detail,
            Err(QueryError::Configuration { key, .. }) if key.kind() == QueryKind::BookTags
        ),
        "{detail:?}"
    );

    let search = SearchRequest::new(["dune"], MatchMode::Any).unwrap();
    assert!(catalog.search_books(&scope, &search, PageRequest::default()).is_err());

    // Relations that do not touch tags are unaffected
    assert!(catalog.author(&scope, 1).is_ok());
    assert!(catalog.series(&scope, 1).is_ok());
}
