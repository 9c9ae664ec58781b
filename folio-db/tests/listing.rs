mod common;

use common::{catalog_of_titles, catalog_with, sample_catalog};
use folio_catalog::*;
use folio_db::*;

fn titles(listing: &Listing<BookSummary>) -> Vec<&str> {
    listing.results.iter().map(|b| b.book.title.as_str()).collect()
}

fn ids(listing: &Listing<BookSummary>) -> Vec<i64> {
    listing.results.iter().map(|b| b.book.id).collect()
}

fn by_title() -> Sort {
    Sort::new(SortField::Name, Direction::Asc)
}

fn search(terms: &[&str], mode: MatchMode) -> SearchRequest {
    SearchRequest::new(terms.iter().copied(), mode).unwrap()
}

// ── Sorted pages ────────────────────────────────────────────────────────────

#[test]
fn overfetch_reports_next_page() {
    let catalog = catalog_of_titles(&["C", "A", "B"]);
    let scope = RequestScope::new();
    let page = catalog
        .list_books(&scope, by_title(), PageRequest::new(2, 0))
        .unwrap();
    assert_eq!(titles(&page), vec!["A", "B"]);
    assert!(page.more);
    assert_eq!(page.count, None);
}

#[test]
fn last_page_has_no_more() {
    let catalog = catalog_of_titles(&["C", "A", "B"]);
    let scope = RequestScope::new();
    let page = catalog
        .list_books(&scope, by_title(), PageRequest::new(2, 2))
        .unwrap();
    assert_eq!(titles(&page), vec!["C"]);
    assert!(!page.more);

    // Exactly `limit` rows left is still the last page
    let exact = catalog
        .list_books(&scope, by_title(), PageRequest::new(3, 0))
        .unwrap();
    assert_eq!(exact.len(), 3);
    assert!(!exact.more);
}

#[test]
fn page_past_the_end_is_empty() {
    let catalog = sample_catalog();
    let page = catalog
        .list_books(&RequestScope::new(), Sort::default(), PageRequest::new(5, 100))
        .unwrap();
    assert!(page.is_empty());
    assert!(!page.more);
}

#[test]
fn page_never_exceeds_limit() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    for limit in 1..=8 {
        for offset in 0..=8 {
            let page = catalog
                .list_books(&scope, Sort::default(), PageRequest::new(limit, offset))
                .unwrap();
            assert!(page.len() <= limit);
            assert_eq!(page.more, offset + limit < 7, "limit {limit} offset {offset}");
        }
    }
}

#[test]
fn books_sorted_in_every_direction() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    let all = PageRequest::new(10, 0);

    let id_asc = catalog.list_books(&scope, Sort::default(), all).unwrap();
    assert_eq!(ids(&id_asc), vec![1, 2, 3, 4, 5, 6, 7]);

    let id_desc = catalog
        .list_books(&scope, Sort::new(SortField::Id, Direction::Desc), all)
        .unwrap();
    assert_eq!(ids(&id_desc), vec![7, 6, 5, 4, 3, 2, 1]);

    let title_asc = catalog.list_books(&scope, by_title(), all).unwrap();
    assert_eq!(ids(&title_asc), vec![7, 5, 1, 2, 3, 4, 6]);

    let title_desc = catalog
        .list_books(&scope, Sort::new(SortField::Name, Direction::Desc), all)
        .unwrap();
    assert_eq!(ids(&title_desc), vec![6, 4, 3, 2, 1, 5, 7]);
}

#[test]
fn page_carries_authors_tags_and_series() {
    let catalog = sample_catalog();
    let page = catalog
        .list_books(&RequestScope::new(), by_title(), PageRequest::new(3, 0))
        .unwrap();
    assert_eq!(ids(&page), vec![7, 5, 1]);

    let pure = &page.results[0];
    assert!(pure.authors.is_empty());
    assert!(pure.tags.is_empty());
    assert_eq!(pure.book.series, None);

    let jihad = &page.results[1];
    let names: Vec<&str> = jihad.authors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Brian Herbert", "Kevin J. Anderson"]);
    assert_eq!(jihad.tags, vec!["prequel"]);
    assert_eq!(jihad.book.series_index, 0.5);

    let dune = &page.results[2];
    assert_eq!(dune.authors, vec![Author { id: 1, name: "Frank Herbert".into() }]);
    assert_eq!(dune.tags, vec!["classic", "sf"]);
    assert_eq!(
        dune.book.series,
        Some(Series { id: 1, name: "Dune".into() })
    );
}

#[test]
fn relations_cover_only_the_window() {
    let catalog = sample_catalog();
    let page = catalog
        .list_books(
            &RequestScope::new(),
            Sort::new(SortField::Id, Direction::Desc),
            PageRequest::new(2, 1),
        )
        .unwrap();
    assert_eq!(ids(&page), vec![6, 5]);
    assert_eq!(page.results[0].authors[0].name, "Isaac Asimov");
    assert_eq!(page.results[1].authors.len(), 2);
}

#[test]
fn authors_page_counts_books() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    let page = catalog
        .list_authors(&scope, Sort::default(), PageRequest::new(10, 0))
        .unwrap();
    let rows: Vec<(i64, i64)> = page
        .results
        .iter()
        .map(|a| (a.author.id, a.count))
        .collect();
    // Authors without books are not listed
    assert_eq!(rows, vec![(1, 2), (2, 3), (3, 1), (4, 1)]);

    let by_name = catalog
        .list_authors(&scope, Sort::new(SortField::Name, Direction::Asc), PageRequest::new(2, 0))
        .unwrap();
    let names: Vec<&str> = by_name.results.iter().map(|a| a.author.name.as_str()).collect();
    assert_eq!(names, vec!["Kevin J. Anderson", "Isaac Asimov"]);
    assert!(by_name.more);
}

#[test]
fn series_page_has_counts_and_authors() {
    let catalog = sample_catalog();
    let page = catalog
        .list_series(&RequestScope::new(), Sort::default(), PageRequest::new(10, 0))
        .unwrap();
    assert_eq!(page.len(), 3);
    assert!(!page.more);

    let dune = &page.results[0];
    assert_eq!(dune.count, 3);
    let names: Vec<&str> = dune.authors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Brian Herbert", "Frank Herbert", "Kevin J. Anderson"]);

    let foundation = &page.results[1];
    assert_eq!(foundation.count, 2);
    assert_eq!(foundation.authors.len(), 1);

    let empty = &page.results[2];
    assert_eq!(empty.series.name, "Empty Shelf");
    assert_eq!(empty.count, 0);
    assert!(empty.authors.is_empty());
}

#[test]
fn series_sorted_by_name_desc() {
    let catalog = sample_catalog();
    let page = catalog
        .list_series(
            &RequestScope::new(),
            Sort::new(SortField::Name, Direction::Desc),
            PageRequest::new(2, 0),
        )
        .unwrap();
    let names: Vec<&str> = page.results.iter().map(|s| s.series.name.as_str()).collect();
    assert_eq!(names, vec!["Foundation", "Empty Shelf"]);
    assert!(page.more);
    assert_eq!(page.results[0].authors[0].name, "Isaac Asimov");
}

#[test]
fn repeated_listing_is_identical() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    let sort = Sort::new(SortField::Name, Direction::Desc);
    let first = catalog.list_books(&scope, sort, PageRequest::new(4, 1)).unwrap();
    let second = catalog.list_books(&scope, sort, PageRequest::new(4, 1)).unwrap();
    assert_eq!(first, second);
}

// ── Searches ────────────────────────────────────────────────────────────────

#[test]
fn search_any_matches_either_term() {
    let catalog = sample_catalog();
    let found = catalog
        .search_books(
            &RequestScope::new(),
            &search(&["dune", "herbert"], MatchMode::Any),
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(ids(&found), vec![1, 2]);
    assert_eq!(found.count, Some(SearchCount::Exact(2)));
    assert!(!found.more);
}

#[test]
fn search_all_requires_every_term() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    let found = catalog
        .search_books(
            &scope,
            &search(&["foundation", "empire"], MatchMode::All),
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(ids(&found), vec![4]);

    let any = catalog
        .search_books(
            &scope,
            &search(&["foundation", "empire"], MatchMode::Any),
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(ids(&any), vec![3, 4]);
}

#[test]
fn search_is_case_insensitive() {
    let catalog = sample_catalog();
    let found = catalog
        .search_books(
            &RequestScope::new(),
            &search(&["DUNE"], MatchMode::Any),
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(ids(&found), vec![1, 2]);
}

#[test]
fn search_count_ignores_limit() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    let terms = search(&["o"], MatchMode::Any);

    let wide = catalog
        .search_books(&scope, &terms, PageRequest::new(10, 0))
        .unwrap();
    let narrow = catalog
        .search_books(&scope, &terms, PageRequest::new(1, 0))
        .unwrap();
    assert_eq!(wide.count, narrow.count);
    assert_eq!(narrow.len(), 1);
    assert!(narrow.more);
    assert_eq!(narrow.results[0].book.id, wide.results[0].book.id);
}

#[test]
fn search_attaches_relations() {
    let catalog = sample_catalog();
    let found = catalog
        .search_books(
            &RequestScope::new(),
            &search(&["jihad"], MatchMode::Any),
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.results[0].authors.len(), 2);
    assert_eq!(found.results[0].tags, vec!["prequel"]);
}

#[test]
fn search_without_matches_is_empty() {
    let catalog = sample_catalog();
    let found = catalog
        .search_books(
            &RequestScope::new(),
            &search(&["zzz"], MatchMode::Any),
            PageRequest::default(),
        )
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(found.count, Some(SearchCount::Exact(0)));
    assert!(!found.more);
}

#[test]
fn wildcards_match_literally() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    for term in ["%", "_", "0% P"] {
        let found = catalog
            .search_books(&scope, &search(&[term], MatchMode::Any), PageRequest::default())
            .unwrap();
        assert_eq!(ids(&found), vec![7], "term {term:?}");
    }
}

#[test]
fn search_scan_cap_reports_lower_bound() {
    let catalog = catalog_with(EngineConfig {
        max_search_scan: Some(3),
    });
    let scope = RequestScope::new();
    // "o" matches four sort titles
    let found = catalog
        .search_books(&scope, &search(&["o"], MatchMode::Any), PageRequest::new(2, 0))
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found.count, Some(SearchCount::AtLeast(3)));
    assert!(found.more);

    // Under the cap the count stays exact
    let few = catalog
        .search_books(&scope, &search(&["dune"], MatchMode::Any), PageRequest::new(2, 0))
        .unwrap();
    assert_eq!(few.count, Some(SearchCount::Exact(2)));
}

#[test]
fn author_search_includes_authors_without_books() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();
    let found = catalog
        .search_authors(&scope, &search(&["author"], MatchMode::Any), PageRequest::default())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.results[0].author.name, "Unread Author");
    assert_eq!(found.results[0].count, 0);

    let herberts = catalog
        .search_authors(&scope, &search(&["herbert"], MatchMode::Any), PageRequest::default())
        .unwrap();
    let names: Vec<&str> = herberts.results.iter().map(|a| a.author.name.as_str()).collect();
    assert_eq!(names, vec!["Brian Herbert", "Frank Herbert"]);
    assert_eq!(herberts.count, Some(SearchCount::Exact(2)));
}

#[test]
fn series_search_attaches_authors() {
    let catalog = sample_catalog();
    let found = catalog
        .search_series(
            &RequestScope::new(),
            &search(&["found"], MatchMode::Any),
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.results[0].count, 2);
    assert_eq!(found.results[0].authors[0].name, "Isaac Asimov");
}

#[test]
fn list_request_dispatches_on_search() {
    let catalog = sample_catalog();
    let scope = RequestScope::new();

    let sorted = catalog
        .books(&scope, &ListRequest::sorted(by_title(), PageRequest::new(2, 0)))
        .unwrap();
    assert_eq!(sorted.count, None);

    let searched = catalog
        .books(
            &scope,
            &ListRequest::search(search(&["robot"], MatchMode::All), PageRequest::new(2, 0)),
        )
        .unwrap();
    assert_eq!(ids(&searched), vec![6]);
    assert_eq!(searched.count, Some(SearchCount::Exact(1)));

    let series = catalog
        .series_list(&scope, &ListRequest::default())
        .unwrap();
    assert_eq!(series.len(), 3);

    let authors = catalog.authors(&scope, &ListRequest::default()).unwrap();
    assert_eq!(authors.len(), 4);
}

#[test]
fn book_count_covers_the_library() {
    let catalog = sample_catalog();
    assert_eq!(catalog.book_count(&RequestScope::new()).unwrap(), 7);
}
