use folio_db::schema::{REQUIRED_TABLES, check_schema, create_schema};
use folio_db::{SchemaError, open_memory};
use rusqlite::Connection;

#[test]
fn created_schema_passes_check() {
    let conn = open_memory().unwrap();
    check_schema(&conn).unwrap();
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
    check_schema(&conn).unwrap();
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    for table in REQUIRED_TABLES {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "Table '{table}' should exist");
    }
}

#[test]
fn check_names_missing_table() {
    let conn = open_memory().unwrap();
    conn.execute_batch("DROP TABLE books_tags_link").unwrap();
    match check_schema(&conn) {
        Err(SchemaError::MissingTable(name)) => assert_eq!(name, "books_tags_link"),
        other => panic!("expected MissingTable, got {other:?}"),
    }
}

#[test]
fn empty_database_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        check_schema(&conn),
        Err(SchemaError::MissingTable(_))
    ));
}
