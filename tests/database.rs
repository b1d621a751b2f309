use std::path::Path;
use std::sync::Arc;

use chdb::engines::{MockEngine, MockResponse, MockResponseBuilder};
use chdb::traits::QueryEngine;
use chdb::{ChdbError, Database, SqlValue};

fn as_engine(mock: &Arc<MockEngine>) -> Arc<dyn QueryEngine> {
    Arc::clone(mock) as Arc<dyn QueryEngine>
}

#[test]
fn test_open_builds_engine_argv() {
    let mock = Arc::new(MockEngine::new());
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let args = mock.recorded_connect_args().remove(0);
    assert_eq!(args[0], "clickhouse");
    assert!(args[1].starts_with("--path="));
    assert!(!db.readonly());
}

#[test]
fn test_readonly_session() {
    let mock = Arc::new(MockEngine::new());
    let db = Database::open_with_engine(as_engine(&mock), ":memory:?readonly=1").unwrap();

    assert!(db.readonly());
    let args = mock.recorded_connect_args().remove(0);
    assert_eq!(args.last().unwrap(), "--readonly=1");
}

#[test]
fn test_execute_parses_rows_with_names() {
    let mock = Arc::new(
        MockEngine::new().with_response(
            MockResponseBuilder::new()
                .body("id,name\n1,Alice\n2,Bob\n")
                .rows_read(2)
                .build(),
        ),
    );
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let mut rows = db.execute("SELECT id, name FROM users", &[]).unwrap();
    assert_eq!(rows.columns(), ["id", "name"]);

    let first = rows.next().unwrap();
    assert_eq!(first.get("id"), Some("1"));
    assert_eq!(first.get("name"), Some("Alice"));
    let second = rows.next().unwrap();
    assert_eq!(second.get_index(1), Some("Bob"));
    assert!(rows.next().is_none());

    let last = mock.last_query().unwrap();
    assert_eq!(last.format, "CSVWithNames");
}

#[test]
fn test_placeholder_binding_reaches_the_engine() {
    let mock = Arc::new(MockEngine::new());
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    db.execute(
        "SELECT * FROM users WHERE name = ? AND age > ?",
        &[SqlValue::from("O'Brien"), SqlValue::Int32(30)],
    )
    .unwrap();

    let last = mock.last_query().unwrap();
    assert_eq!(
        last.sql,
        "SELECT * FROM users WHERE name = 'O''Brien' AND age > 30"
    );
}

#[test]
fn test_prepared_statement_bind_param_positions() {
    let mock = Arc::new(MockEngine::new());
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let mut stmt = db.prepare("SELECT ?, ?, ?").unwrap();
    stmt.bind_param(3, "last");
    stmt.bind_param(1, 10i64);
    stmt.execute().unwrap();

    // Position 2 was never bound and renders as NULL.
    assert_eq!(mock.last_query().unwrap().sql, "SELECT 10, NULL, 'last'");
}

#[test]
fn test_query_with_format_returns_raw_buffer() {
    let mock = Arc::new(
        MockEngine::new()
            .with_response(MockResponseBuilder::new().body("{\"n\":1}\n").build()),
    );
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let buf = db
        .query_with_format("SELECT 1 AS n", &[], "JSONEachRow")
        .unwrap();
    assert_eq!(buf, b"{\"n\":1}\n");
    assert_eq!(mock.last_query().unwrap().format, "JSONEachRow");
}

#[test]
fn test_get_first_value() {
    let mock = Arc::new(
        MockEngine::new().with_response(MockResponseBuilder::new().body("n\n42\n").build()),
    );
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let value = db.get_first_value("SELECT count() AS n", &[]).unwrap();
    assert_eq!(value.as_deref(), Some("42"));
}

#[test]
fn test_empty_result_yields_no_rows() {
    let mock = Arc::new(MockEngine::new());
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let mut rows = db.execute("SELECT 1 WHERE 0", &[]).unwrap();
    assert!(rows.columns().is_empty());
    assert!(rows.next().is_none());
    assert!(db.get_first_row("SELECT 1 WHERE 0", &[]).unwrap().is_none());
}

#[test]
fn test_native_error_propagates_and_frees() {
    let mock = Arc::new(MockEngine::new().with_response(MockResponse::Error(
        "Unknown table expression identifier 'nonexistent_table'".to_string(),
    )));
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    match db.execute("SELECT * FROM nonexistent_table", &[]) {
        Err(ChdbError::Native(msg)) => assert!(msg.contains("nonexistent_table")),
        other => panic!("Expected Native error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(mock.live_results(), 0);
}

#[test]
fn test_close_is_idempotent_and_blocks_further_use() {
    let mock = Arc::new(MockEngine::new());
    let mut db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    db.close();
    db.close();
    assert!(db.closed());
    assert_eq!(mock.close_count(), 1);

    assert!(matches!(db.prepare("SELECT 1"), Err(ChdbError::Usage(_))));
    assert!(matches!(
        db.execute("SELECT 1", &[]),
        Err(ChdbError::Usage(_))
    ));
}

#[test]
fn test_memory_session_removes_its_data_dir_on_close() {
    let mock = Arc::new(MockEngine::new());
    let mut db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let args = mock.recorded_connect_args().remove(0);
    let dir = args[1].strip_prefix("--path=").unwrap().to_string();
    assert!(Path::new(&dir).is_dir());

    db.close();
    assert!(!Path::new(&dir).exists());
}

#[test]
fn test_get_first_row_reads_by_name() {
    let mock = Arc::new(
        MockEngine::new().with_response(MockResponseBuilder::new().body("n\n7\n").build()),
    );
    let db = Database::open_with_engine(as_engine(&mock), ":memory:").unwrap();

    let row = db.get_first_row("SELECT 7 AS n", &[]).unwrap().unwrap();
    assert_eq!(row.get("n"), Some("7"));
}
