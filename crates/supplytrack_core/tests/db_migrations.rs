use rusqlite::Connection;
use supplytrack_core::db::migrations::latest_version;
use supplytrack_core::db::{connect, open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "items");
    assert_table_exists(&conn, "events");
    assert_table_exists(&conn, "item_events");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("supplytrack.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "items");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn connect_requires_migrated_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bare.db");
    Connection::open(&path).unwrap();

    let err = connect(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaNotReady {
            db_version: 0,
            ..
        }
    ));

    drop(open_db(&path).unwrap());
    let conn = connect(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn connect_does_not_create_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");

    assert!(matches!(connect(&path).unwrap_err(), DbError::Sqlite(_)));
    assert!(!path.exists());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
