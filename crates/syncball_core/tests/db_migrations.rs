use rusqlite::Connection;
use syncball_core::db::migrations::{apply_migrations, current_version, latest_version};
use syncball_core::db::{open_db, open_db_in_memory, DbError};
use syncball_core::{RepoError, RepositoryManager, TransactionState};

const TABLES: [&str; 10] = [
    "Countries",
    "Leagues",
    "Teams",
    "Venues",
    "Seasons",
    "Coverage",
    "Fixtures",
    "FixtureStats",
    "SystemSettings",
    "InstallInfo",
];

#[test]
fn open_db_does_not_migrate() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(current_version(&conn).unwrap(), 0);
    assert_eq!(foreign_keys_enabled(&conn), 1);
}

#[test]
fn migrate_creates_every_table_and_records_version() {
    let manager = RepositoryManager::open_in_memory().unwrap();
    assert_eq!(manager.migrate().unwrap(), latest_version());
    assert_eq!(manager.schema_version().unwrap(), latest_version());

    for table in TABLES {
        assert_table_exists(manager.connection(), table);
    }
    assert_index_is_unique(manager.connection(), "IX_Coverage_SeasonId");
}

#[test]
fn migrating_same_file_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("syncball.db");

    let first = RepositoryManager::open(&path).unwrap();
    assert_eq!(first.migrate().unwrap(), latest_version());
    drop(first);

    let second = RepositoryManager::open(&path).unwrap();
    assert_eq!(second.migrate().unwrap(), 0);
    assert_eq!(second.schema_version().unwrap(), latest_version());
}

#[test]
fn newer_store_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    match apply_migrations(&conn).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
    drop(conn);

    let manager = RepositoryManager::open(&path).unwrap();
    let err = manager.migrate().unwrap_err();
    assert!(matches!(
        err,
        RepoError::Db(DbError::UnsupportedSchemaVersion { db_version: 999, .. })
    ));
}

#[test]
fn migrate_is_rejected_inside_a_transaction() {
    let manager = RepositoryManager::open_in_memory().unwrap();
    manager.begin_transaction().unwrap();

    let err = manager.migrate().unwrap_err();
    assert!(matches!(
        err,
        RepoError::TransactionState {
            operation: "migrate",
            state: TransactionState::InTransaction,
        }
    ));
    assert_eq!(manager.schema_version().unwrap(), 0);
    manager.rollback_transaction().unwrap();
}

fn foreign_keys_enabled(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
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

fn assert_index_is_unique(conn: &Connection, index_name: &str) {
    let sql: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'index' AND name = ?1;",
            [index_name],
            |row| row.get(0),
        )
        .unwrap();
    assert!(sql.starts_with("CREATE UNIQUE INDEX"), "{sql}");
}
