use focusdo_core::db::{open_db, open_db_in_memory, DbError};
use focusdo_core::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError,
    UnavailableKeyValueStore,
};
use rusqlite::Connection;

#[test]
fn sqlite_store_round_trips_and_upserts() {
    let mut store = SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap();

    assert_eq!(store.get("focusdo-plan-v1").unwrap(), None);
    store.set("focusdo-plan-v1", "first").unwrap();
    store.set("focusdo-plan-v1", "second").unwrap();
    assert_eq!(
        store.get("focusdo-plan-v1").unwrap().as_deref(),
        Some("second")
    );

    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn sqlite_store_remove_reports_presence() {
    let mut store = SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap();
    store.set("focusdo-plan-v1", "{}").unwrap();

    assert!(store.remove("focusdo-plan-v1").unwrap());
    assert!(!store.remove("focusdo-plan-v1").unwrap());
    assert_eq!(store.get("focusdo-plan-v1").unwrap(), None);
}

#[test]
fn sqlite_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteKeyValueStore::try_new(conn)
        .err()
        .expect("unmigrated connection should be rejected");
    assert!(matches!(
        err,
        StorageError::Db(DbError::SchemaBehind { found: 0, .. })
    ));
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusdo.db");

    let mut store = SqliteKeyValueStore::try_new(open_db(&path).unwrap()).unwrap();
    store.set("focusdo-plan-v1", "persisted").unwrap();
    drop(store);

    let store = SqliteKeyValueStore::try_new(open_db(&path).unwrap()).unwrap();
    assert_eq!(
        store.get("focusdo-plan-v1").unwrap().as_deref(),
        Some("persisted")
    );
}

#[test]
fn memory_store_failure_switches() {
    let mut store = MemoryKeyValueStore::with_entry("k-v1", "old");

    store.fail_writes(true);
    let err = store.set("k-v1", "new").unwrap_err();
    assert!(matches!(err, StorageError::Rejected(_)));
    assert_eq!(store.peek("k-v1"), Some("old"));

    store.fail_reads(true);
    assert!(matches!(store.get("k-v1"), Err(StorageError::Unavailable)));
}

#[test]
fn unavailable_store_fails_every_call() {
    let mut store = UnavailableKeyValueStore;
    assert!(matches!(store.get("k-v1"), Err(StorageError::Unavailable)));
    assert!(matches!(
        store.set("k-v1", "v"),
        Err(StorageError::Unavailable)
    ));
}
