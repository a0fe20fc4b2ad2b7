use killbot_db::schema::TABLES;
use killbot_db::*;

#[test]
fn all_tables_exist() {
    let store = open_memory().unwrap();
    for table in TABLES {
        let rows = store
            .raw_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?",
                &[Value::from(*table)],
            )
            .unwrap();
        assert_eq!(rows.len(), 1, "table '{}' should exist", table);
    }
}

#[test]
fn schema_is_idempotent() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    create_schema(&conn).unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
}

#[test]
fn open_database_keeps_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("killbot.db");

    let store = open_database(&path).unwrap();
    let mut org = Organization::new(98765);
    store.save_organization(&mut org).unwrap();
    drop(store);

    let store = open_database(&path).unwrap();
    assert_eq!(store.load_all_organizations().unwrap().len(), 1);
    assert_eq!(store.config().backend, Backend::Sqlite);
}

#[test]
fn foreign_keys_enabled() {
    let store = open_memory().unwrap();
    let err = store
        .connection()
        .unwrap()
        .execute(
            "INSERT INTO ignoredregions (corporationID, regionid) VALUES (?, ?)",
            &[Value::from(12), Value::from(10000002)],
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Sqlite(_)));
}
