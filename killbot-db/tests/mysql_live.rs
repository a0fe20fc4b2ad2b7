//! Tests against a real MySQL server.
//!
//! Run with:
//! KILLBOT_TEST_MYSQL_HOST=127.0.0.1:3306 KILLBOT_TEST_MYSQL_USER=root \
//! KILLBOT_TEST_MYSQL_PASSWORD=... KILLBOT_TEST_MYSQL_SCHEMA=killbot_test \
//! cargo test -p killbot-db --test mysql_live -- --ignored
#![cfg(feature = "mysql")]

use killbot_db::*;

fn test_config() -> DatabaseConfig {
    let var = |name: &str| std::env::var(name).unwrap_or_else(|_| panic!("{name} required"));
    DatabaseConfig::mysql(
        var("KILLBOT_TEST_MYSQL_HOST"),
        var("KILLBOT_TEST_MYSQL_USER"),
        std::env::var("KILLBOT_TEST_MYSQL_PASSWORD").unwrap_or_default(),
        var("KILLBOT_TEST_MYSQL_SCHEMA"),
    )
}

fn connected_store() -> RelationalStore {
    let mut store = RelationalStore::new(test_config());
    store.connect().expect("connect failed");
    let conn = store.connection().unwrap();
    for sql in [
        "DROP TABLE IF EXISTS ignoredregions",
        "DROP TABLE IF EXISTS corporations",
        "CREATE TABLE corporations (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            evecorporationid BIGINT NOT NULL,
            lastkillid BIGINT NOT NULL DEFAULT 0,
            lastlossid BIGINT NOT NULL DEFAULT 0,
            name VARCHAR(255) NOT NULL DEFAULT '',
            killcomment VARCHAR(255) NOT NULL DEFAULT '',
            losscomment VARCHAR(255) NOT NULL DEFAULT ''
        )",
        "CREATE TABLE ignoredregions (
            corporationID BIGINT NOT NULL,
            regionid BIGINT NOT NULL,
            PRIMARY KEY (corporationID, regionid)
        )",
    ] {
        conn.execute(sql, &[]).unwrap();
    }
    store
}

#[test]
#[ignore = "requires database"]
fn save_and_reload_organization() {
    let store = connected_store();
    let mut org = Organization::new(98765);
    assert_eq!(
        store.save_organization(&mut org).unwrap(),
        SaveOutcome::Inserted { id: 1 }
    );

    org.last_kill_id = 42;
    assert_eq!(store.save_organization(&mut org).unwrap(), SaveOutcome::Updated);
    // Unchanged values report zero affected rows; still not an error
    assert_eq!(store.save_organization(&mut org).unwrap(), SaveOutcome::Updated);

    let loaded = store.load_organization(1).unwrap();
    assert_eq!(loaded.last_kill_id, 42);
    assert_eq!(loaded.external_id, 98765);
}

#[test]
#[ignore = "requires database"]
fn raw_query_decodes_native_types() {
    let store = connected_store();
    let rows = store
        .raw_query(
            "SELECT 1 AS one, CAST('2024-05-01 12:30:00' AS DATETIME) AS at, ? AS label, NULL AS nothing",
            &[Value::from("o7")],
        )
        .unwrap();
    assert_eq!(rows[0]["one"], Value::Integer(1));
    assert!(rows[0]["at"].as_datetime().is_some());
    assert_eq!(rows[0]["label"], Value::Text("o7".to_string()));
    assert!(rows[0]["nothing"].is_null());
}

#[test]
#[ignore = "requires database"]
fn bad_credentials_fail_to_connect() {
    let mut config = test_config();
    config.password = "definitely-not-the-password".to_string();
    let mut store = RelationalStore::new(config);
    assert!(matches!(store.connect(), Err(StoreError::Connect { .. })));
    assert!(!store.is_connected());
}
