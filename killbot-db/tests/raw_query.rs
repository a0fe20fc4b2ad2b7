use chrono::NaiveDate;
use killbot_db::*;

#[test]
fn empty_result_is_empty_vec() {
    let store = open_memory().unwrap();
    let rows = store
        .raw_query("SELECT id, name FROM corporations WHERE id = ?", &[Value::from(1)])
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn columns_come_from_the_query() {
    let store = open_memory().unwrap();
    let mut org = Organization::new(98765);
    store.save_organization(&mut org).unwrap();

    let rows = store
        .raw_query(
            "SELECT id AS corp, evecorporationid * 2 AS doubled, name, NULL AS nothing, 1.5 AS ratio \
             FROM corporations WHERE evecorporationid = ?",
            &[Value::from(98765)],
        )
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.len(), 5);
    assert_eq!(row["corp"], Value::Integer(1));
    assert_eq!(row["doubled"], Value::Integer(197530));
    assert_eq!(row["name"], Value::Text(String::new()));
    assert_eq!(row["nothing"], Value::Null);
    assert_eq!(row["ratio"], Value::Float(1.5));
}

#[test]
fn text_and_blob_parameters_bind() {
    let store = open_memory().unwrap();
    let rows = store
        .raw_query(
            "SELECT ? AS greeting, ? AS payload, ? AS missing",
            &[
                Value::from("o7"),
                Value::from(vec![0xde, 0xad]),
                Value::from(None::<i64>),
            ],
        )
        .unwrap();

    assert_eq!(rows[0]["greeting"], Value::Text("o7".to_string()));
    assert_eq!(rows[0]["payload"], Value::Bytes(vec![0xde, 0xad]));
    assert!(rows[0]["missing"].is_null());
}

#[test]
fn datetime_columns_are_parsed() {
    let store = open_memory().unwrap();
    let conn = store.connection().unwrap();
    conn.execute(
        "CREATE TABLE kills (killid INTEGER PRIMARY KEY, killtime DATETIME, killdate DATE)",
        &[],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO kills (killid, killtime, killdate) VALUES (?, ?, ?)",
        &[
            Value::from(1),
            Value::from("2024-05-01 12:30:00"),
            Value::from("2024-05-01"),
        ],
    )
    .unwrap();

    let rows = store
        .raw_query("SELECT killtime, killdate FROM kills", &[])
        .unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    assert_eq!(
        rows[0]["killtime"],
        Value::DateTime(day.and_hms_opt(12, 30, 0).unwrap())
    );
    assert_eq!(rows[0]["killdate"], Value::Date(day));
}

#[test]
fn datetime_parameters_round_trip() {
    let store = open_memory().unwrap();
    let conn = store.connection().unwrap();
    conn.execute("CREATE TABLE events (at DATETIME)", &[]).unwrap();

    let at = NaiveDate::from_ymd_opt(2023, 12, 31)
        .unwrap()
        .and_hms_opt(23, 59, 58)
        .unwrap();
    conn.execute("INSERT INTO events (at) VALUES (?)", &[Value::from(at)])
        .unwrap();

    let rows = store.raw_query("SELECT at FROM events", &[]).unwrap();
    assert_eq!(rows[0]["at"].as_datetime(), Some(at));
}

#[test]
fn undecodable_row_fails_the_whole_query() {
    let store = open_memory().unwrap();
    let err = store
        .raw_query(
            "SELECT 'ok' AS label UNION ALL SELECT CAST(x'66ff6f' AS TEXT)",
            &[],
        )
        .unwrap_err();
    assert!(
        matches!(err, StoreError::RowScan { row: 1, ref column, .. } if column == "label"),
        "unexpected error: {err}"
    );
}

#[test]
fn malformed_sql_is_an_execution_error() {
    let store = open_memory().unwrap();
    let err = store.raw_query("SELEC nonsense", &[]).unwrap_err();
    assert!(matches!(err, StoreError::Sqlite(_)));
}

#[test]
fn raw_query_before_connect_fails() {
    let store = RelationalStore::new(DatabaseConfig::sqlite(":memory:"));
    assert!(matches!(
        store.raw_query("SELECT 1", &[]),
        Err(StoreError::NotConnected)
    ));
}
