use killbot_db::*;

fn seed_static_data(store: &RelationalStore) {
    let conn = store.connection().unwrap();
    for (type_id, name) in [(587, "Rifter"), (24690, "Drake"), (670, "Capsule")] {
        conn.execute(
            "INSERT INTO invTypes (typeID, typeName) VALUES (?, ?)",
            &[Value::from(type_id), Value::from(name)],
        )
        .unwrap();
    }
    for (system_id, region_id) in [(30000142, 10000002), (30002187, 10000043)] {
        conn.execute(
            "INSERT INTO mapSolarSystems (solarSystemID, regionID) VALUES (?, ?)",
            &[Value::from(system_id), Value::from(region_id)],
        )
        .unwrap();
    }
}

#[test]
fn ship_name_lookup() {
    let store = open_memory().unwrap();
    seed_static_data(&store);

    assert_eq!(store.query_ship_name(587).unwrap(), "Rifter");
    assert_eq!(store.query_ship_name(24690).unwrap(), "Drake");
}

#[test]
fn unknown_ship_type_is_not_found() {
    let store = open_memory().unwrap();
    seed_static_data(&store);

    let err = store.query_ship_name(1).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: "ship type",
            id: 1
        }
    ));
}

#[test]
fn region_lookup() {
    let store = open_memory().unwrap();
    seed_static_data(&store);

    assert_eq!(store.query_region_id(30000142).unwrap(), 10000002);
    assert_eq!(store.query_region_id(30002187).unwrap(), 10000043);
}

#[test]
fn unknown_solar_system_yields_error_and_sentinel() {
    let store = open_memory().unwrap();
    seed_static_data(&store);

    let result = store.query_region_id(31000005);
    let err = result.as_ref().unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert_eq!(result.unwrap_or(INVALID_REGION_ID), -1);
}

#[test]
fn lookups_before_connect_fail() {
    let store = RelationalStore::new(DatabaseConfig::sqlite(":memory:"));
    assert!(matches!(store.query_ship_name(587), Err(StoreError::NotConnected)));
    assert!(matches!(
        store.query_region_id(30000142),
        Err(StoreError::NotConnected)
    ));
}
