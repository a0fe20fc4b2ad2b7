//! SQLite table definitions for local development and tests.
//!
//! Production runs against an existing MySQL database whose tables are
//! managed outside this crate; these definitions only mirror the table and
//! column names the store queries.

use std::path::Path;

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::sqlite::SqliteConnection;
use crate::store::RelationalStore;

/// Tables the store reads and writes.
pub const TABLES: &[&str] = &["corporations", "ignoredregions", "invTypes", "mapSolarSystems"];

/// Create all tables if they don't exist.
///
/// This is idempotent and safe to call on an existing database.
pub fn create_schema(conn: &SqliteConnection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Open or create a SQLite database at the given path, with all tables present.
pub fn open_database(path: &Path) -> Result<RelationalStore, StoreError> {
    let conn = SqliteConnection::open(path)?;
    create_schema(&conn)?;
    Ok(RelationalStore::with_connection(
        DatabaseConfig::sqlite(path),
        conn,
    ))
}

/// Open a connected in-memory store with all tables. Useful for testing.
pub fn open_memory() -> Result<RelationalStore, StoreError> {
    let conn = SqliteConnection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(RelationalStore::with_connection(
        DatabaseConfig::sqlite(":memory:"),
        conn,
    ))
}

const SCHEMA_SQL: &str = r#"
-- Tracked corporations
CREATE TABLE IF NOT EXISTS corporations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    evecorporationid INTEGER NOT NULL,
    lastkillid INTEGER NOT NULL DEFAULT 0,
    lastlossid INTEGER NOT NULL DEFAULT 0,
    name TEXT NOT NULL DEFAULT '',
    killcomment TEXT NOT NULL DEFAULT '',
    losscomment TEXT NOT NULL DEFAULT ''
);

-- Regions a corporation does not want notifications for
CREATE TABLE IF NOT EXISTS ignoredregions (
    corporationID INTEGER NOT NULL REFERENCES corporations(id),
    regionid INTEGER NOT NULL,
    PRIMARY KEY (corporationID, regionid)
);

-- Static data export: ship and item types
CREATE TABLE IF NOT EXISTS invTypes (
    typeID INTEGER PRIMARY KEY,
    typeName TEXT NOT NULL
);

-- Static data export: solar system to region mapping
CREATE TABLE IF NOT EXISTS mapSolarSystems (
    solarSystemID INTEGER PRIMARY KEY,
    regionID INTEGER NOT NULL
);
"#;
