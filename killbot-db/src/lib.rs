//! Relational persistence for the kill notification bot.
//!
//! [`RelationalStore`] maps organizations and static-data lookups onto a
//! [`RelationalConnection`], backed by MySQL (via sqlx, `mysql` feature) or
//! SQLite (via rusqlite with the bundled feature).

pub mod config;
pub mod connection;
pub mod error;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod organizations;
pub mod reference;
pub mod schema;
pub mod sqlite;
pub mod store;
pub mod value;

pub use config::{
    Backend, ConfigSource, ConfigSources, DatabaseConfig, config_path, config_sources,
};
pub use connection::{ExecResult, RelationalConnection};
pub use error::StoreError;
#[cfg(feature = "mysql")]
pub use mysql::MySqlConnection;
pub use organizations::SaveOutcome;
pub use reference::INVALID_REGION_ID;
pub use schema::{create_schema, open_database, open_memory};
pub use sqlite::SqliteConnection;
pub use store::RelationalStore;
pub use value::{FromValue, ResultSet, RowRef, Value};

pub use killbot_core::{EventCategory, IgnoredRegion, Organization};
