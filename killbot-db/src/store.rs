//! The relational store: connection handling and raw queries.
//!
//! Typed entity access lives in `organizations` and `reference`, as further
//! `impl RelationalStore` blocks.

use std::collections::HashMap;
use std::path::Path;

use crate::config::{Backend, DatabaseConfig};
use crate::connection::RelationalConnection;
use crate::error::StoreError;
use crate::sqlite::SqliteConnection;
use crate::value::{ResultSet, RowRef, Value};

/// Maps domain entities to rows over a single relational connection.
///
/// There is no locking or transaction handling here: each method is one
/// statement, or a short fixed sequence of reads. Callers that load, mutate
/// and save the same organization from several places must serialize those
/// updates themselves.
pub struct RelationalStore {
    config: DatabaseConfig,
    conn: Option<Box<dyn RelationalConnection>>,
}

impl RelationalStore {
    /// A store that will connect with `config` once `connect()` is called.
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config, conn: None }
    }

    /// A store wrapping an already open connection.
    pub fn with_connection(
        config: DatabaseConfig,
        conn: impl RelationalConnection + 'static,
    ) -> Self {
        Self {
            config,
            conn: Some(Box::new(conn)),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Open a connection using the stored configuration.
    ///
    /// Replaces any existing connection. Nothing reconnects automatically:
    /// a dropped connection shows up as an error on the next call.
    pub fn connect(&mut self) -> Result<(), StoreError> {
        self.config.validate()?;
        let conn: Box<dyn RelationalConnection> = match self.config.backend {
            Backend::Sqlite => {
                let path = self
                    .config
                    .path
                    .as_deref()
                    .ok_or_else(|| StoreError::config("Missing database path"))?;
                if path == Path::new(":memory:") {
                    Box::new(SqliteConnection::open_in_memory()?)
                } else {
                    Box::new(SqliteConnection::open(path)?)
                }
            }
            Backend::MySql => connect_mysql(&self.config)?,
        };

        log::info!(
            "Connected to {} ({})",
            self.config.redacted_target(),
            conn.backend_name()
        );
        self.conn = Some(conn);
        Ok(())
    }

    /// The live connection, or `NotConnected` before `connect()` succeeds.
    pub fn connection(&self) -> Result<&dyn RelationalConnection, StoreError> {
        self.conn.as_deref().ok_or(StoreError::NotConnected)
    }

    /// Run an arbitrary parameterized SELECT.
    ///
    /// Columns are taken from the result metadata, so any query shape works.
    /// An empty result is an empty vec. If any row fails to decode the whole
    /// call fails; no row is skipped or zero-filled.
    pub fn raw_query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<HashMap<String, Value>>, StoreError> {
        Ok(self.connection()?.query(sql, params)?.into_maps())
    }

    pub(crate) fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet, StoreError> {
        self.connection()?.query(sql, params)
    }

    /// Run a query expected to match exactly one row and decode it with `map`.
    pub(crate) fn query_one<T>(
        &self,
        sql: &str,
        params: &[Value],
        entity: &'static str,
        id: i64,
        map: impl FnOnce(RowRef<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let rows = self.query(sql, params)?;
        match rows.first() {
            Some(row) => map(row),
            None => Err(StoreError::NotFound { entity, id }),
        }
    }
}

#[cfg(feature = "mysql")]
fn connect_mysql(config: &DatabaseConfig) -> Result<Box<dyn RelationalConnection>, StoreError> {
    Ok(Box::new(crate::mysql::MySqlConnection::connect(config)?))
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_config: &DatabaseConfig) -> Result<Box<dyn RelationalConnection>, StoreError> {
    Err(StoreError::config(
        "MySQL support was not compiled in (enable the `mysql` feature)",
    ))
}
