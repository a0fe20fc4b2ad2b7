use thiserror::Error;

/// Errors returned by the relational store and its backends.
///
/// Nothing here is retried or logged by the store; every error goes
/// straight back to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query was issued before `connect()` succeeded.
    #[error("Not connected: call connect() before issuing queries")]
    NotConnected,

    /// The backend could not be reached or refused the credentials.
    #[error("Failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    MySql(#[from] sqlx::Error),

    /// A single-row lookup matched nothing.
    #[error("Entity not found: {entity} with id '{id}'")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Column '{column}' not present in result set")]
    MissingColumn { column: String },

    #[error("Column '{column}': expected {expected}, found {found}")]
    Decode {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A row could not be read; the whole result is discarded.
    #[error("Row {row}, column '{column}': {reason}")]
    RowScan {
        row: usize,
        column: String,
        reason: String,
    },

    /// An update was requested for an organization that was never saved.
    #[error("Organization has no id; insert it before updating")]
    NotPersisted,

    #[error("Insert did not report a generated id")]
    MissingInsertId,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn connect(
        target: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Connect {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
