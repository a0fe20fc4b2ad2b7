//! The relational connection capability the store is built on.

use crate::error::StoreError;
use crate::value::{ResultSet, Value};

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Identifier generated by the statement, as reported by the driver.
    /// Only meaningful after an INSERT into a table with a generated key.
    pub last_insert_id: i64,
}

/// A live connection to a relational backend.
///
/// Parameters are bound positionally to `?` placeholders. Text cells that
/// are not valid UTF-8 fail the query with `RowScan`. Implementations make
/// no promises about concurrent use beyond what their driver gives; the
/// store never locks around calls.
pub trait RelationalConnection: Send {
    /// Run a statement that returns rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet, StoreError>;

    /// Run a statement that does not return rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult, StoreError>;

    /// Short backend label for logs and diagnostics.
    fn backend_name(&self) -> &'static str;
}
