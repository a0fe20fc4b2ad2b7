//! SQLite backend (via rusqlite with the bundled feature).

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, params_from_iter};

use crate::connection::{ExecResult, RelationalConnection};
use crate::error::StoreError;
use crate::value::{ResultSet, Value};

/// A single SQLite connection.
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::connect(format!("sqlite://{}", path.display()), e))?;
        Self::configure(conn)
    }

    /// Open a private in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::connect("sqlite://:memory:", e))?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self, StoreError> {
        // Encoding only takes effect on a fresh database file
        conn.execute_batch("PRAGMA encoding = 'UTF-8'; PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Run several semicolon-separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl RelationalConnection for SqliteConnection {
    fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let kinds: Vec<Option<Temporal>> = stmt
            .columns()
            .iter()
            .map(|c| c.decl_type().and_then(Temporal::from_decl_type))
            .collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                let raw = row.get_ref(i)?;
                let value = convert(raw, kinds[i]).map_err(|reason| StoreError::RowScan {
                    row: out.len(),
                    column: column.clone(),
                    reason,
                })?;
                values.push(value);
            }
            out.push(values);
        }

        Ok(ResultSet::new(columns, out))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult, StoreError> {
        let changed = self.conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(ExecResult {
            rows_affected: changed as u64,
            last_insert_id: self.conn.last_insert_rowid(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

/// Temporal column affinity taken from the declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Temporal {
    Date,
    Time,
    DateTime,
}

impl Temporal {
    fn from_decl_type(decl: &str) -> Option<Self> {
        let decl = decl.to_ascii_uppercase();
        if decl.contains("DATETIME") || decl.contains("TIMESTAMP") {
            Some(Self::DateTime)
        } else if decl.contains("DATE") {
            Some(Self::Date)
        } else if decl.contains("TIME") {
            Some(Self::Time)
        } else {
            None
        }
    }

    /// Parse stored text; `None` when the text is not a recognised format.
    fn parse(self, text: &str) -> Option<Value> {
        match self {
            Self::DateTime => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(Value::DateTime),
            Self::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            Self::Time => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
                .ok()
                .map(Value::Time),
        }
    }
}

fn convert(raw: ValueRef<'_>, kind: Option<Temporal>) -> Result<Value, String> {
    Ok(match raw {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| format!("text is not valid UTF-8: {}", e))?;
            // Unparseable temporal text is kept as-is rather than guessed at
            kind.and_then(|k| k.parse(text))
                .unwrap_or_else(|| Value::Text(text.to_string()))
        }
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    })
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(v) => ToSqlOutput::from(*v),
            Value::Float(v) => ToSqlOutput::from(*v),
            Value::Text(v) => ToSqlOutput::from(v.as_str()),
            Value::Bytes(v) => ToSqlOutput::from(v.as_slice()),
            Value::Date(v) => ToSqlOutput::from(v.format("%Y-%m-%d").to_string()),
            Value::Time(v) => ToSqlOutput::from(v.format("%H:%M:%S%.f").to_string()),
            Value::DateTime(v) => ToSqlOutput::from(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        })
    }
}
