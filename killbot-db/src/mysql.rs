//! MySQL backend (via sqlx).
//!
//! sqlx is async; the store is not. Each connection owns a current-thread
//! tokio runtime and blocks on it for every call, so it must not be used
//! from inside another tokio runtime.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tokio::runtime::Runtime;

use crate::config::DatabaseConfig;
use crate::connection::{ExecResult, RelationalConnection};
use crate::error::StoreError;
use crate::value::{ResultSet, Value};

/// Character set requested for every connection.
pub const CHARSET: &str = "utf8";

/// A MySQL connection pool plus the runtime that drives it.
pub struct MySqlConnection {
    pool: MySqlPool,
    runtime: Runtime,
}

impl MySqlConnection {
    /// Connect using host, credentials and schema from `config`.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let target = config.redacted_target();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::connect(target.clone(), e))?;

        let options = connect_options(config)?;
        let pool = runtime
            .block_on(MySqlPoolOptions::new().connect_with(options))
            .map_err(|e| StoreError::connect(target, e))?;

        Ok(Self { pool, runtime })
    }
}

/// Build sqlx connect options from the store configuration.
///
/// DATE, TIME, DATETIME and TIMESTAMP columns are decoded natively by sqlx,
/// so no time-parsing option is needed beyond the character set.
pub fn connect_options(config: &DatabaseConfig) -> Result<MySqlConnectOptions, StoreError> {
    let (host, port) = config.host_and_port()?;
    Ok(MySqlConnectOptions::new()
        .host(&host)
        .port(port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.schema)
        .charset(CHARSET))
}

impl RelationalConnection for MySqlConnection {
    fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet, StoreError> {
        let rows = self
            .runtime
            .block_on(bind_params(sqlx::query(sql), params).fetch_all(&self.pool))?;

        // sqlx only exposes column metadata on rows, so an empty result has no columns
        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut out = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let mut values = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                let value = decode_column(row, i).map_err(|e| StoreError::RowScan {
                    row: index,
                    column: column.clone(),
                    reason: e.to_string(),
                })?;
                values.push(value);
            }
            out.push(values);
        }

        Ok(ResultSet::new(columns, out))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult, StoreError> {
        let result = self
            .runtime
            .block_on(bind_params(sqlx::query(sql), params).execute(&self.pool))?;
        Ok(ExecResult {
            rows_affected: result.rows_affected(),
            last_insert_id: i64::try_from(result.last_insert_id())
                .map_err(|_| StoreError::MissingInsertId)?,
        })
    }

    fn backend_name(&self) -> &'static str {
        "mysql"
    }
}

impl Drop for MySqlConnection {
    fn drop(&mut self) {
        // Close while the runtime is still alive so connections shut down cleanly
        self.runtime.block_on(self.pool.close());
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [Value],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Bytes(v) => query.bind(v.as_slice()),
            Value::Date(v) => query.bind(*v),
            Value::Time(v) => query.bind(*v),
            Value::DateTime(v) => query.bind(*v),
        };
    }
    query
}

/// How a column is decoded, from the type name MySQL reports for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Boolean,
    SignedInt,
    UnsignedInt,
    Float,
    Double,
    Decimal,
    Date,
    Time,
    DateTime,
    Binary,
    Text,
}

impl ColumnKind {
    fn from_type_name(type_name: &str) -> Self {
        let upper = type_name.to_ascii_uppercase();
        let (base, unsigned) = match upper.strip_suffix(" UNSIGNED") {
            Some(base) => (base, true),
            None => (upper.as_str(), false),
        };

        match base {
            "BOOLEAN" => Self::Boolean,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" if !unsigned => {
                Self::SignedInt
            }
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "BIT" => Self::UnsignedInt,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "DECIMAL" => Self::Decimal,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" | "TIMESTAMP" => Self::DateTime,
            "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "GEOMETRY" => {
                Self::Binary
            }
            _ => Self::Text,
        }
    }

    /// Kinds that can hold a MySQL zero date.
    fn has_calendar_date(self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }
}

/// `0000-00-00` style values: an empty or all-zero binary payload, or zero text.
fn is_zero_date(raw: &[u8]) -> bool {
    raw.iter().all(|&b| b == 0) || raw.starts_with(b"0000-00-00")
}

/// Text columns must hold valid UTF-8; anything else fails the row.
fn decode_text(bytes: Vec<u8>) -> Result<Value, sqlx::Error> {
    String::from_utf8(bytes)
        .map(Value::Text)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Decode one cell by its MySQL column type.
///
/// Zero dates have no calendar value and decode as `Null`.
fn decode_column(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    let (is_null, kind) = {
        let raw = row.try_get_raw(index)?;
        (raw.is_null(), ColumnKind::from_type_name(raw.type_info().name()))
    };
    if is_null {
        return Ok(Value::Null);
    }
    if kind.has_calendar_date() {
        let raw: Vec<u8> = row.try_get_unchecked(index)?;
        if is_zero_date(&raw) {
            return Ok(Value::Null);
        }
    }

    let value = match kind {
        ColumnKind::Boolean => Value::Integer(row.try_get_unchecked::<bool, _>(index)? as i64),
        ColumnKind::SignedInt => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
        ColumnKind::UnsignedInt => {
            let v: u64 = row.try_get_unchecked(index)?;
            // Values past i64::MAX are kept exact as text
            i64::try_from(v)
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(v.to_string()))
        }
        ColumnKind::Float => Value::Float(row.try_get_unchecked::<f32, _>(index)? as f64),
        ColumnKind::Double => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
        ColumnKind::Decimal => Value::Text(row.try_get_unchecked::<String, _>(index)?),
        ColumnKind::Date => Value::Date(row.try_get::<NaiveDate, _>(index)?),
        ColumnKind::Time => Value::Time(row.try_get::<NaiveTime, _>(index)?),
        ColumnKind::DateTime => Value::DateTime(row.try_get::<NaiveDateTime, _>(index)?),
        ColumnKind::Binary => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        ColumnKind::Text => decode_text(row.try_get_unchecked::<Vec<u8>, _>(index)?)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_options_use_fixed_charset_and_default_port() {
        let options = connect_options(&DatabaseConfig::mysql("db", "u", "p", "eve")).unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 3306);
        assert_eq!(options.get_username(), "u");
        assert_eq!(options.get_database(), Some("eve"));
        assert_eq!(options.get_charset(), "utf8");
    }

    #[test]
    fn connect_options_accept_bracketed_ipv6() {
        let options = connect_options(&DatabaseConfig::mysql("[::1]:3311", "u", "p", "eve")).unwrap();
        assert_eq!(options.get_host(), "::1");
        assert_eq!(options.get_port(), 3311);
    }

    #[test]
    fn connect_options_reject_bad_port() {
        let config = DatabaseConfig::mysql("db:nope", "u", "p", "eve");
        assert!(matches!(connect_options(&config), Err(StoreError::Config(_))));
    }

    #[test]
    fn column_kinds_from_type_names() {
        assert_eq!(ColumnKind::from_type_name("BIGINT UNSIGNED"), ColumnKind::UnsignedInt);
        assert_eq!(ColumnKind::from_type_name("BIGINT"), ColumnKind::SignedInt);
        assert_eq!(ColumnKind::from_type_name("BOOLEAN"), ColumnKind::Boolean);
        assert_eq!(ColumnKind::from_type_name("DECIMAL"), ColumnKind::Decimal);
        assert_eq!(ColumnKind::from_type_name("timestamp"), ColumnKind::DateTime);
        assert_eq!(ColumnKind::from_type_name("BIT"), ColumnKind::UnsignedInt);
        assert_eq!(ColumnKind::from_type_name("VARBINARY"), ColumnKind::Binary);
        assert_eq!(ColumnKind::from_type_name("VARCHAR"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_type_name("ENUM"), ColumnKind::Text);
    }

    #[test]
    fn zero_dates_are_detected() {
        // Binary protocol sends zero dates as an empty payload
        assert!(is_zero_date(b""));
        assert!(is_zero_date(&[0, 0, 0, 0]));
        assert!(is_zero_date(b"0000-00-00"));
        assert!(is_zero_date(b"0000-00-00 00:00:00"));

        assert!(!is_zero_date(&[0xe8, 0x07, 5, 1]));
        assert!(!is_zero_date(b"2024-05-01 12:30:00"));
    }

    #[test]
    fn only_date_kinds_check_for_zero_dates() {
        assert!(ColumnKind::Date.has_calendar_date());
        assert!(ColumnKind::DateTime.has_calendar_date());
        assert!(!ColumnKind::Time.has_calendar_date());
        assert!(!ColumnKind::Text.has_calendar_date());
    }

    #[test]
    fn invalid_utf8_text_is_an_error() {
        assert_eq!(decode_text(b"o7".to_vec()).unwrap(), Value::Text("o7".to_string()));
        assert!(matches!(decode_text(b"f\xffo".to_vec()), Err(sqlx::Error::Decode(_))));
    }
}
