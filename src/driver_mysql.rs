use async_trait::async_trait;
use log::{debug, error};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row, Statement, TypeInfo};

use crate::data_access::{DataAccessError, SqlClient, SqlSession};
use crate::models::structs::{ConnectTarget, ResultSet};

// Index-based fallback used when the type-specific decode fails.
fn get_value_as_string_fallback_idx(row: &MySqlRow, idx: usize, type_name: &str) -> String {
    if let Ok(Some(val)) = row.try_get::<Option<String>, _>(idx) {
        return val;
    }
    if let Ok(Some(val)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return bytes_to_string_or_marker(val);
    }
    if let Ok(Some(val)) = row.try_get::<Option<i64>, _>(idx) { return val.to_string(); }
    if let Ok(Some(val)) = row.try_get::<Option<u64>, _>(idx) { return val.to_string(); }
    if let Ok(Some(val)) = row.try_get::<Option<f64>, _>(idx) { return val.to_string(); }
    if let Ok(Some(val)) = row.try_get::<Option<rust_decimal::Decimal>, _>(idx) { return val.to_string(); }
    if let Ok(Some(val)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) { return val.to_string(); }
    if let Ok(Some(val)) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) { return val.to_string(); }
    if let Ok(Some(val)) = row.try_get::<Option<chrono::NaiveTime>, _>(idx) { return val.to_string(); }
    match row.try_get_raw(idx).map(|raw| sqlx::ValueRef::is_null(&raw)) {
        Ok(true) => "NULL".to_string(),
        _ => format!("[CONVERSION_ERROR:{}]", type_name),
    }
}

// Bytes count as text only when they decode as UTF-8 and are mostly non-control
pub(crate) fn as_text(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?;
    let total = text.chars().count();
    if total == 0 {
        return Some(text);
    }
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .count();
    ((printable as f32) / (total as f32) > 0.85).then_some(text)
}

pub(crate) fn bytes_to_string_or_marker(bytes: Vec<u8>) -> String {
    // BINARY/VARBINARY columns come back padded with NULs
    let mut b = bytes;
    while matches!(b.last(), Some(0)) { b.pop(); }
    if b.is_empty() { return String::new(); }

    if let Some(text) = as_text(&b) {
        return text.to_string();
    }
    use std::fmt::Write as _;
    let mut s = String::with_capacity(2 + b.len() * 2);
    s.push_str("0x");
    for byte in &b {
        let _ = write!(&mut s, "{:02X}", byte);
    }
    s
}

pub(crate) fn bits_to_string(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 8 + 2);
    s.push_str("0b");
    for b in bytes { let _ = write!(&mut s, "{:08b}", b); }
    s
}

fn typed<T>(row: &MySqlRow, idx: usize, type_name: &str) -> String
where
    T: ToString + for<'r> sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    match row.try_get::<Option<T>, _>(idx) {
        Ok(Some(val)) => val.to_string(),
        Ok(None) => "NULL".to_string(),
        Err(_) => get_value_as_string_fallback_idx(row, idx, type_name),
    }
}

/// Renders one cell, choosing the decode by the column's declared type.
fn cell_to_string(row: &MySqlRow, idx: usize, type_name: &str) -> String {
    let t = type_name.to_ascii_uppercase();
    match t.as_str() {
        "TINYINT" => typed::<i8>(row, idx, &t),
        "SMALLINT" | "YEAR" => typed::<i16>(row, idx, &t),
        "MEDIUMINT" | "INT" | "INTEGER" => typed::<i32>(row, idx, &t),
        "BIGINT" => typed::<i64>(row, idx, &t),
        "TINYINT UNSIGNED" => typed::<u8>(row, idx, &t),
        "SMALLINT UNSIGNED" => typed::<u16>(row, idx, &t),
        "MEDIUMINT UNSIGNED" | "INT UNSIGNED" | "INTEGER UNSIGNED" => typed::<u32>(row, idx, &t),
        "BIGINT UNSIGNED" => typed::<u64>(row, idx, &t),
        "FLOAT" => typed::<f32>(row, idx, &t),
        "DOUBLE" | "REAL" => typed::<f64>(row, idx, &t),
        "DECIMAL" | "NUMERIC" | "NEWDECIMAL" => typed::<rust_decimal::Decimal>(row, idx, &t),
        "DATE" => typed::<chrono::NaiveDate>(row, idx, &t),
        "TIME" => typed::<chrono::NaiveTime>(row, idx, &t),
        "DATETIME" | "TIMESTAMP" => typed::<chrono::NaiveDateTime>(row, idx, &t),
        "BOOLEAN" | "BOOL" => typed::<bool>(row, idx, &t),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            match row.try_get::<Option<Vec<u8>>, _>(idx) {
                Ok(Some(val)) => bytes_to_string_or_marker(val),
                Ok(None) => "NULL".to_string(),
                Err(_) => get_value_as_string_fallback_idx(row, idx, &t),
            }
        }
        "BIT" => match row.try_get::<Option<Vec<u8>>, _>(idx) {
            Ok(Some(bytes)) => bits_to_string(&bytes),
            Ok(None) => "NULL".to_string(),
            Err(_) => match row.try_get::<Option<u64>, _>(idx) {
                Ok(Some(val)) => format!("0b{:b}", val),
                Ok(None) => "NULL".to_string(),
                Err(_) => get_value_as_string_fallback_idx(row, idx, &t),
            },
        },
        // VARCHAR, TEXT, ENUM, SET, JSON and anything unknown
        _ => match row.try_get::<Option<String>, _>(idx) {
            Ok(Some(val)) => val,
            Ok(None) => "NULL".to_string(),
            Err(_) => match row.try_get::<Option<Vec<u8>>, _>(idx) {
                Ok(Some(bytes)) => bytes_to_string_or_marker(bytes),
                Ok(None) => "NULL".to_string(),
                Err(_) => get_value_as_string_fallback_idx(row, idx, &t),
            },
        },
    }
}

pub(crate) fn convert_mysql_rows_to_table_data(rows: &[MySqlRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            row.columns()
                .iter()
                .enumerate()
                .map(|(idx, column)| cell_to_string(row, idx, column.type_info().name()))
                .collect()
        })
        .collect()
}

fn query_error(e: sqlx::Error) -> DataAccessError {
    match e {
        sqlx::Error::Database(db) => DataAccessError::Query(db.message().to_string()),
        other => DataAccessError::Query(other.to_string()),
    }
}

/// Production client: one plain `MySqlConnection` per session, no pool.
pub struct MySqlClient {
    connect_timeout: std::time::Duration,
}

impl MySqlClient {
    pub fn new(connect_timeout: std::time::Duration) -> Self {
        Self { connect_timeout }
    }

    fn build_connect_options(target: &ConnectTarget) -> MySqlConnectOptions {
        let mut opts = MySqlConnectOptions::new()
            .host(&target.host)
            .port(target.port)
            .username(&target.username)
            .password(&target.password);

        if let Some(db) = target.database.as_deref() {
            let db = db.trim();
            if !db.is_empty() {
                opts = opts.database(db);
            }
        }

        opts
    }
}

#[async_trait]
impl SqlClient for MySqlClient {
    async fn open(&self, target: &ConnectTarget) -> Result<Box<dyn SqlSession>, DataAccessError> {
        debug!("Opening MySQL session: {:?}", target);
        let opts = Self::build_connect_options(target);

        let mut conn = match tokio::time::timeout(self.connect_timeout, opts.connect()).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(DataAccessError::Connect(e.to_string())),
            Err(_) => {
                return Err(DataAccessError::Connect(format!(
                    "timed out after {}s connecting to {}:{}",
                    self.connect_timeout.as_secs(),
                    target.host,
                    target.port
                )));
            }
        };

        // Writes only land after an explicit COMMIT.
        conn.execute("SET autocommit = 0")
            .await
            .map_err(|e| DataAccessError::Connect(e.to_string()))?;

        Ok(Box::new(MySqlSession { conn: Some(conn) }))
    }
}

pub struct MySqlSession {
    conn: Option<MySqlConnection>,
}

impl MySqlSession {
    fn conn(&mut self) -> Result<&mut MySqlConnection, DataAccessError> {
        self.conn.as_mut().ok_or(DataAccessError::Closed)
    }
}

#[async_trait]
impl SqlSession for MySqlSession {
    async fn fetch(&mut self, sql: &str) -> Result<ResultSet, DataAccessError> {
        let conn = self.conn()?;
        let rows = (&mut *conn).fetch_all(sql).await.map_err(query_error)?;

        let columns: Vec<String> = match rows.first() {
            Some(first) => first.columns().iter().map(|c| c.name().to_string()).collect(),
            // No rows to read headers from; ask the server to describe it.
            None => match (&mut *conn).prepare(sql).await {
                Ok(stmt) => stmt.columns().iter().map(|c| c.name().to_string()).collect(),
                Err(e) => {
                    debug!("Could not describe empty result: {}", e);
                    Vec::new()
                }
            },
        };

        let rows = convert_mysql_rows_to_table_data(&rows);
        debug!("Fetched {} rows, {} columns", rows.len(), columns.len());
        Ok(ResultSet { columns, rows })
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, DataAccessError> {
        let conn = self.conn()?;
        let done = (&mut *conn).execute(sql).await.map_err(query_error)?;
        Ok(done.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), DataAccessError> {
        let conn = self.conn()?;
        conn.execute("COMMIT").await.map_err(query_error)?;
        Ok(())
    }

    async fn is_live(&mut self) -> bool {
        match self.conn.as_mut() {
            Some(conn) => conn.ping().await.is_ok(),
            None => false,
        }
    }

    async fn close(&mut self) -> Result<(), DataAccessError> {
        let conn = self.conn.take().ok_or(DataAccessError::Closed)?;
        conn.close().await.map_err(|e| {
            error!("Error closing MySQL connection: {}", e);
            DataAccessError::Query(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_binary_is_trimmed_and_decoded() {
        assert_eq!(bytes_to_string_or_marker(b"abc\0\0".to_vec()), "abc");
        assert_eq!(bytes_to_string_or_marker(vec![0, 0]), "");
    }

    #[test]
    fn opaque_bytes_render_as_hex() {
        assert_eq!(bytes_to_string_or_marker(vec![0x01, 0x02, 0xFF]), "0x0102FF");
    }

    #[test]
    fn utf8_text_counts_as_textual() {
        assert_eq!(as_text("Operación".as_bytes()), Some("Operación"));
        assert_eq!(as_text(&[0x00, 0x01, 0x02, 0x03]), None);
        assert_eq!(
            bytes_to_string_or_marker("Operación".as_bytes().to_vec()),
            "Operación"
        );
    }

    #[test]
    fn binary_uuid_renders_as_hex_not_replacement_chars() {
        let uuid = vec![
            0x9f, 0x86, 0xd0, 0x81, 0x88, 0x4c, 0x7d, 0x65, 0x9a, 0x2f, 0xea, 0xa0, 0xc5, 0x5a,
            0xd0, 0x15,
        ];
        let rendered = bytes_to_string_or_marker(uuid);
        assert_eq!(rendered, "0x9F86D081884C7D659A2FEAA0C55AD015");
        assert!(!rendered.contains('\u{FFFD}'));
    }

    #[test]
    fn bit_values_render_as_binary_literal() {
        assert_eq!(bits_to_string(&[0b0000_0101]), "0b00000101");
    }

    #[test]
    fn connect_options_skip_blank_database() {
        let target = ConnectTarget {
            host: "localhost".into(),
            port: 3306,
            username: "root".into(),
            password: "secret".into(),
            database: Some("  ".into()),
        };
        let opts = MySqlClient::build_connect_options(&target);
        assert_eq!(opts.get_database(), None);
        assert_eq!(opts.get_host(), "localhost");
    }
}
