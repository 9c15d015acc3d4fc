//! [`Connection`] over a rusqlite connection.

use std::path::Path;

use compact_str::CompactString;
use quarry_core::connection::{Connection, Rows};
use quarry_core::search::{FOLD_FUNCTION, fold};
use quarry_core::{Dialect, ExecutionError, Value};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;

use crate::records::SqliteRecordStore;
use crate::schema;
use crate::value::from_cell;

/// Runs planner SQL on SQLite.
///
/// ```
/// use quarry_core::Connection;
/// use quarry_sqlite::SqliteConnection;
///
/// let conn = SqliteConnection::open_in_memory().unwrap();
/// conn.create_schema().unwrap();
/// let count = conn.select_value("SELECT COUNT(*) FROM `names`").unwrap();
/// assert_eq!(count, Some(quarry_core::Value::Int(0)));
/// ```
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Wraps `conn`, registering the functions planner SQL calls.
    pub fn new(conn: rusqlite::Connection) -> Result<Self, ExecutionError> {
        register_fold(&conn)?;
        Ok(Self { conn })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExecutionError> {
        Self::new(rusqlite::Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ExecutionError> {
        Self::new(rusqlite::Connection::open_in_memory()?)
    }

    /// Creates the model, link and query record tables if missing.
    pub fn create_schema(&self) -> Result<(), ExecutionError> {
        self.conn.execute_batch(&schema::create_script())?;
        Ok(())
    }

    /// Runs statements that return no rows.
    pub fn execute_batch(&self, sql: &str) -> Result<(), ExecutionError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Record store sharing this connection.
    pub fn records(&self) -> SqliteRecordStore<'_> {
        SqliteRecordStore::new(&self.conn)
    }

    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

/// `quarry_fold(text)`: case- and accent-folded text, NULL for NULL.
fn register_fold(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            Ok(match ctx.get_raw(0) {
                ValueRef::Null => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                    Some(fold(&String::from_utf8_lossy(bytes)))
                }
            })
        },
    )
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn select_values(&self, sql: &str) -> Result<Vec<Value>, ExecutionError> {
        let mut stmt = self.conn.prepare(sql)?;
        let values = stmt
            .query_map([], |row| Ok(from_cell(row.get_ref(0)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn select_rows(&self, sql: &str) -> Result<Rows, ExecutionError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(CompactString::from)
            .collect::<Vec<_>>();
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(from_cell))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Rows { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteConnection {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.create_schema().unwrap();
        conn.execute_batch(
            "INSERT INTO `names` (id, text_name, sort_name) VALUES (1, 'Amanita', 'Amanita');
             INSERT INTO `names` (id, text_name, sort_name) VALUES (2, 'Boletus', 'Boletus');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_select_values() {
        let conn = seeded();
        let ids = conn
            .select_values("SELECT id FROM `names` ORDER BY id DESC")
            .unwrap();
        assert_eq!(ids, vec![Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn test_select_rows_keeps_column_names() {
        let conn = seeded();
        let rows = conn
            .select_rows("SELECT names.* FROM `names` WHERE names.id = 1")
            .unwrap();
        assert_eq!(rows.len(), 1);
        let records = rows.into_records();
        assert_eq!(records[0].get("text_name"), Some(&Value::from("Amanita")));
    }

    #[test]
    fn test_fold_function() {
        let conn = seeded();
        let folded = conn
            .select_value("SELECT quarry_fold('ÄPFEL Été'), quarry_fold(NULL)")
            .unwrap();
        assert_eq!(folded, Some(Value::from("apfel ete")));

        let nulls = conn.select_values("SELECT quarry_fold(NULL)").unwrap();
        assert_eq!(nulls, vec![Value::Null]);
    }

    #[test]
    fn test_bad_sql_is_an_execution_error() {
        let conn = seeded();
        assert!(conn.select_values("SELECT nope FROM nowhere").is_err());
    }
}
