//! The database seam.
//!
//! The planner only produces SQL text. Anything that runs it implements
//! [`Connection`]; the `quarry-sqlite` crate provides one over rusqlite.

use std::collections::BTreeMap;

use compact_str::CompactString;

use crate::dialect::Dialect;
use crate::error::ExecutionError;
use crate::value::Value;

/// Rows returned by [`Connection::select_rows`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    pub columns: Vec<CompactString>,
    pub rows: Vec<Vec<Value>>,
}

impl Rows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts rows into records keyed by the `id` column. Rows without a
    /// usable id are skipped.
    pub fn into_records(self) -> Vec<Record> {
        let Some(id_index) = self.columns.iter().position(|c| c == "id") else {
            return Vec::new();
        };
        let columns = self.columns;
        self.rows
            .into_iter()
            .filter_map(|row| {
                let id = row.get(id_index).and_then(Value::as_id)?;
                let fields = columns.iter().cloned().zip(row).collect();
                Some(Record { id, fields })
            })
            .collect()
    }
}

/// One hydrated row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub fields: BTreeMap<CompactString, Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

/// Executes SQL text produced by the planner.
pub trait Connection {
    fn dialect(&self) -> Dialect;

    /// First column of every row.
    fn select_values(&self, sql: &str) -> Result<Vec<Value>, ExecutionError>;

    fn select_rows(&self, sql: &str) -> Result<Rows, ExecutionError>;

    /// First column of the first row.
    fn select_value(&self, sql: &str) -> Result<Option<Value>, ExecutionError> {
        Ok(self.select_values(sql)?.into_iter().next())
    }

    /// Literal for `value` in this connection's dialect.
    fn quote(&self, value: &Value) -> String {
        self.dialect().quote_value(value)
    }
}

impl<C: Connection + ?Sized> Connection for &C {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn select_values(&self, sql: &str) -> Result<Vec<Value>, ExecutionError> {
        (**self).select_values(sql)
    }

    fn select_rows(&self, sql: &str) -> Result<Rows, ExecutionError> {
        (**self).select_rows(sql)
    }
}
