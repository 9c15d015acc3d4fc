//! Conversions between rusqlite cells and quarry values.

use compact_str::CompactString;
use quarry_core::Value;
use rusqlite::types::ValueRef;

/// Converts one result cell. Blobs are read as (lossy) text.
pub fn from_cell(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(r) => Value::Float(r),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(CompactString::from(String::from_utf8_lossy(bytes)))
        }
    }
}
