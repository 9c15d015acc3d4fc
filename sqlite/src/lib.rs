//! SQLite backing for quarry.
//!
//! With the `rusqlite` feature this crate provides [`SqliteConnection`], a
//! [`Connection`](quarry_core::Connection) that runs planner SQL, and
//! [`SqliteRecordStore`], a durable
//! [`RecordStore`](quarry_core::RecordStore) for persisted query records.
//! The reference DDL in [`schema`] is always available.

pub mod schema;

#[cfg(feature = "rusqlite")]
mod connection;
#[cfg(feature = "rusqlite")]
mod records;
#[cfg(feature = "rusqlite")]
pub mod value;

#[cfg(feature = "rusqlite")]
pub use connection::SqliteConnection;
#[cfg(feature = "rusqlite")]
pub use records::SqliteRecordStore;
