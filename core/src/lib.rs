//! Query construction for quarry.
//!
//! Raw parameters are validated into a [`QuerySpec`], turned into condition
//! fragments and join paths, and assembled into SQL text by a [`Planner`].
//! Nothing in this crate performs I/O: executing the SQL is left to a
//! [`Connection`](connection::Connection) and persisting query records to a
//! [`RecordStore`](records::RecordStore).

pub mod assemble;
pub mod coerce;
pub mod conditions;
pub mod connection;
pub mod datetime;
pub mod dialect;
pub mod error;
pub mod geo;
pub mod join;
pub mod limits;
pub mod model;
pub mod models;
pub mod order;
pub mod params;
pub mod planner;
pub mod records;
pub mod schema;
pub mod search;
pub mod serialize;
pub mod spec;
mod tracing;
pub mod validate;
pub mod value;

// Re-export key types and traits
pub use assemble::{CompiledQuery, OrderOverride, Overrides};
pub use compact_str::CompactString;
pub use connection::{Connection, Record, Rows};
pub use dialect::Dialect;
pub use error::{
    ConfigurationError, ExecutionError, SerializationError, StoreError, ValidationError,
};
pub use limits::Limits;
pub use model::Model;
pub use planner::Planner;
pub use records::{Inserted, MemoryRecordStore, PersistedQueryRecord, RecordStore};
pub use schema::{SchemaRegistry, StaticSchema};
pub use search::SearchPhrase;
pub use spec::QuerySpec;
pub use value::{Params, Value};
