//! # quarry
//!
//! Declarative queries over a fixed relational schema: validated parameters
//! become SQL, results are cached and paginated, and cursors step through
//! them, crossing into an outer query at either end when nested.
//!
//! ```
//! use quarry::{Model, Planner, params};
//!
//! let planner = Planner::default();
//! let spec = planner
//!     .construct(Model::Location, params! { "by" => "name", "pattern" => "Ithaca" })
//!     .unwrap();
//! let sql = planner.compile(&spec, &Default::default()).unwrap().to_sql();
//! assert!(sql.starts_with("SELECT DISTINCT locations.id FROM `locations`"));
//! assert_eq!(planner.serialize(&spec), "Location:by=yname;pattern=sIthaca");
//! ```
//!
//! ## Features
//!
//! - `rusqlite`: the SQLite driver in [`sqlite`]
//! - `tracing`: debug events for every executed statement and cache fill (default)

pub mod config;
mod cursor;
mod engine;
mod error;
mod query;

pub use config::{ConfigError, QuarryConfig, RecordSettings};
pub use cursor::{Cursor, Nesting, ParamNesting};
pub use engine::Engine;
pub use error::{QueryError, Result};
pub use query::{Pager, Query};

pub use quarry_core::{
    CompactString, CompiledQuery, Connection, Dialect, Inserted, Limits, MemoryRecordStore, Model,
    OrderOverride, Overrides, Params, PersistedQueryRecord, Planner, QuerySpec, Record,
    RecordStore, Rows, SchemaRegistry, StaticSchema, Value, params,
};

/// Error types of the individual stages
pub mod errors {
    pub use quarry_core::{
        ConfigurationError, ExecutionError, SerializationError, StoreError, ValidationError,
    };
}

/// Lower-level building blocks
pub use quarry_core as core;

/// SQLite driver and record store
#[cfg(feature = "rusqlite")]
pub mod sqlite {
    pub use quarry_sqlite::schema::{QUERY_RECORDS, create_script, create_statements};
    pub use quarry_sqlite::{SqliteConnection, SqliteRecordStore};
}
