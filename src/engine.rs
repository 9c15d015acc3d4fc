//! The [`Engine`]: validated construction, compilation and execution of
//! queries against one connection, plus the persisted records that let a
//! query be referred to by id.

use std::cell::Cell;

use chrono::{DateTime, Utc};
use quarry_core::{
    CompiledQuery, Connection, Inserted, Model, Overrides, Params, PersistedQueryRecord, Planner,
    QuerySpec, RecordStore, StoreError, quarry_trace_record,
};

use crate::config::{QuarryConfig, RecordSettings};
use crate::cursor::{Cursor, Nesting};
use crate::error::Result;
use crate::query::Query;

/// Entry point tying a [`Planner`] to a connection and a record store.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "rusqlite")]
/// # fn main() -> quarry::Result<()> {
/// use quarry::{Engine, Model, params};
/// use quarry::sqlite::SqliteConnection;
///
/// let conn = SqliteConnection::open_in_memory()?;
/// conn.create_schema()?;
/// let engine = Engine::new(&conn, conn.records());
///
/// let spec = engine.construct(Model::Name, params! { "misspellings" => "either" })?;
/// let record = engine.find_or_create_record(&spec)?;
/// assert_eq!(engine.find_or_create_record(&spec)?.id, record.id);
/// assert_eq!(engine.query(spec).num_results()?, 0);
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "rusqlite"))]
/// # fn main() {}
/// ```
pub struct Engine<C: Connection, S: RecordStore> {
    planner: Planner,
    conn: C,
    store: S,
    records: RecordSettings,
    last_sweep: Cell<DateTime<Utc>>,
}

impl<C: Connection, S: RecordStore> std::fmt::Debug for Engine<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("planner", &self.planner)
            .field("records", &self.records)
            .field("last_sweep", &self.last_sweep.get())
            .finish()
    }
}

impl<C: Connection, S: RecordStore> Engine<C, S> {
    /// An engine with default limits, in the connection's dialect.
    pub fn new(conn: C, store: S) -> Self {
        let planner = Planner::new(conn.dialect(), Default::default());
        Self::with_planner(planner, conn, store)
    }

    pub fn with_planner(planner: Planner, conn: C, store: S) -> Self {
        Self {
            planner,
            conn,
            store,
            records: RecordSettings::default(),
            last_sweep: Cell::new(Utc::now()),
        }
    }

    pub fn from_config(config: &QuarryConfig, conn: C, store: S) -> Self {
        Self::with_planner(config.planner(), conn, store).with_record_settings(config.records)
    }

    pub fn with_record_settings(mut self, records: RecordSettings) -> Self {
        self.records = records;
        self
    }

    pub const fn planner(&self) -> &Planner {
        &self.planner
    }

    pub const fn connection(&self) -> &C {
        &self.conn
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn record_settings(&self) -> &RecordSettings {
        &self.records
    }

    /// Validates `raw` into a query on `model`.
    pub fn construct(&self, model: Model, raw: Params) -> Result<QuerySpec> {
        Ok(self.planner.construct(model, raw)?)
    }

    pub fn compile(&self, spec: &QuerySpec) -> Result<CompiledQuery> {
        Ok(self.planner.compile(spec, &Overrides::new())?)
    }

    /// A result cache over `spec`. Nothing runs until results are asked for.
    pub fn query(&self, spec: QuerySpec) -> Query<'_, C> {
        Query::new(&self.planner, &self.conn, spec)
    }

    /// Validates and wraps in one go.
    pub fn lookup(&self, model: Model, raw: Params) -> Result<Query<'_, C>> {
        Ok(self.query(self.construct(model, raw)?))
    }

    pub fn cursor(&self, spec: QuerySpec) -> Cursor<'_, C> {
        Cursor::new(self.query(spec))
    }

    /// Turns `spec` into an equivalent query on `target`, if the two models
    /// are related.
    pub fn coerce(&self, spec: &QuerySpec, target: Model) -> Result<Option<QuerySpec>> {
        Ok(self.planner.coerce(spec, target)?)
    }

    /// The persisted record for `spec`, created if needed.
    ///
    /// Losing an insert race to another writer is not an error: the row the
    /// other writer created is returned.
    pub fn find_or_create_record(&self, spec: &QuerySpec) -> Result<PersistedQueryRecord> {
        self.maybe_sweep()?;
        let description = self.planner.serialize(spec);
        if let Some(record) = self.store.find_by_description(&description)? {
            return Ok(record);
        }
        match self.store.insert(&description, Utc::now())? {
            Inserted::Created(record) => {
                quarry_trace_record!("created", description);
                Ok(record)
            }
            Inserted::Duplicate => {
                quarry_trace_record!("duplicate", description);
                match self.store.find_by_description(&description)? {
                    Some(record) => Ok(record),
                    None => Err(StoreError::Vanished(description).into()),
                }
            }
        }
    }

    /// Bumps the access count of `record` and stamps it with the current
    /// time. Concurrent bumps may overwrite each other.
    pub fn record_access(&self, record: &PersistedQueryRecord) -> Result<PersistedQueryRecord> {
        let now = Utc::now();
        let access_count = record.access_count + 1;
        self.store.touch(record.id, access_count, now)?;
        Ok(PersistedQueryRecord {
            access_count,
            updated_at: now,
            ..record.clone()
        })
    }

    /// The query stored under record `id`, if the record still exists.
    pub fn load_record(&self, id: i64) -> Result<Option<QuerySpec>> {
        let Some(record) = self.store.find(id)? else {
            return Ok(None);
        };
        Ok(Some(self.planner.deserialize(&record.description)?))
    }

    /// Deletes stale records. Returns how many were removed.
    pub fn sweep(&self) -> Result<usize> {
        self.sweep_at(Utc::now())
    }

    /// [`sweep`](Self::sweep) with an explicit notion of now.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let removed = self.store.delete_stale(
            self.records.unused_cutoff(now),
            self.records.used_cutoff(now),
        )?;
        self.last_sweep.set(now);
        quarry_trace_record!("sweep", removed);
        Ok(removed)
    }

    fn maybe_sweep(&self) -> Result<()> {
        let now = Utc::now();
        if now - self.last_sweep.get() >= self.records.sweep_interval() {
            self.sweep_at(now)?;
        }
        Ok(())
    }

    /// Cursor over the outer query `inner` is nested in, positioned on the
    /// outer id `inner` is scoped to.
    ///
    /// The outer query is found through the persisted record id in the
    /// inner query's `outer` parameter. Returns `None` when there is no
    /// such parameter or the record is gone.
    pub fn outer_cursor(
        &self,
        inner: &QuerySpec,
        nesting: &dyn Nesting,
    ) -> Result<Option<Cursor<'_, C>>> {
        let Some(record_id) = inner.int("outer") else {
            return Ok(None);
        };
        let Some(outer) = self.load_record(record_id)? else {
            return Ok(None);
        };
        let model = outer.model();
        let outer = self.construct(model, nesting.outer_params(outer.into_params()))?;

        let mut cursor = self.cursor(outer);
        if let Some(id) = nesting.outer_id(inner) {
            cursor.set_current(id);
        }
        Ok(Some(cursor))
    }

    /// Cursor over `inner`, nested in its outer query when it has one.
    pub fn nested_cursor<'e>(
        &'e self,
        inner: QuerySpec,
        nesting: impl Nesting + 'e,
    ) -> Result<Cursor<'e, C>> {
        let outer = self.outer_cursor(&inner, &nesting)?;
        let cursor = self.cursor(inner);
        Ok(match outer {
            Some(outer) => cursor.with_outer(outer, nesting),
            None => cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{Dialect, ExecutionError, MemoryRecordStore, Rows, Value, params};

    struct NoRows;

    impl Connection for NoRows {
        fn dialect(&self) -> Dialect {
            Dialect::MySQL
        }

        fn select_values(&self, _: &str) -> std::result::Result<Vec<Value>, ExecutionError> {
            Ok(Vec::new())
        }

        fn select_rows(&self, _: &str) -> std::result::Result<Rows, ExecutionError> {
            Ok(Rows::default())
        }
    }

    /// Reports every insert as lost to another writer.
    struct RacingStore {
        inner: MemoryRecordStore,
    }

    impl RecordStore for RacingStore {
        fn find_by_description(
            &self,
            description: &str,
        ) -> std::result::Result<Option<PersistedQueryRecord>, StoreError> {
            self.inner.find_by_description(description)
        }

        fn find(&self, id: i64) -> std::result::Result<Option<PersistedQueryRecord>, StoreError> {
            self.inner.find(id)
        }

        fn insert(
            &self,
            description: &str,
            now: DateTime<Utc>,
        ) -> std::result::Result<Inserted, StoreError> {
            self.inner.insert(description, now)?;
            Ok(Inserted::Duplicate)
        }

        fn touch(
            &self,
            id: i64,
            access_count: i64,
            now: DateTime<Utc>,
        ) -> std::result::Result<(), StoreError> {
            self.inner.touch(id, access_count, now)
        }

        fn delete_stale(
            &self,
            unused_before: DateTime<Utc>,
            used_before: DateTime<Utc>,
        ) -> std::result::Result<usize, StoreError> {
            self.inner.delete_stale(unused_before, used_before)
        }
    }

    #[test]
    fn test_planner_follows_connection_dialect() {
        let engine = Engine::new(NoRows, MemoryRecordStore::new());
        assert_eq!(engine.planner().dialect(), Dialect::MySQL);
    }

    #[test]
    fn test_find_or_create_reuses_records() {
        let engine = Engine::new(NoRows, MemoryRecordStore::new());
        let spec = engine.construct(Model::Name, params! { "by" => "id" }).unwrap();

        let first = engine.find_or_create_record(&spec).unwrap();
        let second = engine.find_or_create_record(&spec).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.store().len(), 1);
        assert_eq!(first.description, "Name:by=yid");
    }

    #[test]
    fn test_lost_insert_race_reads_existing_row() {
        let store = RacingStore {
            inner: MemoryRecordStore::new(),
        };
        let engine = Engine::new(NoRows, store);
        let spec = engine.construct(Model::Location, params! {}).unwrap();

        let record = engine.find_or_create_record(&spec).unwrap();
        assert_eq!(record.description, "Location:");
    }

    #[test]
    fn test_record_access_bumps_count() {
        let engine = Engine::new(NoRows, MemoryRecordStore::new());
        let spec = engine.construct(Model::Name, params! {}).unwrap();
        let record = engine.find_or_create_record(&spec).unwrap();

        let touched = engine.record_access(&record).unwrap();
        assert_eq!(touched.access_count, 1);
        assert!(touched.updated_at >= record.updated_at);
        let stored = engine.store().find(record.id).unwrap().unwrap();
        assert_eq!(stored.access_count, 1);
    }

    #[test]
    fn test_load_record() {
        let engine = Engine::new(NoRows, MemoryRecordStore::new());
        let spec = engine
            .construct(Model::Name, params! { "has_synonyms" => true })
            .unwrap();
        let record = engine.find_or_create_record(&spec).unwrap();

        assert_eq!(engine.load_record(record.id).unwrap(), Some(spec));
        assert_eq!(engine.load_record(record.id + 1).unwrap(), None);
    }

    #[test]
    fn test_sweep_uses_settings() {
        let engine = Engine::new(NoRows, MemoryRecordStore::new());
        let now = Utc::now();
        engine.store().insert("Name:", now).unwrap();
        engine.store().insert("Image:", now).unwrap();

        assert_eq!(engine.sweep_at(now).unwrap(), 0);
        let later = now + chrono::TimeDelta::hours(2);
        assert_eq!(engine.sweep_at(later).unwrap(), 2);
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_opportunistic_sweep_is_throttled() {
        let engine = Engine::new(NoRows, MemoryRecordStore::new()).with_record_settings(
            RecordSettings {
                unused_ttl_secs: 0,
                used_ttl_secs: 0,
                sweep_interval_secs: 3600,
            },
        );
        let stale = Utc::now() - chrono::TimeDelta::minutes(5);
        engine.store().insert("Image:", stale).unwrap();

        let spec = engine.construct(Model::Name, params! {}).unwrap();
        engine.find_or_create_record(&spec).unwrap();
        assert_eq!(engine.store().len(), 2);
    }

    #[test]
    fn test_outer_cursor_needs_a_record() {
        let engine = Engine::new(NoRows, MemoryRecordStore::new());
        let nesting = crate::ParamNesting::new("observation");

        let plain = engine
            .construct(Model::Image, params! { "observation" => 3 })
            .unwrap();
        assert!(engine.outer_cursor(&plain, &nesting).unwrap().is_none());

        let dangling = engine
            .construct(Model::Image, params! { "observation" => 3, "outer" => 41 })
            .unwrap();
        assert!(engine.outer_cursor(&dangling, &nesting).unwrap().is_none());

        let outer = engine.construct(Model::Observation, params! {}).unwrap();
        let record = engine.find_or_create_record(&outer).unwrap();
        let inner = engine
            .construct(
                Model::Image,
                params! { "observation" => 3, "outer" => record.id },
            )
            .unwrap();
        let cursor = engine.outer_cursor(&inner, &nesting).unwrap().unwrap();
        assert_eq!(cursor.current_id(), Some(3));
        assert_eq!(cursor.query().model(), Model::Observation);
    }
}
