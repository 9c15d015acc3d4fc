//! Persisted query records.
//!
//! A record maps a serialized query description to a stable id so a query
//! can be referred to later (for instance by an inner query's `outer`
//! parameter). The description column is unique; the store is the only
//! state shared between concurrent callers.

use std::cell::RefCell;

use chrono::{DateTime, Utc};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedQueryRecord {
    pub id: i64,
    /// Canonical serialization of the query
    pub description: String,
    /// Times the record was re-used after creation
    pub access_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of [`RecordStore::insert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inserted {
    Created(PersistedQueryRecord),
    /// Another writer got there first
    Duplicate,
}

/// Durable store of [`PersistedQueryRecord`]s keyed by description.
pub trait RecordStore {
    fn find_by_description(
        &self,
        description: &str,
    ) -> Result<Option<PersistedQueryRecord>, StoreError>;

    fn find(&self, id: i64) -> Result<Option<PersistedQueryRecord>, StoreError>;

    /// Inserts a fresh record, reporting a unique-key collision as
    /// [`Inserted::Duplicate`] rather than an error.
    fn insert(&self, description: &str, now: DateTime<Utc>) -> Result<Inserted, StoreError>;

    /// Overwrites the access metadata; the last writer wins.
    fn touch(&self, id: i64, access_count: i64, now: DateTime<Utc>) -> Result<(), StoreError>;

    /// Deletes never-reused records last updated before `unused_before` and
    /// reused ones last updated before `used_before`. Returns the number removed.
    fn delete_stale(
        &self,
        unused_before: DateTime<Utc>,
        used_before: DateTime<Utc>,
    ) -> Result<usize, StoreError>;
}

/// Process-local store, for tests and one-shot tools.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RefCell<Vec<PersistedQueryRecord>>,
    next_id: RefCell<i64>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn find_by_description(
        &self,
        description: &str,
    ) -> Result<Option<PersistedQueryRecord>, StoreError> {
        Ok(self
            .records
            .borrow()
            .iter()
            .find(|r| r.description == description)
            .cloned())
    }

    fn find(&self, id: i64) -> Result<Option<PersistedQueryRecord>, StoreError> {
        Ok(self.records.borrow().iter().find(|r| r.id == id).cloned())
    }

    fn insert(&self, description: &str, now: DateTime<Utc>) -> Result<Inserted, StoreError> {
        let mut records = self.records.borrow_mut();
        if records.iter().any(|r| r.description == description) {
            return Ok(Inserted::Duplicate);
        }
        let mut next_id = self.next_id.borrow_mut();
        *next_id += 1;
        let record = PersistedQueryRecord {
            id: *next_id,
            description: description.to_string(),
            access_count: 0,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(Inserted::Created(record))
    }

    fn touch(&self, id: i64, access_count: i64, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(record) = self.records.borrow_mut().iter_mut().find(|r| r.id == id) {
            record.access_count = access_count;
            record.updated_at = now;
        }
        Ok(())
    }

    fn delete_stale(
        &self,
        unused_before: DateTime<Utc>,
        used_before: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| {
            let cutoff = if r.access_count == 0 {
                unused_before
            } else {
                used_before
            };
            r.updated_at >= cutoff
        });
        Ok(before - records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_duplicate_insert_is_not_an_error() {
        let store = MemoryRecordStore::new();
        let now = Utc::now();
        let Inserted::Created(first) = store.insert("Name:", now).unwrap() else {
            panic!("first insert should create");
        };
        assert_eq!(store.insert("Name:", now).unwrap(), Inserted::Duplicate);
        assert_eq!(store.find_by_description("Name:").unwrap(), Some(first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stale_records_by_use() {
        let store = MemoryRecordStore::new();
        let now = Utc::now();
        let old = now - TimeDelta::hours(2);
        store.insert("Name:", old).unwrap();
        store.insert("Location:", old).unwrap();
        let Some(reused) = store.find_by_description("Location:").unwrap() else {
            panic!("record should exist");
        };
        store.touch(reused.id, 1, old).unwrap();

        let removed = store
            .delete_stale(now - TimeDelta::hours(1), now - TimeDelta::days(1))
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.find_by_description("Name:").unwrap().is_none());
        assert!(store.find(reused.id).unwrap().is_some());
    }
}
