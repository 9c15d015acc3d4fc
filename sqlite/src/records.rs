//! [`RecordStore`] over the `query_records` table.

use chrono::{DateTime, SecondsFormat, Utc};
use quarry_core::records::{Inserted, PersistedQueryRecord, RecordStore};
use quarry_core::StoreError;
use rusqlite::{OptionalExtension, Row, params};

const SELECT: &str = "SELECT id, description, access_count, updated_at FROM `query_records`";

/// Timestamps are stored as fixed-width RFC 3339 text so they compare
/// correctly as strings.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

type RawRecord = (i64, String, i64, String);

fn record(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn parse(raw: RawRecord) -> Result<PersistedQueryRecord, StoreError> {
    let (id, description, access_count, updated_at) = raw;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map_err(|e| StoreError::Corrupt {
            id,
            reason: format!("updated_at '{updated_at}': {e}"),
        })?
        .with_timezone(&Utc);
    Ok(PersistedQueryRecord {
        id,
        description,
        access_count,
        updated_at,
    })
}

/// Query records stored in the same SQLite database as the data.
#[derive(Debug, Clone, Copy)]
pub struct SqliteRecordStore<'c> {
    conn: &'c rusqlite::Connection,
}

impl<'c> SqliteRecordStore<'c> {
    pub fn new(conn: &'c rusqlite::Connection) -> Self {
        Self { conn }
    }

    fn select_one(
        &self,
        filter: &str,
        param: &dyn rusqlite::ToSql,
    ) -> Result<Option<PersistedQueryRecord>, StoreError> {
        self.conn
            .query_row(&format!("{SELECT} WHERE {filter}"), [param], record)
            .optional()?
            .map(parse)
            .transpose()
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn find_by_description(
        &self,
        description: &str,
    ) -> Result<Option<PersistedQueryRecord>, StoreError> {
        self.select_one("description = ?1", &description)
    }

    fn find(&self, id: i64) -> Result<Option<PersistedQueryRecord>, StoreError> {
        self.select_one("id = ?1", &id)
    }

    fn insert(&self, description: &str, now: DateTime<Utc>) -> Result<Inserted, StoreError> {
        let changed = self.conn.execute(
            "INSERT INTO `query_records` (description, access_count, updated_at) \
             VALUES (?1, 0, ?2) ON CONFLICT(description) DO NOTHING",
            params![description, timestamp(now)],
        )?;
        if changed == 0 {
            return Ok(Inserted::Duplicate);
        }
        Ok(Inserted::Created(PersistedQueryRecord {
            id: self.conn.last_insert_rowid(),
            description: description.to_string(),
            access_count: 0,
            updated_at: now,
        }))
    }

    fn touch(&self, id: i64, access_count: i64, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE `query_records` SET access_count = ?1, updated_at = ?2 WHERE id = ?3",
            params![access_count, timestamp(now), id],
        )?;
        Ok(())
    }

    fn delete_stale(
        &self,
        unused_before: DateTime<Utc>,
        used_before: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM `query_records` \
             WHERE (access_count = 0 AND updated_at < ?1) \
             OR (access_count > 0 AND updated_at < ?2)",
            params![timestamp(unused_before), timestamp(used_before)],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteConnection;
    use chrono::TimeDelta;

    #[test]
    fn test_insert_then_duplicate() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.create_schema().unwrap();
        let store = conn.records();
        let now = Utc::now();

        let Inserted::Created(created) = store.insert("Name:by=yid", now).unwrap() else {
            panic!("expected a new record");
        };
        assert_eq!(store.insert("Name:by=yid", now).unwrap(), Inserted::Duplicate);

        let found = store.find_by_description("Name:by=yid").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.access_count, 0);
        assert_eq!(store.find(created.id).unwrap().unwrap().description, "Name:by=yid");
        assert!(store.find(created.id + 1).unwrap().is_none());
    }

    #[test]
    fn test_sweep_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let conn = SqliteConnection::open(dir.path().join("records.db")).unwrap();
        conn.create_schema().unwrap();
        let store = conn.records();
        let now = Utc::now();

        store.insert("Name:", now - TimeDelta::hours(3)).unwrap();
        store.insert("Location:", now - TimeDelta::hours(3)).unwrap();
        store.insert("Image:", now).unwrap();
        let used = store.find_by_description("Location:").unwrap().unwrap();
        store.touch(used.id, 4, now - TimeDelta::hours(3)).unwrap();

        let removed = store
            .delete_stale(now - TimeDelta::hours(1), now - TimeDelta::days(1))
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.find_by_description("Name:").unwrap().is_none());
        assert_eq!(store.find(used.id).unwrap().unwrap().access_count, 4);
    }

    #[test]
    fn test_corrupt_timestamp() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.create_schema().unwrap();
        conn.execute_batch(
            "INSERT INTO `query_records` (id, description, updated_at) VALUES (9, 'Name:', 'yesterday')",
        )
        .unwrap();
        assert!(matches!(
            conn.records().find(9),
            Err(StoreError::Corrupt { id: 9, .. })
        ));
    }
}
