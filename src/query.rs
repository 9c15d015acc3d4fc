//! Result caching and pagination.
//!
//! A [`Query`] runs its id-only statement once, on first use, and keeps the
//! ordered id list. Full rows are fetched lazily in batches and memoized.
//! Nothing is refreshed automatically: call [`Query::clear_cache`] after the
//! underlying data changes.

use hashbrown::{HashMap, HashSet};
use quarry_core::{
    CompiledQuery, Connection, Model, Overrides, Planner, QuerySpec, Record, Value,
    quarry_trace_cache, quarry_trace_query,
};

use crate::error::Result;

/// One page of a result list.
///
/// Pages are numbered from 1. The query fills in [`num_total`](Self::num_total)
/// and, in letter mode, [`used_letters`](Self::used_letters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub number: usize,
    pub per_page: usize,
    /// Restricts the page to ids whose letter column starts with this letter
    pub letter: Option<char>,
    pub num_total: usize,
    pub used_letters: Vec<char>,
}

impl Pager {
    pub fn new(number: usize, per_page: usize) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
            letter: None,
            num_total: 0,
            used_letters: Vec::new(),
        }
    }

    pub fn with_letter(mut self, letter: char) -> Self {
        self.letter = Some(letter.to_ascii_uppercase());
        self
    }

    /// Index of the first entry on this page.
    pub const fn from(&self) -> usize {
        (self.number - 1) * self.per_page
    }

    /// Index of the last entry on this page, inclusive.
    pub const fn to(&self) -> usize {
        self.from() + self.per_page - 1
    }

    pub const fn num_pages(&self) -> usize {
        self.num_total.div_ceil(self.per_page)
    }
}

/// Cached results of one [`QuerySpec`].
pub struct Query<'e, C: Connection> {
    planner: &'e Planner,
    conn: &'e C,
    spec: QuerySpec,
    ids: Option<Vec<i64>>,
    /// First letter of the letter column, per id
    letters: Option<HashMap<i64, char>>,
    need_letters: bool,
    records: HashMap<i64, Record>,
}

impl<C: Connection> Clone for Query<'_, C> {
    fn clone(&self) -> Self {
        Self {
            planner: self.planner,
            conn: self.conn,
            spec: self.spec.clone(),
            ids: self.ids.clone(),
            letters: self.letters.clone(),
            need_letters: self.need_letters,
            records: self.records.clone(),
        }
    }
}

impl<C: Connection> std::fmt::Debug for Query<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("spec", &self.spec)
            .field("ids", &self.ids)
            .field("need_letters", &self.need_letters)
            .field("hydrated", &self.records.len())
            .finish()
    }
}

/// Uppercased first alphabetic character of a letter-column value.
fn first_letter(value: &Value) -> Option<char> {
    value
        .as_str()?
        .chars()
        .find(|c| c.is_alphabetic())
        .and_then(|c| c.to_uppercase().next())
}

impl<'e, C: Connection> Query<'e, C> {
    pub fn new(planner: &'e Planner, conn: &'e C, spec: QuerySpec) -> Self {
        Self {
            planner,
            conn,
            spec,
            ids: None,
            letters: None,
            need_letters: false,
            records: HashMap::new(),
        }
    }

    pub const fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub const fn model(&self) -> Model {
        self.spec.model()
    }

    pub const fn planner(&self) -> &'e Planner {
        self.planner
    }

    pub const fn connection(&self) -> &'e C {
        self.conn
    }

    /// The id-only statement this query runs.
    pub fn compiled(&self) -> Result<CompiledQuery> {
        Ok(self.planner.compile(&self.spec, &Overrides::new())?)
    }

    pub fn sql(&self) -> Result<String> {
        Ok(self.compiled()?.to_sql())
    }

    /// Ordered result ids, running the query on first use.
    pub fn result_ids(&mut self) -> Result<&[i64]> {
        if self.ids.is_none() {
            self.fill()?;
        }
        Ok(self.ids.as_deref().unwrap_or_default())
    }

    pub fn num_results(&mut self) -> Result<usize> {
        Ok(self.result_ids()?.len())
    }

    /// Position of `id` in the result list.
    pub fn index(&mut self, id: i64) -> Result<Option<usize>> {
        Ok(self.result_ids()?.iter().position(|&i| i == id))
    }

    /// Replaces the result list without touching the database.
    pub fn set_result_ids(&mut self, ids: Vec<i64>) {
        self.clear_cache();
        self.ids = Some(ids);
    }

    pub const fn need_letters(&self) -> bool {
        self.need_letters
    }

    /// Toggles letter capture. Changing it drops the cache so the next access
    /// re-runs the query with or without the letter column.
    pub fn set_need_letters(&mut self, need_letters: bool) {
        if self.need_letters != need_letters {
            self.need_letters = need_letters;
            self.clear_cache();
        }
    }

    /// Distinct letters present in the results, sorted. Empty unless
    /// letters are needed.
    pub fn used_letters(&mut self) -> Result<Vec<char>> {
        if !self.need_letters {
            return Ok(Vec::new());
        }
        self.result_ids()?;
        let mut letters = self
            .letters
            .as_ref()
            .map(|l| l.values().copied().collect::<Vec<_>>())
            .unwrap_or_default();
        letters.sort_unstable();
        letters.dedup();
        Ok(letters)
    }

    /// Letter captured for `id`, if any.
    pub fn letter(&mut self, id: i64) -> Result<Option<char>> {
        self.result_ids()?;
        Ok(self.letters.as_ref().and_then(|l| l.get(&id).copied()))
    }

    /// Ids on `pager`'s page, updating its totals.
    ///
    /// With letters enabled and a letter selected, the list is filtered by
    /// letter before it is counted and sliced.
    pub fn paginate_ids(&mut self, pager: &mut Pager) -> Result<Vec<i64>> {
        let letter = pager.letter.filter(|_| self.need_letters);
        if self.need_letters {
            pager.used_letters = self.used_letters()?;
        }
        self.result_ids()?;
        let ids = self.ids.as_deref().unwrap_or_default();

        let selected = match (letter, &self.letters) {
            (Some(letter), Some(letters)) => ids
                .iter()
                .copied()
                .filter(|id| letters.get(id) == Some(&letter))
                .collect::<Vec<_>>(),
            _ => ids.to_vec(),
        };
        pager.num_total = selected.len();

        let from = pager.from().min(selected.len());
        let to = (pager.to() + 1).min(selected.len());
        Ok(selected[from..to].to_vec())
    }

    /// Hydrated records on `pager`'s page.
    pub fn paginate(&mut self, pager: &mut Pager) -> Result<Vec<Record>> {
        let ids = self.paginate_ids(pager)?;
        self.hydrate(&ids)
    }

    /// Every hydrated result, in result order.
    pub fn results(&mut self) -> Result<Vec<Record>> {
        let ids = self.result_ids()?.to_vec();
        self.hydrate(&ids)
    }

    /// Records for `ids`, in the given order. Ids that no longer resolve are
    /// left out.
    pub fn hydrate(&mut self, ids: &[i64]) -> Result<Vec<Record>> {
        let missing = ids
            .iter()
            .copied()
            .filter(|id| !self.records.contains_key(id))
            .collect::<Vec<_>>();

        let limits = self.planner.limits();
        let batch = limits.hydrate_batch.min(limits.max_id_set).max(1);
        for chunk in missing.chunks(batch) {
            let sql = self.planner.hydrate_sql(self.model(), chunk);
            quarry_trace_query!(sql, self.model());
            let rows = self.conn.select_rows(&sql)?;
            quarry_trace_cache!("hydrate", self.model(), rows.len());
            for record in rows.into_records() {
                self.records.insert(record.id, record);
            }
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect())
    }

    /// First result id, without filling the cache.
    pub fn first_id(&mut self) -> Result<Option<i64>> {
        if let Some(ids) = &self.ids {
            return Ok(ids.first().copied());
        }
        self.select_one(Overrides::new().limit(1))
    }

    /// Last result id, without filling the cache.
    pub fn last_id(&mut self) -> Result<Option<i64>> {
        if let Some(ids) = &self.ids {
            return Ok(ids.last().copied());
        }
        self.select_one(Overrides::new().reversed().limit(1))
    }

    /// Drops ids, letters and hydrated records.
    pub fn clear_cache(&mut self) {
        if self.ids.is_some() {
            quarry_trace_cache!("clear", self.model(), self.ids.as_ref().map_or(0, Vec::len));
        }
        self.ids = None;
        self.letters = None;
        self.records.clear();
    }

    fn select_one(&self, overrides: Overrides) -> Result<Option<i64>> {
        let sql = self.planner.compile(&self.spec, &overrides)?.to_sql();
        quarry_trace_query!(sql, self.model());
        Ok(self.conn.select_value(&sql)?.as_ref().and_then(Value::as_id))
    }

    fn fill(&mut self) -> Result<()> {
        if self.need_letters {
            let sql = self.planner.compile_letters(&self.spec)?.to_sql();
            quarry_trace_query!(sql, self.model());
            let rows = self.conn.select_rows(&sql)?;

            let mut ids = Vec::with_capacity(rows.len());
            let mut seen = HashSet::with_capacity(rows.len());
            let mut letters = HashMap::with_capacity(rows.len());
            for row in &rows.rows {
                let Some(id) = row.first().and_then(Value::as_id) else {
                    continue;
                };
                // A joined letter column can repeat an id; the first row wins.
                if !seen.insert(id) {
                    continue;
                }
                ids.push(id);
                if let Some(letter) = row.get(1).and_then(first_letter) {
                    letters.insert(id, letter);
                }
            }
            self.ids = Some(ids);
            self.letters = Some(letters);
        } else {
            let sql = self.compiled()?.to_sql();
            quarry_trace_query!(sql, self.model());
            let ids = self
                .conn
                .select_values(&sql)?
                .iter()
                .filter_map(Value::as_id)
                .collect::<Vec<_>>();
            self.ids = Some(ids);
        }
        quarry_trace_cache!("fill", self.model(), self.ids.as_ref().map_or(0, Vec::len));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{Dialect, ExecutionError, Limits, Rows, params};
    use std::cell::RefCell;

    /// Answers id queries with a fixed list and hydration with one row per
    /// id it knows, recording every statement.
    struct FakeConnection {
        ids: Vec<i64>,
        names: Vec<(i64, &'static str)>,
        log: RefCell<Vec<String>>,
    }

    impl FakeConnection {
        fn new(ids: Vec<i64>) -> Self {
            Self {
                ids,
                names: Vec::new(),
                log: RefCell::new(Vec::new()),
            }
        }

        fn with_names(names: Vec<(i64, &'static str)>) -> Self {
            Self {
                ids: names.iter().map(|(id, _)| *id).collect(),
                names,
                log: RefCell::new(Vec::new()),
            }
        }

        fn statements(&self) -> usize {
            self.log.borrow().len()
        }
    }

    impl Connection for FakeConnection {
        fn dialect(&self) -> Dialect {
            Dialect::SQLite
        }

        fn select_values(&self, sql: &str) -> std::result::Result<Vec<Value>, ExecutionError> {
            self.log.borrow_mut().push(sql.to_string());
            let mut ids = self.ids.clone();
            if sql.contains("names.id ASC") {
                ids.reverse();
            }
            if sql.ends_with("LIMIT 1") {
                ids.truncate(1);
            }
            Ok(ids.into_iter().map(Value::Int).collect())
        }

        fn select_rows(&self, sql: &str) -> std::result::Result<Rows, ExecutionError> {
            self.log.borrow_mut().push(sql.to_string());
            if sql.starts_with("SELECT DISTINCT names.id, names.sort_name") {
                return Ok(Rows {
                    columns: vec!["id".into(), "sort_name".into()],
                    rows: self
                        .names
                        .iter()
                        .map(|(id, name)| vec![Value::Int(*id), Value::from(*name)])
                        .collect(),
                });
            }
            // hydration: `... WHERE names.id IN (1,2,3)`
            let requested = sql
                .rsplit_once('(')
                .map(|(_, list)| list.trim_end_matches(')'))
                .unwrap_or_default()
                .split(',')
                .filter_map(|id| id.trim().parse::<i64>().ok())
                .filter(|id| self.ids.contains(id))
                .map(|id| vec![Value::Int(id), Value::from(format!("name {id}"))])
                .collect();
            Ok(Rows {
                columns: vec!["id".into(), "text_name".into()],
                rows: requested,
            })
        }
    }

    fn spec(planner: &Planner) -> QuerySpec {
        planner.construct(Model::Name, params! {}).unwrap()
    }

    #[test]
    fn test_ids_are_cached() {
        let planner = Planner::default();
        let conn = FakeConnection::new((1..=25).collect());
        let mut query = Query::new(&planner, &conn, spec(&planner));

        assert_eq!(query.num_results().unwrap(), 25);
        assert_eq!(query.index(11).unwrap(), Some(10));
        assert_eq!(query.index(99).unwrap(), None);
        assert_eq!(conn.statements(), 1);

        query.clear_cache();
        query.result_ids().unwrap();
        assert_eq!(conn.statements(), 2);
    }

    #[test]
    fn test_paginate_slices_inclusive_range() {
        let planner = Planner::default();
        let conn = FakeConnection::new((100..125).collect());
        let mut query = Query::new(&planner, &conn, spec(&planner));

        let mut pager = Pager::new(2, 10);
        assert_eq!(pager.from(), 10);
        assert_eq!(pager.to(), 19);
        let ids = query.paginate_ids(&mut pager).unwrap();
        assert_eq!(ids, (110..120).collect::<Vec<_>>());
        assert_eq!(pager.num_total, 25);
        assert_eq!(pager.num_pages(), 3);

        let mut last = Pager::new(3, 10);
        assert_eq!(query.paginate_ids(&mut last).unwrap().len(), 5);
        let mut beyond = Pager::new(9, 10);
        assert!(query.paginate_ids(&mut beyond).unwrap().is_empty());
    }

    #[test]
    fn test_letters_filter_before_counting() {
        let planner = Planner::default();
        let conn = FakeConnection::with_names(vec![
            (1, "Agaricus"),
            (2, "amanita"),
            (3, "Boletus"),
            (4, "\"Xerocomus\""),
            (5, "Amanita muscaria"),
        ]);
        let mut query = Query::new(&planner, &conn, spec(&planner));
        query.set_need_letters(true);

        assert_eq!(query.used_letters().unwrap(), vec!['A', 'B', 'X']);
        assert_eq!(query.letter(4).unwrap(), Some('X'));

        let mut pager = Pager::new(1, 2).with_letter('a');
        let ids = query.paginate_ids(&mut pager).unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(pager.num_total, 3);
        assert_eq!(pager.used_letters, vec!['A', 'B', 'X']);

        let mut second = Pager::new(2, 2).with_letter('A');
        assert_eq!(query.paginate_ids(&mut second).unwrap(), vec![5]);
    }

    #[test]
    fn test_letter_ignored_without_letters() {
        let planner = Planner::default();
        let conn = FakeConnection::new(vec![1, 2, 3]);
        let mut query = Query::new(&planner, &conn, spec(&planner));

        let mut pager = Pager::new(1, 10).with_letter('Q');
        assert_eq!(query.paginate_ids(&mut pager).unwrap(), vec![1, 2, 3]);
        assert!(pager.used_letters.is_empty());
    }

    #[test]
    fn test_toggling_letters_requeries() {
        let planner = Planner::default();
        let conn = FakeConnection::with_names(vec![(1, "Agaricus")]);
        let mut query = Query::new(&planner, &conn, spec(&planner));

        query.result_ids().unwrap();
        query.set_need_letters(false);
        query.result_ids().unwrap();
        assert_eq!(conn.statements(), 1);

        query.set_need_letters(true);
        query.result_ids().unwrap();
        assert_eq!(conn.statements(), 2);
        assert!(conn.log.borrow()[1].starts_with("SELECT DISTINCT names.id, names.sort_name"));
    }

    #[test]
    fn test_hydrate_batches_and_memoizes() {
        let planner = Planner::new(
            Dialect::SQLite,
            Limits {
                hydrate_batch: 2,
                ..Limits::default()
            },
        );
        let conn = FakeConnection::new(vec![1, 2, 3, 4, 5]);
        let mut query = Query::new(&planner, &conn, spec(&planner));

        let records = query.hydrate(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(conn.statements(), 3);

        let again = query.hydrate(&[5, 1]).unwrap();
        assert_eq!(again.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 1]);
        assert_eq!(conn.statements(), 3);
    }

    #[test]
    fn test_hydrate_omits_vanished_rows() {
        let planner = Planner::default();
        let conn = FakeConnection::new(vec![1, 3]);
        let mut query = Query::new(&planner, &conn, spec(&planner));
        query.set_result_ids(vec![1, 2, 3]);

        let records = query.results().unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(query.num_results().unwrap(), 3);
        assert_eq!(records[0].get("text_name"), Some(&Value::from("name 1")));
    }

    #[test]
    fn test_first_and_last_ids() {
        let planner = Planner::default();
        let conn = FakeConnection::new(vec![7, 8, 9]);
        let mut query = Query::new(&planner, &conn, spec(&planner));

        assert_eq!(query.first_id().unwrap(), Some(7));
        assert_eq!(query.last_id().unwrap(), Some(9));
        assert!(conn.log.borrow().iter().all(|sql| sql.ends_with("LIMIT 1")));

        query.set_result_ids(vec![3, 4]);
        assert_eq!(query.last_id().unwrap(), Some(4));
    }
}
