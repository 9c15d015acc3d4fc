//! Sequential navigation through a result list.
//!
//! A [`Cursor`] walks the ids of one [`Query`]. When the query is nested
//! inside an outer one (images of one observation inside a list of
//! observations, for instance), the cursor can be given an outer cursor:
//! stepping past either end of the inner list then moves the outer cursor
//! and continues in the inner query of the outer's new position.

use std::rc::Rc;

use quarry_core::{Connection, Params, QuerySpec, Value};

use crate::error::Result;
use crate::query::Query;

/// How an inner query refers to its position in the outer one.
pub trait Nesting {
    /// Outer id the inner query is currently scoped to.
    fn outer_id(&self, inner: &QuerySpec) -> Option<i64>;

    /// Inner parameters re-scoped to `outer_id`.
    fn inner_params(&self, inner: &QuerySpec, outer_id: i64) -> Params;

    /// Adjusts the outer query's parameters before it is run, for example
    /// to skip outer rows that can never have inner results.
    fn outer_params(&self, outer: Params) -> Params {
        outer
    }
}

/// Nesting through one id parameter of the inner query, such as
/// `observation` on an image query.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamNesting {
    key: &'static str,
    outer_defaults: Vec<(&'static str, Value)>,
}

impl ParamNesting {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            outer_defaults: Vec::new(),
        }
    }

    /// Sets `key` on the outer query unless it already carries it.
    pub fn with_outer_param(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.outer_defaults.push((key, value.into()));
        self
    }
}

impl Nesting for ParamNesting {
    fn outer_id(&self, inner: &QuerySpec) -> Option<i64> {
        inner.int(self.key)
    }

    fn inner_params(&self, inner: &QuerySpec, outer_id: i64) -> Params {
        inner.params_with(self.key, outer_id)
    }

    fn outer_params(&self, mut outer: Params) -> Params {
        for (key, value) in &self.outer_defaults {
            outer.entry((*key).into()).or_insert_with(|| value.clone());
        }
        outer
    }
}

struct Outer<'e, C: Connection> {
    cursor: Cursor<'e, C>,
    nesting: Rc<dyn Nesting + 'e>,
}

impl<C: Connection> Clone for Outer<'_, C> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
            nesting: Rc::clone(&self.nesting),
        }
    }
}

/// Position within a [`Query`], with a saved position to return to.
pub struct Cursor<'e, C: Connection> {
    query: Query<'e, C>,
    current: Option<i64>,
    saved: Option<i64>,
    outer: Option<Box<Outer<'e, C>>>,
}

impl<C: Connection> Clone for Cursor<'_, C> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            current: self.current,
            saved: self.saved,
            outer: self.outer.clone(),
        }
    }
}

impl<C: Connection> std::fmt::Debug for Cursor<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("query", &self.query)
            .field("current", &self.current)
            .field("saved", &self.saved)
            .field("outer", &self.outer.as_ref().map(|o| &o.cursor))
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl<'e, C: Connection> Cursor<'e, C> {
    pub fn new(query: Query<'e, C>) -> Self {
        Self {
            query,
            current: None,
            saved: None,
            outer: None,
        }
    }

    /// Nests this cursor inside `outer`. The outer cursor is positioned on
    /// the outer id the inner query is scoped to.
    pub fn with_outer(mut self, mut outer: Cursor<'e, C>, nesting: impl Nesting + 'e) -> Self {
        if let Some(id) = nesting.outer_id(self.query.spec()) {
            outer.set_current(id);
        }
        self.outer = Some(Box::new(Outer {
            cursor: outer,
            nesting: Rc::new(nesting),
        }));
        self
    }

    pub const fn query(&self) -> &Query<'e, C> {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Query<'e, C> {
        &mut self.query
    }

    pub fn outer(&self) -> Option<&Cursor<'e, C>> {
        self.outer.as_ref().map(|o| &o.cursor)
    }

    pub const fn current_id(&self) -> Option<i64> {
        self.current
    }

    pub const fn saved_id(&self) -> Option<i64> {
        self.saved
    }

    /// Moves to `id` and remembers it as the saved position.
    pub fn set_current(&mut self, id: i64) {
        self.current = Some(id);
        self.saved = Some(id);
    }

    /// Returns to the saved position.
    pub fn reset(&mut self) {
        self.current = self.saved;
    }

    /// Moves to the first result, walking the outer cursor from its start
    /// until an inner query has results.
    pub fn first(&mut self) -> Result<Option<i64>> {
        self.extreme(Direction::Forward)
    }

    /// Moves to the last result, walking the outer cursor from its end
    /// until an inner query has results.
    pub fn last(&mut self) -> Result<Option<i64>> {
        self.extreme(Direction::Backward)
    }

    /// Moves to the next result. Returns `None`, leaving the cursor where it
    /// was, when there is nowhere to go.
    pub fn next(&mut self) -> Result<Option<i64>> {
        self.step(Direction::Forward)
    }

    /// Moves to the previous result. Returns `None`, leaving the cursor
    /// where it was, when there is nowhere to go.
    pub fn prev(&mut self) -> Result<Option<i64>> {
        self.step(Direction::Backward)
    }

    fn extreme(&mut self, direction: Direction) -> Result<Option<i64>> {
        if self.outer.is_none() {
            let ids = self.query.result_ids()?;
            let id = match direction {
                Direction::Forward => ids.first(),
                Direction::Backward => ids.last(),
            }
            .copied();
            if id.is_some() {
                self.current = id;
            }
            return Ok(id);
        }

        let Some(mut outer) = self.outer.as_deref().cloned() else {
            return Ok(None);
        };
        if outer.cursor.extreme(direction)?.is_none() {
            return Ok(None);
        }
        self.walk_outer(outer, direction)
    }

    fn step(&mut self, direction: Direction) -> Result<Option<i64>> {
        let Some(current) = self.current else {
            return Ok(None);
        };
        let ids = self.query.result_ids()?;
        let Some(index) = ids.iter().position(|&id| id == current) else {
            return Ok(None);
        };
        let neighbor = match direction {
            Direction::Forward => ids.get(index + 1),
            Direction::Backward => index.checked_sub(1).and_then(|i| ids.get(i)),
        }
        .copied();
        if let Some(id) = neighbor {
            self.current = Some(id);
            return Ok(Some(id));
        }

        let Some(mut outer) = self.outer.as_deref().cloned() else {
            return Ok(None);
        };
        if outer.cursor.step(direction)?.is_none() {
            return Ok(None);
        }
        self.walk_outer(outer, direction)
    }

    /// Starting from `outer`'s position, moves it in `direction` until the
    /// inner query it scopes has results. Commits the new outer position,
    /// inner query and current id only on success.
    fn walk_outer(&mut self, mut outer: Outer<'e, C>, direction: Direction) -> Result<Option<i64>> {
        let planner = self.query.planner();
        let conn = self.query.connection();
        let model = self.query.model();
        loop {
            let Some(outer_id) = outer.cursor.current else {
                return Ok(None);
            };
            let params = outer.nesting.inner_params(self.query.spec(), outer_id);
            let mut inner = Query::new(planner, conn, planner.construct(model, params)?);
            inner.set_need_letters(self.query.need_letters());

            let ids = inner.result_ids()?;
            let id = match direction {
                Direction::Forward => ids.first(),
                Direction::Backward => ids.last(),
            }
            .copied();
            if let Some(id) = id {
                self.query = inner;
                self.current = Some(id);
                self.outer = Some(Box::new(outer));
                return Ok(Some(id));
            }

            if outer.cursor.step(direction)?.is_none() {
                return Ok(None);
            }
        }
    }
}
