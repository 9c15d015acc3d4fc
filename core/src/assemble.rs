//! Query assembly.
//!
//! Combines a model's conditions, the joins they need, the ordering and any
//! caller overrides into one [`CompiledQuery`].

use std::fmt;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::conditions::{clean_id_set, Condition, ConditionBuilder};
use crate::error::ConfigurationError;
use crate::join::{self, JoinClause};
use crate::model::Model;
use crate::order::reverse_order;
use crate::planner::Planner;
use crate::spec::QuerySpec;

/// What to do with the query's own ordering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OrderOverride {
    #[default]
    Keep,
    /// Flip every direction of the query's ordering
    Reverse,
    Replace(String),
    /// No ORDER BY at all (subqueries, counts)
    None,
}

/// Caller adjustments applied on top of a query's own clauses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub select: Option<String>,
    /// Extra join paths from the root table
    pub joins: Vec<Vec<CompactString>>,
    /// Extra tables, cross joined
    pub tables: Vec<CompactString>,
    pub conditions: Vec<String>,
    pub order: OrderOverride,
    pub group: Option<String>,
    pub limit: Option<usize>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn join(mut self, token: &str) -> Self {
        self.joins.push(vec![CompactString::from(token)]);
        self
    }

    /// Chained join `root -> path[0] -> path[1] ...`; an empty path is ignored.
    pub fn join_path(mut self, path: &[&str]) -> Self {
        if !path.is_empty() {
            self.joins
                .push(path.iter().map(|t| CompactString::from(*t)).collect());
        }
        self
    }

    pub fn table(mut self, table: &str) -> Self {
        self.tables.push(CompactString::from(table));
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = OrderOverride::Replace(order.into());
        self
    }

    pub fn reversed(mut self) -> Self {
        self.order = OrderOverride::Reverse;
        self
    }

    pub fn without_order(mut self) -> Self {
        self.order = OrderOverride::None;
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A fully assembled SELECT statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub model: Model,
    pub select: String,
    pub from: &'static str,
    pub joins: SmallVec<[JoinClause; 4]>,
    pub tables: Vec<CompactString>,
    /// Deduplicated, each wrapped in parentheses when it has a top-level OR
    pub conditions: Vec<String>,
    pub group: Option<String>,
    pub order: String,
    pub limit: Option<usize>,
}

impl CompiledQuery {
    /// Renders the statement on one line.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM `{}`", self.select, self.from);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_string());
        }
        for table in &self.tables {
            sql.push_str(&format!(" CROSS JOIN `{table}`"));
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        if let Some(group) = &self.group {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// True when `order` already sorts on `table.id`.
fn references_id(order: &str, table: &str) -> bool {
    let needle = format!("{table}.id");
    order.match_indices(&needle).any(|(i, _)| {
        let before = order[..i].chars().next_back();
        let after = order[i + needle.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
            && !after.is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}

/// True when `fragment` contains an OR outside parentheses and string literals.
fn has_top_level_or(fragment: &str) -> bool {
    let bytes = fragment.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => depth -= 1,
                b' ' if depth == 0 && fragment[i..].starts_with(" OR ") => return true,
                _ => {}
            },
        }
        i += 1;
    }
    false
}

/// The order clause for `spec`, adding whatever the order handler needs to `builder`.
fn order_clause(
    planner: &Planner,
    spec: &QuerySpec,
    builder: &mut ConditionBuilder<'_>,
    id_set: &[i64],
) -> Result<String, ConfigurationError> {
    let model = spec.model();
    let table = builder.table();
    let definition = planner.schema().definition(model);

    let (by, reverse) = match spec.order_by() {
        Some(by) => by,
        // explicit id lists keep their own order
        None if !id_set.is_empty() => {
            let whens = id_set
                .iter()
                .enumerate()
                .map(|(i, id)| format!("WHEN {id} THEN {i}"))
                .collect::<Vec<_>>()
                .join(" ");
            return Ok(format!("CASE {table}.id {whens} END ASC"));
        }
        None => (definition.default_order, false),
    };

    let plan = planner
        .orders()
        .resolve(model, by, planner.schema(), planner.dialect())?;
    builder.merge_order(&plan);
    let mut order = plan.order;
    if !references_id(&order, table) {
        order.push_str(&format!(", {table}.id DESC"));
    }
    Ok(if reverse { reverse_order(&order) } else { order })
}

/// Compiles `spec` with `overrides` applied.
pub(crate) fn assemble(
    planner: &Planner,
    spec: &QuerySpec,
    overrides: &Overrides,
) -> Result<CompiledQuery, ConfigurationError> {
    let model = spec.model();
    let definition = planner.schema().definition(model);
    let mut builder = ConditionBuilder::new(planner, model);
    (definition.build)(spec, &mut builder)?;

    let table = builder.table();
    let id_column = format!("{table}.id");
    let mut id_set = Vec::new();
    if spec.contains("ids") {
        id_set = clean_id_set(&id_column, &spec.ids("ids"), planner.limits());
        builder.add(&Condition::id_set(id_column.as_str(), id_set.clone()), &[]);
    }

    let order = match &overrides.order {
        OrderOverride::None => String::new(),
        OrderOverride::Replace(order) => order.clone(),
        OrderOverride::Keep => order_clause(planner, spec, &mut builder, &id_set)?,
        OrderOverride::Reverse => {
            reverse_order(&order_clause(planner, spec, &mut builder, &id_set)?)
        }
    };

    for path in &overrides.joins {
        let path = path.iter().map(CompactString::as_str).collect::<Vec<_>>();
        builder.join(&path);
    }
    let mut clauses = builder.finish();
    clauses.conditions.extend(overrides.conditions.iter().cloned());
    if overrides.group.is_some() {
        clauses.group.clone_from(&overrides.group);
    }

    let joins = planner.joins().resolve_tree(table, &clauses.joins)?;
    for extra in &overrides.tables {
        if !join::is_known_table(extra) {
            return Err(ConfigurationError::UnknownTable(extra.clone()));
        }
    }
    let tables = overrides
        .tables
        .iter()
        .filter(|t| t.as_str() != table && !joins.iter().any(|j| j.table == **t))
        .cloned()
        .collect();

    let mut conditions: Vec<String> = Vec::with_capacity(clauses.conditions.len());
    for fragment in clauses.conditions {
        let fragment = if has_top_level_or(&fragment) {
            format!("({fragment})")
        } else {
            fragment
        };
        if !conditions.contains(&fragment) {
            conditions.push(fragment);
        }
    }

    Ok(CompiledQuery {
        model,
        select: overrides
            .select
            .clone()
            .unwrap_or_else(|| format!("DISTINCT {id_column}")),
        from: table,
        joins,
        tables,
        conditions,
        group: clauses.group,
        order,
        limit: overrides.limit,
    })
}
