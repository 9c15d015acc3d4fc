//! Condition rendering.
//!
//! A [`Condition`] is one typed filter on one column. Rendering turns it into
//! zero or more SQL predicate fragments. The [`ConditionBuilder`] collects the
//! fragments for one compiled query together with the joins they need; joins
//! are only recorded when a fragment was actually emitted.

use compact_str::CompactString;
use hashbrown::HashSet;

use crate::datetime::{self, Bound, PartialDate};
use crate::dialect::Dialect;
use crate::error::ConfigurationError;
use crate::geo::{BoundingBox, GeoTarget};
use crate::join::JoinTree;
use crate::limits::Limits;
use crate::model::Model;
use crate::order::OrderPlan;
use crate::params::ParamKind;
use crate::assemble::Overrides;
use crate::planner::Planner;
use crate::search::SearchPhrase;
use crate::spec::QuerySpec;
use crate::value::Value;
use crate::{quarry_trace_truncate, schema::SchemaRegistry};

/// Always-false predicate, rendered in place of an empty `IN ()`
pub const FALSE_CONDITION: &str = "1 = 0";

/// How allowed enum members are written to the column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRender {
    /// As quoted strings
    Quoted,
    /// As their position in the allow-list, offset by `first`
    Indexed { first: i64 },
}

/// A typed filter on one column (or column expression)
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive equality against one or more strings
    Exact { column: String, values: Vec<String> },
    /// Inclusive bounds; absent bounds are skipped
    Range {
        column: String,
        min: Value,
        max: Value,
    },
    /// Search phrase matched as substrings
    Pattern { column: String, phrase: SearchPhrase },
    /// One of two fixed fragments
    Boolean {
        value: bool,
        when_true: String,
        when_false: Option<String>,
    },
    /// Values filtered through a closed allow-list
    Enum {
        column: String,
        values: Vec<String>,
        allowed: &'static [&'static str],
        render: EnumRender,
    },
    /// Membership in a set of ids
    IdSet { column: String, ids: Vec<i64> },
    /// Date range, with seasonal (year-less) bounds supported
    Date {
        column: String,
        min: Option<String>,
        max: Option<String>,
    },
    /// Timestamp range
    Time {
        column: String,
        min: Option<String>,
        max: Option<String>,
    },
    /// Bounding box search
    Geo { bbox: BoundingBox, target: GeoTarget },
}

impl Condition {
    pub fn exact(column: impl Into<String>, values: Vec<String>) -> Self {
        Condition::Exact {
            column: column.into(),
            values,
        }
    }

    pub fn id_set(column: impl Into<String>, ids: Vec<i64>) -> Self {
        Condition::IdSet {
            column: column.into(),
            ids,
        }
    }

    pub fn pattern(column: impl Into<String>, phrase: &str) -> Self {
        Condition::Pattern {
            column: column.into(),
            phrase: SearchPhrase::parse(phrase),
        }
    }

    /// Renders predicate fragments. An empty result means "no restriction".
    pub fn render(&self, dialect: Dialect, limits: &Limits) -> Vec<String> {
        match self {
            Condition::Exact { column, values } => {
                let quoted = values
                    .iter()
                    .map(|v| dialect.quote_str(&v.to_lowercase()))
                    .collect::<Vec<_>>();
                match quoted.as_slice() {
                    [] => vec![],
                    [one] => vec![format!("LOWER({column}) = {one}")],
                    many => vec![format!("LOWER({column}) IN ({})", many.join(", "))],
                }
            }
            Condition::Range { column, min, max } => {
                let mut out = Vec::with_capacity(2);
                if !min.is_blank() {
                    out.push(format!("{column} >= {}", dialect.quote_value(min)));
                }
                if !max.is_blank() {
                    out.push(format!("{column} <= {}", dialect.quote_value(max)));
                }
                out
            }
            Condition::Pattern { column, phrase } => {
                if phrase.is_blank() {
                    return vec![];
                }
                vec![phrase.conditions(column, dialect).join(" AND ")]
            }
            Condition::Boolean {
                value,
                when_true,
                when_false,
            } => match (value, when_false) {
                (true, _) => vec![when_true.clone()],
                (false, Some(when_false)) => vec![when_false.clone()],
                (false, None) => vec![],
            },
            Condition::Enum {
                column,
                values,
                allowed,
                render,
            } => render_enum(column, values, allowed, *render, dialect),
            Condition::IdSet { column, ids } => vec![render_id_set(column, ids, limits)],
            Condition::Date { column, min, max } => {
                render_date(column, min.as_deref(), max.as_deref(), dialect)
            }
            Condition::Time { column, min, max } => {
                let mut out = Vec::with_capacity(2);
                for (value, bound, op) in [(min, Bound::Lower, ">="), (max, Bound::Upper, "<=")] {
                    if let Some(fields) = value.as_deref().and_then(datetime::parse_time) {
                        let time = datetime::normalize_time(&fields, bound);
                        out.push(format!("{column} {op} {}", dialect.quote_str(&time)));
                    }
                }
                out
            }
            Condition::Geo { bbox, target } => vec![bbox.condition(*target)],
        }
    }
}

/// Deduplicates ids (first occurrence wins) and caps them at `max_id_set`.
pub fn clean_id_set(column: &str, ids: &[i64], limits: &Limits) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut unique = ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect::<Vec<_>>();
    if unique.len() > limits.max_id_set {
        quarry_trace_truncate!("max_id_set", column, unique.len(), limits.max_id_set);
        unique.truncate(limits.max_id_set);
    }
    unique
}

/// Renders a cleaned id set as `IN (...)`.
pub fn render_id_set(column: &str, ids: &[i64], limits: &Limits) -> String {
    let capped = clean_id_set(column, ids, limits);
    if capped.is_empty() {
        return FALSE_CONDITION.to_string();
    }
    let list = capped
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{column} IN ({list})")
}

fn render_enum(
    column: &str,
    values: &[String],
    allowed: &[&str],
    render: EnumRender,
    dialect: Dialect,
) -> Vec<String> {
    let mut kept: Vec<(usize, &str)> = Vec::with_capacity(values.len());
    for value in values {
        if let Some(pos) = allowed.iter().position(|a| a == value) {
            if !kept.iter().any(|(p, _)| *p == pos) {
                kept.push((pos, value));
            }
        }
    }
    if kept.len() < values.len() {
        quarry_trace_truncate!("allowed", column, values.len(), kept.len());
    }
    if kept.is_empty() {
        return vec![];
    }
    let list = kept
        .iter()
        .map(|(pos, value)| match render {
            EnumRender::Quoted => dialect.quote_str(value),
            EnumRender::Indexed { first } => (first + *pos as i64).to_string(),
        })
        .collect::<Vec<_>>()
        .join(",");
    vec![format!("{column} IN ({list})")]
}

fn render_date(
    column: &str,
    min: Option<&str>,
    max: Option<&str>,
    dialect: Dialect,
) -> Vec<String> {
    let min = min.and_then(PartialDate::parse);
    let max = max.and_then(PartialDate::parse);
    let month = dialect.month(column);
    let day = dialect.day(column);

    let season_bound = |m: u32, d: Option<u32>, op: &str| match d {
        Some(d) => format!("{month} {op} {m} OR ({month} = {m} AND {day} {op}= {d})"),
        None => format!("{month} {op}= {m}"),
    };

    // Seasonal ranges that wrap around the end of the year: a missing lower
    // day counts as the 1st, a missing upper day as the 31st.
    if let (
        Some(PartialDate::Season { month: m1, day: d1 }),
        Some(PartialDate::Season { month: m2, day: d2 }),
    ) = (min, max)
    {
        if (m1, d1.unwrap_or(1)) > (m2, d2.unwrap_or(31)) {
            return vec![format!(
                "{} OR {}",
                season_bound(m1, d1, ">"),
                season_bound(m2, d2, "<")
            )];
        }
    }

    let mut out = Vec::with_capacity(2);
    for (date, bound, op) in [(min, Bound::Lower, ">"), (max, Bound::Upper, "<")] {
        match date {
            Some(date @ PartialDate::Year { .. }) => out.push(format!(
                "{column} {op}= {}",
                dialect.quote_str(&date.normalize(bound))
            )),
            Some(PartialDate::Season { month: m, day: d }) => out.push(season_bound(m, d, op)),
            None => {}
        }
    }
    out
}

/// Output of a [`ConditionBuilder`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    pub joins: JoinTree,
    pub conditions: Vec<String>,
    pub group: Option<String>,
}

/// Collects condition fragments and joins for one query
pub struct ConditionBuilder<'p> {
    planner: &'p Planner,
    model: Model,
    table: &'static str,
    clauses: Clauses,
}

impl<'p> ConditionBuilder<'p> {
    pub fn new(planner: &'p Planner, model: Model) -> Self {
        Self {
            planner,
            model,
            table: planner.schema().table_name(model),
            clauses: Clauses::default(),
        }
    }

    pub const fn model(&self) -> Model {
        self.model
    }

    pub const fn table(&self) -> &'static str {
        self.table
    }

    pub fn dialect(&self) -> Dialect {
        self.planner.dialect()
    }

    pub fn schema(&self) -> &dyn SchemaRegistry {
        self.planner.schema()
    }

    /// `table.column` for the model's own table
    pub fn column(&self, column: &str) -> String {
        format!("{}.{column}", self.table)
    }

    /// Renders `condition`; its joins are added only if a fragment came out.
    pub fn add(&mut self, condition: &Condition, joins: &[&str]) -> bool {
        let fragments = condition.render(self.planner.dialect(), self.planner.limits());
        if fragments.is_empty() {
            return false;
        }
        self.clauses.conditions.extend(fragments);
        self.join(joins);
        true
    }

    /// Adds a raw fragment.
    pub fn push(&mut self, fragment: impl Into<String>, joins: &[&str]) {
        self.clauses.conditions.push(fragment.into());
        self.join(joins);
    }

    /// Adds the join path `table -> joins[0] -> joins[1] ...`.
    pub fn join(&mut self, joins: &[&str]) {
        if !joins.is_empty() {
            self.clauses.joins.add_path(self.table, joins);
        }
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.clauses.group = Some(group.into());
    }

    /// Takes over the joins, conditions and group an order handler asked for.
    pub fn merge_order(&mut self, plan: &OrderPlan) {
        self.clauses.joins.extend(&plan.joins);
        self.clauses
            .conditions
            .extend(plan.conditions.iter().cloned());
        if plan.group.is_some() {
            self.clauses.group.clone_from(&plan.group);
        }
    }

    pub fn finish(self) -> Clauses {
        self.clauses
    }

    // =========================================================================
    // Parameter helpers
    // =========================================================================

    /// Id-array parameter as an `IN` set.
    pub fn ids(&mut self, spec: &QuerySpec, key: &str, column: &str, joins: &[&str]) {
        let ids = spec.ids(key);
        let names = spec.strings(key);
        let Some(lookup) = self.lookup(key, column, &names) else {
            if !ids.is_empty() {
                self.add(&Condition::id_set(column, ids), joins);
            }
            return;
        };
        let mut ors = Condition::id_set(column, ids)
            .render(self.planner.dialect(), self.planner.limits())
            .into_iter()
            .filter(|fragment| fragment != FALSE_CONDITION)
            .collect::<Vec<_>>();
        ors.push(lookup);
        self.push(ors.join(" OR "), joins);
    }

    /// Scalar id parameter as an equality.
    pub fn id(&mut self, spec: &QuerySpec, key: &str, column: &str, joins: &[&str]) {
        if let Some(id) = spec.int(key) {
            self.push(format!("{column} = {id}"), joins);
        } else if let Some(lookup) = spec.str(key).and_then(|name| self.lookup(key, column, &[name])) {
            self.push(lookup, joins);
        }
    }

    /// `column IN (...)` selecting the rows of a record parameter's model
    /// whose natural key matches one of `names`, ignoring case.
    fn lookup(&self, key: &str, column: &str, names: &[&str]) -> Option<String> {
        if names.is_empty() {
            return None;
        }
        let definition = self.planner.schema().definition(self.model);
        let Some(ParamKind::Record(model)) = definition.param(key).map(|decl| decl.kind) else {
            return None;
        };
        let dialect = self.planner.dialect();
        let table = model.table();
        let values = names
            .iter()
            .map(|name| dialect.quote_str(&name.to_lowercase()))
            .collect::<Vec<_>>()
            .join(",");
        let matches = model
            .lookup_columns()
            .iter()
            .map(|c| format!("LOWER({table}.{c}) IN ({values})"))
            .collect::<Vec<_>>();
        if matches.is_empty() {
            return None;
        }
        Some(format!(
            "{column} IN (SELECT {table}.id FROM {} WHERE {})",
            dialect.quote_ident(table),
            matches.join(" OR ")
        ))
    }

    /// Search-phrase parameter.
    pub fn search(&mut self, spec: &QuerySpec, key: &str, column: &str, joins: &[&str]) {
        if let Some(phrase) = spec.str(key) {
            self.add(&Condition::pattern(column, phrase), joins);
        }
    }

    /// String-array parameter matched case-insensitively.
    pub fn exact(&mut self, spec: &QuerySpec, key: &str, column: &str, joins: &[&str]) {
        let values = spec
            .strings(key)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        self.add(&Condition::exact(column, values), joins);
    }

    /// Boolean parameter choosing between two fragments.
    pub fn boolean(
        &mut self,
        spec: &QuerySpec,
        key: &str,
        when_true: &str,
        when_false: Option<&str>,
        joins: &[&str],
    ) {
        if let Some(value) = spec.bool(key) {
            let condition = Condition::Boolean {
                value,
                when_true: when_true.to_string(),
                when_false: when_false.map(str::to_string),
            };
            self.add(&condition, joins);
        }
    }

    /// Numeric range parameter.
    pub fn range(&mut self, spec: &QuerySpec, key: &str, column: &str, joins: &[&str]) {
        if let Some((min, max)) = spec.range(key) {
            let condition = Condition::Range {
                column: column.to_string(),
                min: min.clone(),
                max: max.clone(),
            };
            self.add(&condition, joins);
        }
    }

    /// Date range parameter.
    pub fn date(&mut self, spec: &QuerySpec, key: &str, column: &str, joins: &[&str]) {
        if let Some((min, max)) = spec.range(key) {
            let condition = Condition::Date {
                column: column.to_string(),
                min: min.as_str().map(str::to_string),
                max: max.as_str().map(str::to_string),
            };
            self.add(&condition, joins);
        }
    }

    /// Time range parameter.
    pub fn time(&mut self, spec: &QuerySpec, key: &str, column: &str) {
        if let Some((min, max)) = spec.range(key) {
            let condition = Condition::Time {
                column: column.to_string(),
                min: min.as_str().map(str::to_string),
                max: max.as_str().map(str::to_string),
            };
            self.add(&condition, &[]);
        }
    }

    /// Enum-array parameter.
    pub fn enums(
        &mut self,
        spec: &QuerySpec,
        key: &str,
        column: &str,
        allowed: &'static [&'static str],
        render: EnumRender,
    ) {
        let values = spec
            .strings(key)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        if !values.is_empty() {
            let condition = Condition::Enum {
                column: column.to_string(),
                values,
                allowed,
                render,
            };
            self.add(&condition, &[]);
        }
    }

    /// Enum range parameter expanded to every member between its bounds.
    ///
    /// A missing lower bound means the first member, a missing upper bound
    /// the same member as the lower one. Reversed bounds are swapped.
    pub fn enum_range(
        &mut self,
        spec: &QuerySpec,
        key: &str,
        column: &str,
        allowed: &'static [&'static str],
        render: EnumRender,
        joins: &[&str],
    ) {
        let Some((min, max)) = spec.range(key) else {
            return;
        };
        let position = |v: &Value| {
            v.as_str()
                .and_then(|s| allowed.iter().position(|a| *a == s))
        };
        let (a, b) = match (position(min), position(max)) {
            (None, None) => return,
            (Some(a), None) => (a, a),
            (None, Some(b)) => (0, b),
            (Some(a), Some(b)) => (a, b),
        };
        let (a, b) = if a > b { (b, a) } else { (a, b) };
        let condition = Condition::Enum {
            column: column.to_string(),
            values: allowed[a..=b].iter().map(|s| s.to_string()).collect(),
            allowed,
            render,
        };
        self.add(&condition, joins);
    }

    /// The usual `created_at`, `updated_at` and `users` parameters.
    pub fn owner_and_time_stamps(&mut self, spec: &QuerySpec) {
        let created = self.column("created_at");
        let updated = self.column("updated_at");
        let user = self.column("user_id");
        self.time(spec, "created_at", &created);
        self.time(spec, "updated_at", &updated);
        self.ids(spec, "users", &user, &[]);
    }

    /// Location filter on `table` (reached through `joins`): numeric values
    /// are location ids, anything else is matched against the free-text
    /// `where` column.
    pub fn locations(&mut self, spec: &QuerySpec, key: &str, table: &str, joins: &[&str]) {
        let values = spec.array(key);
        if values.is_empty() {
            return;
        }
        let dialect = self.dialect();
        let mut ids = Vec::new();
        let mut patterns = Vec::new();
        for value in values {
            match value.as_id() {
                Some(id) => ids.push(id),
                None => {
                    if let Some(text) = value.as_str() {
                        patterns.push(text);
                    }
                }
            }
        }

        let mut ors = Vec::new();
        if !ids.is_empty() {
            ors.push(render_id_set(
                &format!("{table}.location_id"),
                &ids,
                self.planner.limits(),
            ));
        }
        for text in patterns {
            ors.push(dialect.contains(&format!("{table}.`where`"), text, false));
        }
        if !ors.is_empty() {
            self.push(ors.join(" OR "), joins);
        }
    }

    /// Bounding box from the `north`/`south`/`east`/`west` parameters; all
    /// four must be present.
    pub fn bounding_box(&mut self, spec: &QuerySpec, target: GeoTarget, joins: &[&str]) {
        let (Some(north), Some(south), Some(east), Some(west)) = (
            spec.float("north"),
            spec.float("south"),
            spec.float("east"),
            spec.float("west"),
        ) else {
            return;
        };
        let condition = Condition::Geo {
            bbox: BoundingBox::new(north, south, east, west),
            target,
        };
        self.add(&condition, joins);
    }

    /// Nested query parameter compiled into `column IN (SELECT DISTINCT select ...)`.
    ///
    /// `joins` are added to the nested query to reach `select`.
    pub fn subquery(
        &mut self,
        spec: &QuerySpec,
        key: &str,
        column: &str,
        select: &str,
        joins: &[&str],
    ) -> Result<(), ConfigurationError> {
        let Some(Value::Map(params)) = spec.get(key) else {
            return Ok(());
        };
        let definition = self.planner.schema().definition(self.model);
        let Some(ParamKind::Query(model)) = definition.param(key).map(|decl| decl.kind) else {
            return Err(ConfigurationError::UndeclaredSubquery {
                model: self.model.as_str(),
                key: CompactString::from(key),
            });
        };

        let nested = QuerySpec::new(model, params.clone());
        let overrides = Overrides::new()
            .select(format!("DISTINCT {select}"))
            .join_path(joins)
            .without_order();
        let compiled = self.planner.compile(&nested, &overrides)?;
        self.push(format!("{column} IN ({})", compiled.to_sql()), &[]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(condition: &Condition) -> Vec<String> {
        condition.render(Dialect::MySQL, &Limits::default())
    }

    #[test]
    fn test_id_set_dedupes_and_caps() {
        let limits = Limits {
            max_id_set: 3,
            ..Limits::default()
        };
        assert_eq!(
            render_id_set("observations.id", &[5, 3, 5, 1], &limits),
            "observations.id IN (5,3,1)"
        );
        assert_eq!(
            render_id_set("observations.id", &[5, 3, 5, 1, 9, 2], &limits),
            "observations.id IN (5,3,1)"
        );
        assert_eq!(render_id_set("x", &[], &limits), FALSE_CONDITION);
    }

    #[test]
    fn test_range_bounds_optional() {
        let both = Condition::Range {
            column: "observations.vote_cache".into(),
            min: Value::Float(1.0),
            max: Value::Float(2.5),
        };
        assert_eq!(
            render(&both),
            vec!["observations.vote_cache >= 1.0", "observations.vote_cache <= 2.5"]
        );

        let neither = Condition::Range {
            column: "x".into(),
            min: Value::Null,
            max: Value::Null,
        };
        assert!(render(&neither).is_empty());
    }

    #[test]
    fn test_exact_match() {
        let one = Condition::exact("names.text_name", vec!["Amanita".into()]);
        assert_eq!(render(&one), vec!["LOWER(names.text_name) = 'amanita'"]);
        let two = Condition::exact("x", vec!["A".into(), "B".into()]);
        assert_eq!(render(&two), vec!["LOWER(x) IN ('a', 'b')"]);
    }

    #[test]
    fn test_enum_drops_unknown_values() {
        const ALLOWED: &[&str] = &["jpg", "gif", "png"];
        let condition = Condition::Enum {
            column: "images.format".into(),
            values: vec!["png".into(), "bmp".into(), "jpg".into()],
            allowed: ALLOWED,
            render: EnumRender::Quoted,
        };
        assert_eq!(render(&condition), vec!["images.format IN ('png','jpg')"]);

        let indexed = Condition::Enum {
            column: "c".into(),
            values: vec!["png".into(), "jpg".into()],
            allowed: ALLOWED,
            render: EnumRender::Indexed { first: 1 },
        };
        assert_eq!(render(&indexed), vec!["c IN (3,1)"]);

        let none = Condition::Enum {
            column: "c".into(),
            values: vec!["bmp".into()],
            allowed: ALLOWED,
            render: EnumRender::Quoted,
        };
        assert!(render(&none).is_empty());
    }

    #[test]
    fn test_date_year_bounds() {
        let condition = Condition::Date {
            column: "o.d".into(),
            min: Some("2020".into()),
            max: Some("2021-06".into()),
        };
        assert_eq!(
            render(&condition),
            vec!["o.d >= '2020-01-01'", "o.d <= '2021-06-31'"]
        );
    }

    #[test]
    fn test_date_season_wraps_year_end() {
        let condition = Condition::Date {
            column: "d".into(),
            min: Some("12-15".into()),
            max: Some("01-15".into()),
        };
        assert_eq!(
            render(&condition),
            vec![
                "MONTH(d) > 12 OR (MONTH(d) = 12 AND DAYOFMONTH(d) >= 15) OR \
                 MONTH(d) < 1 OR (MONTH(d) = 1 AND DAYOFMONTH(d) <= 15)"
            ]
        );

        let months = Condition::Date {
            column: "d".into(),
            min: Some("11".into()),
            max: Some("02".into()),
        };
        assert_eq!(render(&months), vec!["MONTH(d) >= 11 OR MONTH(d) <= 2"]);
    }

    #[test]
    fn test_date_season_wraps_with_mixed_precision() {
        let condition = Condition::Date {
            column: "d".into(),
            min: Some("12-15".into()),
            max: Some("02".into()),
        };
        assert_eq!(
            render(&condition),
            vec!["MONTH(d) > 12 OR (MONTH(d) = 12 AND DAYOFMONTH(d) >= 15) OR MONTH(d) <= 2"]
        );

        let condition = Condition::Date {
            column: "d".into(),
            min: Some("11".into()),
            max: Some("01-10".into()),
        };
        assert_eq!(
            render(&condition),
            vec!["MONTH(d) >= 11 OR MONTH(d) < 1 OR (MONTH(d) = 1 AND DAYOFMONTH(d) <= 10)"]
        );

        // same month, whole-month upper bound: no wrap
        let condition = Condition::Date {
            column: "d".into(),
            min: Some("03-20".into()),
            max: Some("03".into()),
        };
        assert_eq!(
            render(&condition),
            vec![
                "MONTH(d) > 3 OR (MONTH(d) = 3 AND DAYOFMONTH(d) >= 20)",
                "MONTH(d) <= 3"
            ]
        );
    }

    #[test]
    fn test_date_season_in_order() {
        let condition = Condition::Date {
            column: "d".into(),
            min: Some("03-01".into()),
            max: Some("05-15".into()),
        };
        assert_eq!(
            render(&condition),
            vec![
                "MONTH(d) > 3 OR (MONTH(d) = 3 AND DAYOFMONTH(d) >= 1)",
                "MONTH(d) < 5 OR (MONTH(d) = 5 AND DAYOFMONTH(d) <= 15)",
            ]
        );
    }

    #[test]
    fn test_date_months_wrap() {
        let condition = Condition::Date {
            column: "d".into(),
            min: Some("11".into()),
            max: Some("02".into()),
        };
        assert_eq!(render(&condition), vec!["MONTH(d) >= 11 OR MONTH(d) <= 2"]);
    }

    #[test]
    fn test_time_bounds() {
        let condition = Condition::Time {
            column: "t.created_at".into(),
            min: Some("2020-01-01 00:00:00".into()),
            max: None,
        };
        assert_eq!(render(&condition), vec!["t.created_at >= '2020-01-01 00:00:00'"]);
    }

    #[test]
    fn test_pattern_renders_one_fragment() {
        let condition = Condition::pattern("names.search_name", "Amanita -muscaria");
        assert_eq!(
            render(&condition),
            vec![
                "names.search_name LIKE '%Amanita%' AND names.search_name NOT LIKE '%muscaria%'"
            ]
        );
    }

    #[test]
    fn test_boolean() {
        let yes = Condition::Boolean {
            value: true,
            when_true: "a IS NOT NULL".into(),
            when_false: None,
        };
        let no = Condition::Boolean {
            value: false,
            when_true: "a IS NOT NULL".into(),
            when_false: None,
        };
        assert_eq!(render(&yes), vec!["a IS NOT NULL"]);
        assert!(render(&no).is_empty());
    }
}
