//! Order keys.
//!
//! Every `by` value names a handler in the [`OrderRegistry`]. A handler
//! returns the ORDER BY expression for a model, possibly adding joins, extra
//! where fragments, or a GROUP BY, or returns `None` when the key does not
//! apply to that model.

use std::sync::LazyLock;

use compact_str::CompactString;
use hashbrown::HashMap;
use regex::{Captures, Regex};

use crate::dialect::Dialect;
use crate::error::ConfigurationError;
use crate::join::JoinTree;
use crate::model::Model;
use crate::schema::SchemaRegistry;

static DIRECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s)(ASC|DESC)(,|$)").expect("valid regex"));

/// Flips every `ASC`/`DESC` that ends an order term.
///
/// ```
/// use quarry_core::order::reverse_order;
///
/// let order = "names.sort_name ASC, observations.id DESC";
/// assert_eq!(reverse_order(order), "names.sort_name DESC, observations.id ASC");
/// assert_eq!(reverse_order(&reverse_order(order)), order);
/// ```
pub fn reverse_order(order: &str) -> String {
    DIRECTION
        .replace_all(order, |caps: &Captures<'_>| {
            let flipped = if &caps[2] == "ASC" { "DESC" } else { "ASC" };
            format!("{}{flipped}{}", &caps[1], &caps[3])
        })
        .into_owned()
}

/// State a handler may read and extend
pub struct OrderContext<'a> {
    pub model: Model,
    pub table: &'static str,
    pub schema: &'a dyn SchemaRegistry,
    pub dialect: Dialect,
    pub joins: JoinTree,
    pub conditions: Vec<String>,
    pub group: Option<String>,
}

impl OrderContext<'_> {
    fn has_column(&self, column: &str) -> bool {
        self.schema.has_column(self.model, column)
    }

    fn join(&mut self, path: &[&str]) {
        self.joins.add_path(self.table, path);
    }

    /// `table.column DIR` when the model has the column
    fn column(&self, column: &str, direction: &str) -> Option<String> {
        self.has_column(column)
            .then(|| format!("{}.{} {direction}", self.table, quote_reserved(column)))
    }
}

/// Backticks around columns named after SQL keywords.
pub fn quote_reserved(column: &str) -> CompactString {
    match column {
        "when" | "where" => compact_str::format_compact!("`{column}`"),
        _ => CompactString::from(column),
    }
}

/// Resolved ordering for one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPlan {
    pub order: String,
    pub joins: JoinTree,
    pub conditions: Vec<String>,
    pub group: Option<String>,
}

type OrderHandler = fn(&mut OrderContext<'_>) -> Option<String>;

/// Map of order key to handler
#[derive(Clone)]
pub struct OrderRegistry {
    handlers: HashMap<&'static str, OrderHandler>,
}

impl Default for OrderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys = self.handlers.keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("OrderRegistry").field("keys", &keys).finish()
    }
}

impl OrderRegistry {
    pub fn new() -> Self {
        let entries: &[(&'static str, OrderHandler)] = &[
            ("accession_number", |c| c.column("accession_number", "ASC")),
            ("code", sort_by_code),
            ("code_then_name", sort_by_code_then_name),
            ("confidence", sort_by_confidence),
            ("contribution", |c| {
                (c.model == Model::User).then(|| "users.contribution DESC".to_string())
            }),
            ("copyright_holder", |c| c.column("copyright_holder", "ASC")),
            ("created_at", |c| c.column("created_at", "DESC")),
            ("date", |c| {
                c.column("when", "DESC")
                    .or_else(|| c.column("created_at", "DESC"))
            }),
            ("herbarium_label", sort_by_herbarium_label),
            ("herbarium_name", sort_by_herbarium_name),
            ("id", |c| Some(format!("{}.id ASC", c.table))),
            ("image_quality", |c| {
                (c.model == Model::Image).then(|| "images.vote_cache DESC".to_string())
            }),
            ("initial_det", |c| c.column("initial_det", "ASC")),
            ("last_login", |c| c.column("last_login", "DESC")),
            ("location", sort_by_location),
            ("login", |c| c.column("login", "ASC")),
            ("name", sort_by_name),
            ("num_views", |c| c.column("num_views", "DESC")),
            ("observation", |c| c.column("observation_id", "DESC")),
            ("original_name", |c| {
                (c.model == Model::Image).then(|| "images.original_name ASC".to_string())
            }),
            ("owners_quality", sort_by_owners_quality),
            ("records", sort_by_records),
            ("rss_log", sort_by_rss_log),
            ("summary", |c| c.column("summary", "ASC")),
            ("thumbnail_quality", sort_by_thumbnail_quality),
            ("title", |c| c.column("title", "ASC")),
            ("updated_at", |c| c.column("updated_at", "DESC")),
            ("user", sort_by_user),
            ("where", |c| c.column("where", "ASC")),
        ];
        Self {
            handlers: entries.iter().copied().collect(),
        }
    }

    pub fn contains(&self, by: &str) -> bool {
        self.handlers.contains_key(by)
    }

    /// Keys that apply to `model`, sorted.
    pub fn keys_for(&self, model: Model, schema: &dyn SchemaRegistry, dialect: Dialect) -> Vec<&'static str> {
        let mut keys = self
            .handlers
            .keys()
            .copied()
            .filter(|by| self.resolve(model, by, schema, dialect).is_ok())
            .collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }

    /// Runs the handler for `by` (without any `reverse_` prefix).
    pub fn resolve(
        &self,
        model: Model,
        by: &str,
        schema: &dyn SchemaRegistry,
        dialect: Dialect,
    ) -> Result<OrderPlan, ConfigurationError> {
        let unknown = || ConfigurationError::UnknownOrder {
            model: model.as_str(),
            by: CompactString::from(by),
        };
        let handler = self.handlers.get(by).ok_or_else(unknown)?;
        let mut context = OrderContext {
            model,
            table: schema.table_name(model),
            schema,
            dialect,
            joins: JoinTree::new(),
            conditions: Vec::new(),
            group: None,
        };
        let order = handler(&mut context).ok_or_else(unknown)?;
        Ok(OrderPlan {
            order,
            joins: context.joins,
            conditions: context.conditions,
            group: context.group,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn sort_by_code(c: &mut OrderContext<'_>) -> Option<String> {
    if c.model != Model::Herbarium {
        return None;
    }
    c.conditions.push("herbaria.code != ''".to_string());
    Some("herbaria.code ASC".to_string())
}

fn sort_by_code_then_name(c: &mut OrderContext<'_>) -> Option<String> {
    (c.model == Model::Herbarium).then(|| {
        "CASE WHEN herbaria.code = '' THEN '~' ELSE herbaria.code END ASC, herbaria.name ASC"
            .to_string()
    })
}

fn sort_by_confidence(c: &mut OrderContext<'_>) -> Option<String> {
    match c.model {
        Model::Image => {
            c.join(&["observation_images", "observations"]);
            Some("observations.vote_cache DESC".to_string())
        }
        Model::Observation => Some("observations.vote_cache DESC".to_string()),
        _ => None,
    }
}

fn sort_by_herbarium_label(c: &mut OrderContext<'_>) -> Option<String> {
    (c.model == Model::HerbariumRecord).then(|| {
        "herbarium_records.initial_det ASC, herbarium_records.accession_number ASC".to_string()
    })
}

fn sort_by_herbarium_name(c: &mut OrderContext<'_>) -> Option<String> {
    match c.model {
        Model::Herbarium => Some("herbaria.name ASC".to_string()),
        Model::HerbariumRecord => {
            c.join(&["herbaria"]);
            Some("herbaria.name ASC".to_string())
        }
        _ => None,
    }
}

fn sort_by_location(c: &mut OrderContext<'_>) -> Option<String> {
    if !c.has_column("location_id") {
        return None;
    }
    // users without a location still sort
    if c.model == Model::User {
        c.join(&["locations!"]);
    } else {
        c.join(&["locations"]);
    }
    Some("locations.name ASC".to_string())
}

fn sort_by_name(c: &mut OrderContext<'_>) -> Option<String> {
    match c.model {
        Model::Image => {
            c.join(&["observation_images", "observations", "names"]);
            c.group = Some("images.id".to_string());
            Some("MIN(names.sort_name) ASC, images.`when` DESC".to_string())
        }
        Model::Observation => {
            c.join(&["names"]);
            Some("names.sort_name ASC, observations.`when` DESC".to_string())
        }
        Model::Name => Some("names.sort_name ASC".to_string()),
        Model::Location => Some("locations.name ASC".to_string()),
        _ => c.column("name", "ASC").or_else(|| c.column("title", "ASC")),
    }
}

fn sort_by_owners_quality(c: &mut OrderContext<'_>) -> Option<String> {
    if c.model != Model::Image {
        return None;
    }
    c.join(&["image_votes"]);
    c.conditions
        .push("image_votes.user_id = images.user_id".to_string());
    Some("image_votes.value DESC".to_string())
}

fn sort_by_records(c: &mut OrderContext<'_>) -> Option<String> {
    if c.model != Model::Herbarium {
        return None;
    }
    // herbaria without records still sort
    c.join(&["herbarium_records!"]);
    c.group = Some("herbaria.id".to_string());
    Some("COUNT(herbarium_records.id) DESC".to_string())
}

fn sort_by_rss_log(c: &mut OrderContext<'_>) -> Option<String> {
    if !c.has_column("rss_log_id") {
        return None;
    }
    if let Some(order) = c.column("log_updated_at", "DESC") {
        return Some(order);
    }
    c.join(&["rss_logs"]);
    Some("rss_logs.updated_at DESC".to_string())
}

fn sort_by_thumbnail_quality(c: &mut OrderContext<'_>) -> Option<String> {
    if c.model != Model::Observation {
        return None;
    }
    c.join(&["images.thumb_image"]);
    Some("images.vote_cache DESC, observations.vote_cache DESC".to_string())
}

fn sort_by_user(c: &mut OrderContext<'_>) -> Option<String> {
    if c.model != Model::User {
        if !c.has_column("user_id") {
            return None;
        }
        c.join(&["users"]);
    }
    Some(
        "CASE WHEN users.name = '' OR users.name IS NULL THEN users.login ELSE users.name END ASC"
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::JoinGraph;
    use crate::schema::StaticSchema;

    fn resolve(model: Model, by: &str) -> Result<OrderPlan, ConfigurationError> {
        OrderRegistry::new().resolve(model, by, &StaticSchema, Dialect::SQLite)
    }

    #[test]
    fn test_reverse_is_involutive() {
        for order in [
            "names.sort_name ASC",
            "MIN(names.sort_name) ASC, images.`when` DESC",
            "CASE WHEN herbaria.code = '' THEN '~' ELSE herbaria.code END ASC, herbaria.name ASC",
            "",
        ] {
            assert_eq!(reverse_order(&reverse_order(order)), order);
        }
        assert_eq!(
            reverse_order("a.b ASC, c.d DESC"),
            "a.b DESC, c.d ASC"
        );
    }

    #[test]
    fn test_column_handlers_check_the_model() {
        assert_eq!(
            resolve(Model::User, "login").unwrap().order,
            "users.login ASC"
        );
        assert!(matches!(
            resolve(Model::Name, "login"),
            Err(ConfigurationError::UnknownOrder { by, .. }) if by == "login"
        ));
    }

    #[test]
    fn test_unknown_key() {
        assert!(resolve(Model::Name, "flavor").is_err());
    }

    #[test]
    fn test_date_falls_back_to_created_at() {
        assert_eq!(
            resolve(Model::Observation, "date").unwrap().order,
            "observations.`when` DESC"
        );
        assert_eq!(
            resolve(Model::Name, "date").unwrap().order,
            "names.created_at DESC"
        );
    }

    #[test]
    fn test_name_on_images_groups() {
        let plan = resolve(Model::Image, "name").unwrap();
        assert_eq!(plan.group.as_deref(), Some("images.id"));
        let joins = JoinGraph::new()
            .resolve_tree("images", &plan.joins)
            .unwrap();
        assert_eq!(joins.len(), 3);
        assert_eq!(joins[2].table, "names");
    }

    #[test]
    fn test_records_outer_joins() {
        let plan = resolve(Model::Herbarium, "records").unwrap();
        assert_eq!(plan.order, "COUNT(herbarium_records.id) DESC");
        assert!(plan.joins.nodes()[0].is_outer());
    }

    #[test]
    fn test_code_adds_condition() {
        let plan = resolve(Model::Herbarium, "code").unwrap();
        assert_eq!(plan.conditions, vec!["herbaria.code != ''"]);
    }

    #[test]
    fn test_every_default_order_resolves() {
        for model in Model::ALL {
            let by = StaticSchema.definition(model).default_order;
            assert!(resolve(model, by).is_ok(), "{model} cannot sort by {by}");
        }
    }
}
