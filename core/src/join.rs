//! Join graph and join path resolution.
//!
//! Relations between the tables of the fixed schema are declared once in
//! [`RELATIONS`], always on the side holding the foreign key. Resolving a hop
//! looks up the forward relation first and falls back to the reverse one.
//!
//! Join targets are written as tokens: `table`, optionally followed by
//! `.qualifier` to pick one of several relations between the same two tables,
//! optionally followed by `!` for a LEFT OUTER JOIN.

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use heck::ToUpperCamelCase;
use smallvec::SmallVec;

use crate::error::ConfigurationError;
use crate::model::Model;

// =============================================================================
// Join Type
// =============================================================================

/// The type of JOIN operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Join,
    Left,
}

/// JOIN keyword builder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Join {
    pub join_type: JoinType,
    pub outer: bool, // only meaningful for LEFT
}

impl Join {
    /// Creates a new Join with default settings (basic JOIN)
    pub const fn new() -> Self {
        Self {
            join_type: JoinType::Join,
            outer: false,
        }
    }

    /// Makes this a LEFT join
    pub const fn left(mut self) -> Self {
        self.join_type = JoinType::Left;
        self
    }

    /// Makes this an OUTER join
    pub const fn outer(mut self) -> Self {
        self.outer = true;
        self
    }

    pub const fn as_str(&self) -> &'static str {
        match (self.join_type, self.outer) {
            (JoinType::Join, _) => "JOIN",
            (JoinType::Left, false) => "LEFT JOIN",
            (JoinType::Left, true) => "LEFT OUTER JOIN",
        }
    }
}

// =============================================================================
// Relation registry
// =============================================================================

/// How the source table of a relation points at its target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinColumn {
    /// `source.col = target.id`
    Fk(&'static str),
    /// `source.col1 = target.col2`
    Pair(&'static str, &'static str),
    /// `source.col_id = target.id AND source.col_type = 'Target'`
    Polymorphic(&'static str),
}

/// `(source table, target token, column)`, source holds the foreign key.
pub const RELATIONS: &[(&str, &str, JoinColumn)] = &[
    ("comments", "locations", JoinColumn::Polymorphic("target")),
    ("comments", "names", JoinColumn::Polymorphic("target")),
    ("comments", "observations", JoinColumn::Polymorphic("target")),
    ("comments", "projects", JoinColumn::Polymorphic("target")),
    ("comments", "species_lists", JoinColumn::Polymorphic("target")),
    ("comments", "users", JoinColumn::Fk("user_id")),
    ("herbaria", "locations", JoinColumn::Fk("location_id")),
    ("herbaria", "users", JoinColumn::Fk("personal_user_id")),
    ("herbarium_records", "herbaria", JoinColumn::Fk("herbarium_id")),
    ("herbarium_records", "users", JoinColumn::Fk("user_id")),
    ("image_votes", "images", JoinColumn::Fk("image_id")),
    ("image_votes", "users", JoinColumn::Fk("user_id")),
    ("images", "users", JoinColumn::Fk("user_id")),
    ("locations", "rss_logs", JoinColumn::Fk("rss_log_id")),
    ("locations", "users", JoinColumn::Fk("user_id")),
    ("names", "rss_logs", JoinColumn::Fk("rss_log_id")),
    ("names", "users", JoinColumn::Fk("user_id")),
    ("namings", "names", JoinColumn::Fk("name_id")),
    ("namings", "observations", JoinColumn::Fk("observation_id")),
    ("namings", "users", JoinColumn::Fk("user_id")),
    ("observation_herbarium_records", "herbarium_records", JoinColumn::Fk("herbarium_record_id")),
    ("observation_herbarium_records", "observations", JoinColumn::Fk("observation_id")),
    ("observation_images", "images", JoinColumn::Fk("image_id")),
    ("observation_images", "observations", JoinColumn::Fk("observation_id")),
    ("observations", "image_votes.thumb_image", JoinColumn::Pair("thumb_image_id", "image_id")),
    ("observations", "images.thumb_image", JoinColumn::Fk("thumb_image_id")),
    ("observations", "locations", JoinColumn::Fk("location_id")),
    ("observations", "names", JoinColumn::Fk("name_id")),
    ("observations", "rss_logs", JoinColumn::Fk("rss_log_id")),
    ("observations", "users", JoinColumn::Fk("user_id")),
    ("project_observations", "observations", JoinColumn::Fk("observation_id")),
    ("project_observations", "projects", JoinColumn::Fk("project_id")),
    ("project_species_lists", "projects", JoinColumn::Fk("project_id")),
    ("project_species_lists", "species_lists", JoinColumn::Fk("species_list_id")),
    ("projects", "rss_logs", JoinColumn::Fk("rss_log_id")),
    ("projects", "users", JoinColumn::Fk("user_id")),
    ("rss_logs", "locations", JoinColumn::Fk("location_id")),
    ("rss_logs", "names", JoinColumn::Fk("name_id")),
    ("rss_logs", "observations", JoinColumn::Fk("observation_id")),
    ("rss_logs", "species_lists", JoinColumn::Fk("species_list_id")),
    ("sequences", "observations", JoinColumn::Fk("observation_id")),
    ("sequences", "users", JoinColumn::Fk("user_id")),
    ("species_list_observations", "observations", JoinColumn::Fk("observation_id")),
    ("species_list_observations", "species_lists", JoinColumn::Fk("species_list_id")),
    ("species_lists", "locations", JoinColumn::Fk("location_id")),
    ("species_lists", "rss_logs", JoinColumn::Fk("rss_log_id")),
    ("species_lists", "users", JoinColumn::Fk("user_id")),
    ("users", "images", JoinColumn::Fk("image_id")),
    ("users", "locations", JoinColumn::Fk("location_id")),
];

/// Every table a join token may name
pub fn is_known_table(table: &str) -> bool {
    RELATIONS
        .iter()
        .any(|(from, to, _)| *from == table || strip_qualifier(to) == table)
}

fn strip_qualifier(token: &str) -> &str {
    token.split_once('.').map_or(token, |(table, _)| table)
}

/// Literal stored in a polymorphic `*_type` column for rows of `table`.
fn polymorphic_type(table: &str) -> String {
    match Model::from_table(table) {
        Some(model) => model.as_str().to_string(),
        None => {
            let singular = table
                .strip_suffix("ies")
                .map(|stem| format!("{stem}y"))
                .or_else(|| table.strip_suffix('s').map(str::to_string))
                .unwrap_or_else(|| table.to_string());
            singular.to_upper_camel_case()
        }
    }
}

// =============================================================================
// Join path
// =============================================================================

/// A requested join hop: the already-joined table and the target token
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JoinNode {
    pub from: CompactString,
    pub to: CompactString,
}

impl JoinNode {
    pub fn table(&self) -> &str {
        strip_qualifier(self.to.trim_end_matches('!'))
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.to
            .trim_end_matches('!')
            .split_once('.')
            .map(|(_, qualifier)| qualifier)
    }

    pub fn is_outer(&self) -> bool {
        self.to.ends_with('!')
    }
}

/// Ordered set of join hops, all rooted at the query's table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinTree {
    nodes: Vec<JoinNode>,
}

impl JoinTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the chain `root -> path[0] -> path[1] -> ...`.
    pub fn add_path(&mut self, root: &str, path: &[&str]) {
        let mut from = root;
        for to in path {
            let node = JoinNode {
                from: CompactString::from(from),
                to: CompactString::from(*to),
            };
            if !self.nodes.contains(&node) {
                self.nodes.push(node);
            }
            from = *to;
        }
    }

    pub fn extend(&mut self, other: &JoinTree) {
        for node in &other.nodes {
            if !self.nodes.contains(node) {
                self.nodes.push(node.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[JoinNode] {
        &self.nodes
    }
}

/// A rendered `JOIN ... ON ...` clause
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinClause {
    pub join: Join,
    pub table: CompactString,
    pub on: String,
}

impl std::fmt::Display for JoinClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} `{}` ON {}", self.join.as_str(), self.table, self.on)
    }
}

// =============================================================================
// Join graph
// =============================================================================

/// Static relation registry indexed for lookup
#[derive(Debug, Clone)]
pub struct JoinGraph {
    relations: HashMap<&'static str, HashMap<&'static str, JoinColumn>>,
}

impl Default for JoinGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinGraph {
    pub fn new() -> Self {
        let mut relations: HashMap<&'static str, HashMap<&'static str, JoinColumn>> =
            HashMap::new();
        for (from, to, col) in RELATIONS {
            relations.entry(*from).or_default().insert(*to, *col);
        }
        Self { relations }
    }

    fn lookup(&self, from: &str, to: &str) -> Option<JoinColumn> {
        self.relations.get(from)?.get(to).copied()
    }

    /// Renders one hop, or `None` when the target was already joined.
    ///
    /// `done` holds target tokens (qualifier kept, outer marker dropped).
    pub fn resolve(
        &self,
        node: &JoinNode,
        done: &mut HashSet<CompactString>,
    ) -> Result<Option<JoinClause>, ConfigurationError> {
        let from = strip_qualifier(&node.from).trim_end_matches('!');
        let token = node.to.trim_end_matches('!');
        if done.contains(token) {
            return Ok(None);
        }

        let target = strip_qualifier(token);
        let from_qualified = format!("{from}.{}", node.qualifier().unwrap_or_default());
        let (source, dest, col) = if let Some(col) = self.lookup(from, token) {
            (from, target, col)
        } else if let Some(col) = self
            .lookup(target, &from_qualified)
            .or_else(|| self.lookup(target, from))
        {
            (target, from, col)
        } else {
            return Err(ConfigurationError::UnknownJoin {
                from: CompactString::from(from),
                to: CompactString::from(token),
            });
        };

        let on = match col {
            JoinColumn::Fk(col) => format!("{source}.{col} = {dest}.id"),
            JoinColumn::Pair(col1, col2) => format!("{source}.{col1} = {dest}.{col2}"),
            JoinColumn::Polymorphic(col) => format!(
                "{source}.{col}_id = {dest}.id AND {source}.{col}_type = '{}'",
                polymorphic_type(dest)
            ),
        };

        done.insert(CompactString::from(token));
        let join = if node.is_outer() {
            Join::new().left().outer()
        } else {
            Join::new()
        };
        Ok(Some(JoinClause {
            join,
            table: CompactString::from(target),
            on,
        }))
    }

    /// Renders every hop of `tree`, skipping targets already joined (including `root`).
    pub fn resolve_tree(
        &self,
        root: &str,
        tree: &JoinTree,
    ) -> Result<SmallVec<[JoinClause; 4]>, ConfigurationError> {
        let mut done = HashSet::new();
        done.insert(CompactString::from(root));
        let mut clauses = SmallVec::new();
        for node in tree.nodes() {
            if let Some(clause) = self.resolve(node, &mut done)? {
                clauses.push(clause);
            }
        }
        Ok(clauses)
    }
}
