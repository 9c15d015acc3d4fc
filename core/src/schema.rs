//! Schema registry: tables, columns and per-model definitions.

use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, UNIVERSAL};
use crate::spec::QuerySpec;

/// Adds a model's filter conditions for a validated spec.
pub type BuildFn = fn(&QuerySpec, &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError>;

/// Column whose first letter groups results for letter pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterColumn {
    pub column: &'static str,
    /// Join path from the model's table needed to reach `column`
    pub joins: &'static [&'static str],
}

/// Everything the planner knows about one model
#[derive(Clone, Copy)]
pub struct ModelDef {
    pub model: Model,
    pub columns: &'static [&'static str],
    pub params: &'static [ParamDeclaration],
    pub build: BuildFn,
    /// Order key used when the caller gives no `by`
    pub default_order: &'static str,
    pub letter_column: Option<LetterColumn>,
}

impl ModelDef {
    /// Model-specific declarations followed by the universal ones.
    pub fn declarations(&self) -> impl Iterator<Item = &ParamDeclaration> {
        self.params.iter().chain(UNIVERSAL.iter())
    }

    pub fn param(&self, name: &str) -> Option<&ParamDeclaration> {
        self.declarations().find(|decl| decl.name == name)
    }
}

impl std::fmt::Debug for ModelDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDef")
            .field("model", &self.model)
            .field("columns", &self.columns)
            .field("params", &self.params.len())
            .field("default_order", &self.default_order)
            .field("letter_column", &self.letter_column)
            .finish()
    }
}

/// Source of table and column names per model
pub trait SchemaRegistry {
    fn definition(&self, model: Model) -> &ModelDef;

    fn table_name(&self, model: Model) -> &'static str {
        self.definition(model).model.table()
    }

    fn columns(&self, model: Model) -> &[&'static str] {
        self.definition(model).columns
    }

    fn has_column(&self, model: Model, column: &str) -> bool {
        self.columns(model).contains(&column)
    }

    fn id_column(&self, model: Model) -> String {
        format!("{}.id", self.table_name(model))
    }
}

/// The compiled-in catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSchema;

impl SchemaRegistry for StaticSchema {
    fn definition(&self, model: Model) -> &ModelDef {
        crate::models::definition(model)
    }
}
