//! The planner: one value owning the registries a query is built against.

use std::fmt;

use compact_str::CompactString;

use crate::assemble::{self, CompiledQuery, Overrides};
use crate::coerce;
use crate::conditions::render_id_set;
use crate::dialect::Dialect;
use crate::error::{ConfigurationError, SerializationError, ValidationError};
use crate::join::JoinGraph;
use crate::limits::Limits;
use crate::model::Model;
use crate::order::OrderRegistry;
use crate::schema::{SchemaRegistry, StaticSchema};
use crate::serialize;
use crate::spec::QuerySpec;
use crate::validate::Validator;
use crate::value::Params;

/// Validates, compiles, serializes and coerces queries.
///
/// ```
/// use quarry_core::{params, Dialect, Limits, Model, Overrides, Planner};
///
/// let planner = Planner::new(Dialect::SQLite, Limits::default());
/// let spec = planner.construct(Model::Name, params! { "by" => "id" }).unwrap();
/// let sql = planner.compile(&spec, &Overrides::new()).unwrap().to_sql();
/// assert_eq!(sql, "SELECT DISTINCT names.id FROM `names` ORDER BY names.id ASC");
/// ```
pub struct Planner {
    schema: Box<dyn SchemaRegistry>,
    dialect: Dialect,
    limits: Limits,
    joins: JoinGraph,
    orders: OrderRegistry,
    validator: Validator,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(Dialect::default(), Limits::default())
    }
}

impl fmt::Debug for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("dialect", &self.dialect)
            .field("limits", &self.limits)
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

impl Planner {
    pub fn new(dialect: Dialect, limits: Limits) -> Self {
        Self {
            schema: Box::new(StaticSchema),
            dialect,
            limits,
            joins: JoinGraph::new(),
            orders: OrderRegistry::new(),
            validator: Validator::new(),
        }
    }

    /// Uses another source of model definitions.
    pub fn with_schema(mut self, schema: impl SchemaRegistry + 'static) -> Self {
        self.schema = Box::new(schema);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn schema(&self) -> &dyn SchemaRegistry {
        self.schema.as_ref()
    }

    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    pub const fn joins(&self) -> &JoinGraph {
        &self.joins
    }

    pub const fn orders(&self) -> &OrderRegistry {
        &self.orders
    }

    /// Validates raw parameters into a [`QuerySpec`].
    pub fn construct(&self, model: Model, raw: Params) -> Result<QuerySpec, ValidationError> {
        let params = self.validator.validate(self, model, raw)?;
        Ok(QuerySpec::new(model, params))
    }

    /// Like [`construct`](Self::construct), with the model given by name.
    pub fn construct_named(&self, model: &str, raw: Params) -> Result<QuerySpec, ValidationError> {
        self.construct(model.parse()?, raw)
    }

    pub fn compile(
        &self,
        spec: &QuerySpec,
        overrides: &Overrides,
    ) -> Result<CompiledQuery, ConfigurationError> {
        assemble::assemble(self, spec, overrides)
    }

    /// Selects each result id together with its letter column.
    pub fn compile_letters(&self, spec: &QuerySpec) -> Result<CompiledQuery, ConfigurationError> {
        let model = spec.model();
        let letter = self
            .schema
            .definition(model)
            .letter_column
            .ok_or(ConfigurationError::NoLetterColumn(model.as_str()))?;
        let overrides = Overrides::new()
            .select(format!(
                "DISTINCT {}, {}",
                self.schema.id_column(model),
                letter.column
            ))
            .join_path(letter.joins);
        self.compile(spec, &overrides)
    }

    /// Fetches whole rows for `ids`.
    pub fn hydrate_sql(&self, model: Model, ids: &[i64]) -> String {
        let table = self.schema.table_name(model);
        format!(
            "SELECT {table}.* FROM `{table}` WHERE {}",
            render_id_set(&self.schema.id_column(model), ids, &self.limits)
        )
    }

    /// Canonical text form, used as the persisted record key.
    pub fn serialize(&self, spec: &QuerySpec) -> String {
        serialize::serialize(spec)
    }

    pub fn deserialize(&self, description: &str) -> Result<QuerySpec, SerializationError> {
        let (model, params) = serialize::deserialize(description)?;
        Ok(self.construct(model, params)?)
    }

    /// Turns `spec` into a related query on `target`, when possible.
    pub fn coerce(
        &self,
        spec: &QuerySpec,
        target: Model,
    ) -> Result<Option<QuerySpec>, ValidationError> {
        coerce::coerce(self, spec, target)
    }

    /// Order keys valid for `model`.
    pub fn order_keys(&self, model: Model) -> Vec<&'static str> {
        self.orders
            .keys_for(model, self.schema.as_ref(), self.dialect)
    }

    /// Names of the parameters `model` accepts.
    pub fn param_names(&self, model: Model) -> Vec<CompactString> {
        self.schema
            .definition(model)
            .declarations()
            .map(|decl| CompactString::from(decl.name))
            .collect()
    }
}
