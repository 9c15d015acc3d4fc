//! Parameter validation.
//!
//! Raw caller parameters are checked against a model's declarations. Each
//! declared key is taken out of the raw map and coerced by the handler
//! registered for its [`TypeTag`]; whatever is left over afterwards is
//! rejected. Validation is idempotent: validating an already validated map
//! gives the same map back.

use compact_str::{CompactString, ToCompactString};
use hashbrown::HashMap;

use crate::datetime::{self, Bound, PartialDate};
use crate::error::ValidationError;
use crate::model::Model;
use crate::params::{ParamKind, TypeTag, Wrapper};
use crate::planner::Planner;
use crate::quarry_trace_truncate;
use crate::schema::SchemaRegistry;
use crate::value::{Params, Value};

/// The declaration being validated
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub model: Model,
    pub key: &'a str,
    pub kind: ParamKind,
    /// Which end of a range the value is, for partial dates and times
    pub bound: Bound,
}

impl Field<'_> {
    fn mismatch(&self, value: &Value) -> ValidationError {
        ValidationError::TypeMismatch {
            model: self.model.as_str(),
            key: CompactString::from(self.key),
            expected: self.kind.expected(),
            got: value.to_string(),
        }
    }

    fn at(self, bound: Bound) -> Self {
        Self { bound, ..self }
    }
}

/// Coerces one non-blank value to the field's type.
pub type Handler = fn(&Planner, &Field<'_>, Value) -> Result<Value, ValidationError>;

/// Type-tag to handler registry
#[derive(Clone)]
pub struct Validator {
    handlers: HashMap<TypeTag, Handler>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Validator {
    pub fn new() -> Self {
        let entries: [(TypeTag, Handler); 10] = [
            (TypeTag::Bool, validate_bool),
            (TypeTag::Int, validate_int),
            (TypeTag::Float, validate_float),
            (TypeTag::String, validate_string),
            (TypeTag::Date, validate_date),
            (TypeTag::Time, validate_time),
            (TypeTag::Id, validate_id),
            (TypeTag::Record, validate_record),
            (TypeTag::Enum, validate_enum),
            (TypeTag::Query, validate_query),
        ];
        Self {
            handlers: entries.into_iter().collect(),
        }
    }

    /// Replaces the handler for one type.
    pub fn register(&mut self, tag: TypeTag, handler: Handler) {
        self.handlers.insert(tag, handler);
    }

    /// Validates `raw` against the declarations of `model`.
    pub fn validate(
        &self,
        planner: &Planner,
        model: Model,
        raw: Params,
    ) -> Result<Params, ValidationError> {
        let definition = planner.schema().definition(model);
        let mut raw = normalize_keys(raw);
        let mut validated = Params::new();

        for decl in definition.declarations() {
            let value = raw.remove(decl.name).unwrap_or_default();
            let field = Field {
                model,
                key: decl.name,
                kind: decl.kind,
                bound: Bound::Exact,
            };
            let value = match decl.wrapper {
                Wrapper::Scalar => self.scalar(planner, &field, value)?,
                Wrapper::Array => self.array(planner, &field, value)?,
                Wrapper::Range => self.range(planner, &field, value)?,
            };
            match value {
                Some(value) => {
                    validated.insert(CompactString::from(decl.name), value);
                }
                None if decl.required => {
                    return Err(ValidationError::MissingParameter {
                        model: model.as_str(),
                        key: CompactString::from(decl.name),
                    });
                }
                None => {}
            }
        }

        if !raw.is_empty() {
            return Err(ValidationError::UnexpectedParameter {
                model: model.as_str(),
                keys: raw.into_keys().collect(),
            });
        }

        if let Some(by) = validated.get_mut("by") {
            *by = validate_order(planner, model, by)?;
        }
        Ok(validated)
    }

    fn coerce(
        &self,
        planner: &Planner,
        field: &Field<'_>,
        value: Value,
    ) -> Result<Value, ValidationError> {
        match self.handlers.get(&field.kind.tag()) {
            Some(handler) => handler(planner, field, value),
            None => Err(field.mismatch(&value)),
        }
    }

    fn scalar(
        &self,
        planner: &Planner,
        field: &Field<'_>,
        value: Value,
    ) -> Result<Option<Value>, ValidationError> {
        match value {
            value if value.is_blank() => Ok(None),
            Value::Array(_) => Err(field.mismatch(&value)),
            value => self.coerce(planner, field, value).map(Some),
        }
    }

    fn array(
        &self,
        planner: &Planner,
        field: &Field<'_>,
        value: Value,
    ) -> Result<Option<Value>, ValidationError> {
        let mut items = match value {
            Value::Array(items) => items,
            value if value.is_blank() => return Ok(None),
            value => vec![value],
        };
        let max = planner.limits().max_array;
        if items.len() > max {
            quarry_trace_truncate!("max_array", field.key, items.len(), max);
            items.truncate(max);
        }

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if item.is_blank() {
                continue;
            }
            let item = self.coerce(planner, field, item)?;
            if matches!(field.kind.tag(), TypeTag::Id | TypeTag::Record) && out.contains(&item) {
                continue;
            }
            out.push(item);
        }
        Ok((!out.is_empty()).then_some(Value::Array(out)))
    }

    fn range(
        &self,
        planner: &Planner,
        field: &Field<'_>,
        value: Value,
    ) -> Result<Option<Value>, ValidationError> {
        let (min, max) = match value {
            Value::Array(items) if items.len() > 2 => {
                return Err(field.mismatch(&Value::Array(items)));
            }
            Value::Array(mut items) => {
                let max = items.pop().unwrap_or_default();
                // a single element is both ends
                let min = items.pop().unwrap_or_else(|| max.clone());
                (min, max)
            }
            value if value.is_blank() => return Ok(None),
            value => (value.clone(), value),
        };

        let min = self.scalar(planner, &field.at(Bound::Lower), min)?;
        let max = self.scalar(planner, &field.at(Bound::Upper), max)?;
        if min.is_none() && max.is_none() {
            return Ok(None);
        }
        Ok(Some(Value::range(min, max)))
    }
}

/// Accepts `:key` for `key`; the plain form wins when both are given.
fn normalize_keys(raw: Params) -> Params {
    let mut out = Params::new();
    let mut prefixed = Vec::new();
    for (key, value) in raw {
        match key.strip_prefix(':') {
            Some(plain) => prefixed.push((CompactString::from(plain), value)),
            None => {
                out.insert(key, value);
            }
        }
    }
    for (key, value) in prefixed {
        out.entry(key).or_insert(value);
    }
    out
}

fn validate_order(planner: &Planner, model: Model, by: &Value) -> Result<Value, ValidationError> {
    let text = by.as_str().unwrap_or_default();
    let key = text.strip_prefix("reverse_").unwrap_or(text);
    planner
        .orders()
        .resolve(model, key, planner.schema(), planner.dialect())
        .map(|_| Value::symbol(text))
        .map_err(|_| ValidationError::TypeMismatch {
            model: model.as_str(),
            key: CompactString::from("by"),
            expected: "a known order key",
            got: by.to_string(),
        })
}

// =============================================================================
// Handlers
// =============================================================================

fn validate_bool(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    let parsed = match &value {
        Value::Bool(b) => Some(*b),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        Value::String(s) | Value::Symbol(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.map(Value::Bool).ok_or_else(|| field.mismatch(&value))
}

fn validate_int(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    let parsed = match &value {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.map(Value::Int).ok_or_else(|| field.mismatch(&value))
}

fn validate_float(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    let parsed = match &value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .map(Value::Float)
        .ok_or_else(|| field.mismatch(&value))
}

fn validate_string(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    match value {
        Value::String(s) | Value::Symbol(s) => Ok(Value::String(s)),
        Value::Int(i) => Ok(Value::String(i.to_compact_string())),
        Value::Float(f) => Ok(Value::String(compact_str::format_compact!("{f:?}"))),
        value => Err(field.mismatch(&value)),
    }
}

fn validate_date(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    let date = match &value {
        Value::String(s) | Value::Symbol(s) => PartialDate::parse(s),
        Value::Int(year) => PartialDate::parse(&year.to_string()),
        _ => None,
    };
    date.map(|date| Value::String(date.normalize(field.bound).into()))
        .ok_or_else(|| field.mismatch(&value))
}

fn validate_time(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    let fields = match &value {
        Value::String(s) | Value::Symbol(s) => datetime::parse_time(s),
        Value::Int(year) => datetime::parse_time(&year.to_string()),
        _ => None,
    };
    fields
        .map(|fields| Value::String(datetime::normalize_time(&fields, field.bound).into()))
        .ok_or_else(|| field.mismatch(&value))
}

fn validate_id(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    let id = match &value {
        Value::Bool(_) => None,
        other => other.as_id(),
    };
    id.filter(|id| *id > 0)
        .map(Value::Int)
        .ok_or_else(|| field.mismatch(&value))
}

/// An id, or a name to look the row up by when the query runs. A user may
/// be given as `login <Full Name>`.
fn validate_record(
    planner: &Planner,
    field: &Field<'_>,
    value: Value,
) -> Result<Value, ValidationError> {
    let ParamKind::Record(model) = field.kind else {
        return Err(field.mismatch(&value));
    };
    if let Ok(id) = validate_id(planner, field, value.clone()) {
        return Ok(id);
    }
    let name = match value.as_str().map(str::trim) {
        Some(name) if model == Model::User => name.split(" <").next().unwrap_or(name).trim(),
        Some(name) => name,
        None => return Err(field.mismatch(&value)),
    };
    if name.is_empty() || name.parse::<i64>().is_ok() || model.lookup_columns().is_empty() {
        return Err(field.mismatch(&value));
    }
    Ok(Value::String(name.into()))
}

fn validate_enum(_: &Planner, field: &Field<'_>, value: Value) -> Result<Value, ValidationError> {
    let ParamKind::Enum(allowed) = field.kind else {
        return Err(field.mismatch(&value));
    };
    let member = value.as_str().and_then(|s| {
        let s = s.trim();
        allowed
            .iter()
            .find(|a| **a == s)
            .or_else(|| {
                let lower = s.to_lowercase();
                allowed.iter().find(|a| **a == lower)
            })
    });
    member
        .map(|m| Value::symbol(*m))
        .ok_or_else(|| field.mismatch(&value))
}

fn validate_query(
    planner: &Planner,
    field: &Field<'_>,
    value: Value,
) -> Result<Value, ValidationError> {
    let ParamKind::Query(model) = field.kind else {
        return Err(field.mismatch(&value));
    };
    match value {
        Value::Map(params) => {
            let spec = planner.construct(model, params)?;
            Ok(Value::Map(spec.into_params()))
        }
        value => Err(field.mismatch(&value)),
    }
}
