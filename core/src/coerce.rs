//! Turning a query on one model into a related query on another.

use compact_str::CompactString;

use crate::error::ValidationError;
use crate::model::Model;
use crate::planner::Planner;
use crate::spec::QuerySpec;
use crate::value::{Params, Value};

/// `(target, source)`: a `target` query can wrap a `source` query under
/// `source.subquery_key()`.
pub const RELATED: &[(Model, Model)] = &[
    (Model::Image, Model::Observation),
    (Model::Location, Model::Observation),
    (Model::Name, Model::Observation),
    (Model::Sequence, Model::Observation),
    (Model::HerbariumRecord, Model::Observation),
    (Model::Observation, Model::Image),
    (Model::Observation, Model::Location),
    (Model::Observation, Model::Name),
    (Model::Observation, Model::Sequence),
    (Model::Observation, Model::HerbariumRecord),
];

pub fn is_related(target: Model, source: Model) -> bool {
    RELATED.contains(&(target, source))
}

/// The query to run on `target` given `spec`, or `None` when the two models
/// are unrelated.
///
/// A nested query already aimed at `target` is reused rather than wrapped
/// again, so repeated coercion back and forth does not keep nesting.
pub(crate) fn coerce(
    planner: &Planner,
    spec: &QuerySpec,
    target: Model,
) -> Result<Option<QuerySpec>, ValidationError> {
    let source = spec.model();
    if source == target {
        return Ok(Some(spec.clone()));
    }

    if let Some(nested) = find_nested(spec.params(), &target.subquery_key()) {
        #[cfg(feature = "tracing")]
        tracing::trace!(from = %source, to = %target, "quarry.coerce.reuse");
        return planner.construct(target, nested.clone()).map(Some);
    }

    if !is_related(target, source) {
        return Ok(None);
    }

    let mut inner = compact(spec.params());
    if (target, source) == (Model::Location, Model::Observation) {
        inner
            .entry(CompactString::from("is_collection_location"))
            .or_insert(Value::Bool(true));
    }
    let mut params = Params::new();
    params.insert(source.subquery_key(), Value::Map(inner));
    planner.construct(target, params).map(Some)
}

/// Depth-first search for `key` among nested query parameters.
fn find_nested<'a>(params: &'a Params, key: &str) -> Option<&'a Params> {
    if let Some(Value::Map(found)) = params.get(key) {
        return Some(found);
    }
    params
        .values()
        .filter_map(Value::as_map)
        .find_map(|nested| find_nested(nested, key))
}

/// Parameters worth carrying into a wrapping query: no blanks, and no
/// order since the wrapping query never applies it.
fn compact(params: &Params) -> Params {
    params
        .iter()
        .filter(|(key, value)| key.as_str() != "by" && !value.is_blank())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
