use compact_str::CompactString;

use crate::model::Model;
use crate::value::{Params, Value};

/// A validated query: target model plus typed parameters.
///
/// Only the validator creates these, so every key is declared for the model
/// and every value has its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    model: Model,
    params: Params,
}

impl QuerySpec {
    pub(crate) fn new(model: Model, params: Params) -> Self {
        Self { model, params }
    }

    pub const fn model(&self) -> Model {
        self.model
    }

    pub const fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_params(self) -> Params {
        self.params
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_float)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Elements of an array parameter; empty when absent.
    pub fn array(&self, key: &str) -> &[Value] {
        self.get(key).and_then(Value::as_array).unwrap_or(&[])
    }

    /// Array parameter as ids.
    pub fn ids(&self, key: &str) -> Vec<i64> {
        self.array(key).iter().filter_map(Value::as_int).collect()
    }

    /// Array parameter as strings (strings and symbols).
    pub fn strings(&self, key: &str) -> Vec<&str> {
        self.array(key).iter().filter_map(Value::as_str).collect()
    }

    /// Both endpoints of a range parameter.
    pub fn range(&self, key: &str) -> Option<(&Value, &Value)> {
        self.get(key).and_then(Value::as_range)
    }

    /// The requested order key with any `reverse_` prefix split off.
    pub fn order_by(&self) -> Option<(&str, bool)> {
        let by = self.str("by")?;
        Some(match by.strip_prefix("reverse_") {
            Some(by) => (by, true),
            None => (by, false),
        })
    }

    /// Copy of the parameters with one key replaced, for building a sibling query.
    pub fn params_with(&self, key: &str, value: impl Into<Value>) -> Params {
        let mut params = self.params.clone();
        params.insert(CompactString::from(key), value.into());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_order_by_splits_reverse() {
        let spec = QuerySpec::new(Model::Name, params! { "by" => Value::symbol("reverse_name") });
        assert_eq!(spec.order_by(), Some(("name", true)));

        let spec = QuerySpec::new(Model::Name, params! { "by" => Value::symbol("name") });
        assert_eq!(spec.order_by(), Some(("name", false)));
    }

    #[test]
    fn test_accessors() {
        let spec = QuerySpec::new(
            Model::Observation,
            params! { "names" => vec![1, 2], "has_images" => true },
        );
        assert_eq!(spec.ids("names"), vec![1, 2]);
        assert_eq!(spec.bool("has_images"), Some(true));
        assert!(spec.array("missing").is_empty());
    }
}
