//! Typed parameter values.
//!
//! Both raw caller input and validated query parameters are expressed as
//! [`Value`]s keyed by name in a [`Params`] map. Ranges are two-element
//! arrays whose absent endpoints are [`Value::Null`].

use std::collections::BTreeMap;
use std::fmt;

use compact_str::CompactString;

/// Parameter map. Sorted so that iteration order is canonical.
pub type Params = BTreeMap<CompactString, Value>;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(CompactString),
    /// A member of a closed set (enum values, order keys)
    Symbol(CompactString),
    Array(Vec<Value>),
    /// Parameters of a nested query
    Map(Params),
}

impl Value {
    /// Builds a range value; either end may be absent.
    pub fn range(min: Option<Value>, max: Option<Value>) -> Self {
        Value::Array(vec![min.unwrap_or_default(), max.unwrap_or_default()])
    }

    pub fn symbol(s: impl Into<CompactString>) -> Self {
        Value::Symbol(s.into())
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, an empty string, or an empty collection.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) | Value::Symbol(s) => s.trim().is_empty(),
            Value::Array(items) => items.iter().all(Value::is_blank),
            Value::Map(map) => map.is_empty(),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => false,
        }
    }

    /// String or symbol contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Params> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Interprets a driver-returned cell as a row id.
    pub fn as_id(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Splits a range value into its endpoints.
    pub fn as_range(&self) -> Option<(&Value, &Value)> {
        match self.as_array()? {
            [min, max] => Some((min, max)),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(CompactString::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(CompactString::from(value))
    }
}

impl From<CompactString> for Value {
    fn from(value: CompactString) -> Self {
        Value::String(value)
    }
}

impl From<Params> for Value {
    fn from(value: Params) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Builds a [`Params`] map from `key => value` pairs.
///
/// ```
/// use quarry_core::{params, Value};
///
/// let raw = params! { "names" => vec![1, 2], "has_images" => true };
/// assert_eq!(raw["has_images"], Value::Bool(true));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(
            params.insert(
                $crate::CompactString::from($key),
                $crate::Value::from($value),
            );
        )+
        params
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("  ").is_blank());
        assert!(Value::range(None, None).is_blank());
        assert!(!Value::range(Some(Value::Int(1)), None).is_blank());
        assert!(!Value::Bool(false).is_blank());
    }

    #[test]
    fn test_as_id_accepts_driver_cells() {
        assert_eq!(Value::Int(7).as_id(), Some(7));
        assert_eq!(Value::from("12").as_id(), Some(12));
        assert_eq!(Value::Float(3.0).as_id(), Some(3));
        assert_eq!(Value::Float(3.5).as_id(), None);
        assert_eq!(Value::Null.as_id(), None);
    }

    #[test]
    fn test_display() {
        let value = Value::from(vec![Value::Int(1), Value::symbol("name"), Value::from("x")]);
        assert_eq!(value.to_string(), "[1, :name, 'x']");
    }
}
