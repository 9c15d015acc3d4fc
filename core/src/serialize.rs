//! Canonical text form of a query.
//!
//! `Model:key=value;key=value` with keys in sorted order, so two equal specs
//! always produce the same bytes. That text is the unique key of a persisted
//! query record.
//!
//! Every value starts with a one-letter type tag:
//!
//! | Tag | Value                                   |
//! |-----|-----------------------------------------|
//! | `n` | null                                    |
//! | `b` | boolean, `b1` / `b0`                    |
//! | `i` | integer                                 |
//! | `f` | float                                   |
//! | `s` | string                                  |
//! | `y` | symbol                                  |
//! | `a` | array of escaped encodings, `,`-joined  |
//! | `h` | nested parameters, `key=value`, `,`-joined |
//!
//! Delimiters inside strings, keys and nested encodings are percent-escaped.

use std::borrow::Cow;
use std::str::FromStr;

use compact_str::CompactString;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::error::SerializationError;
use crate::model::Model;
use crate::spec::QuerySpec;
use crate::value::{Params, Value};

const RESERVED: &AsciiSet = &CONTROLS
    .add(b',')
    .add(b';')
    .add(b':')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'/')
    .add(b'?')
    .add(b'=');

fn escape(s: &str) -> Cow<'_, str> {
    utf8_percent_encode(s, RESERVED).into()
}

fn unescape(s: &str) -> Result<Cow<'_, str>, SerializationError> {
    percent_decode_str(s)
        .decode_utf8()
        .map_err(|e| SerializationError::InvalidEscape(format!("'{s}': {e}")))
}

/// Canonical form of a validated query.
///
/// ```
/// use quarry_core::{params, serialize, Model, Planner};
///
/// let planner = Planner::default();
/// let spec = planner
///     .construct(Model::Name, params! { "pattern" => "a;b", "by" => "id" })
///     .unwrap();
/// assert_eq!(serialize::serialize(&spec), "Name:by=yid;pattern=sa%3Bb");
/// ```
pub fn serialize(spec: &QuerySpec) -> String {
    serialize_params(spec.model(), spec.params())
}

/// Canonical form of a model and parameter map.
pub fn serialize_params(model: Model, params: &Params) -> String {
    let pairs = params
        .iter()
        .map(|(key, value)| format!("{}={}", escape(key), encode(value)))
        .collect::<Vec<_>>();
    format!("{}:{}", model.as_str(), pairs.join(";"))
}

fn encode(value: &Value) -> String {
    match value {
        Value::Null => "n".to_string(),
        Value::Bool(true) => "b1".to_string(),
        Value::Bool(false) => "b0".to_string(),
        Value::Int(i) => format!("i{i}"),
        Value::Float(f) => format!("f{f:?}"),
        Value::String(s) => format!("s{}", escape(s)),
        Value::Symbol(s) => format!("y{}", escape(s)),
        Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| escape(&encode(item)).into_owned())
                .collect::<Vec<_>>();
            format!("a{}", items.join(","))
        }
        Value::Map(map) => {
            let entries = map
                .iter()
                .map(|(key, value)| format!("{}={}", escape(key), escape(&encode(value))))
                .collect::<Vec<_>>();
            format!("h{}", entries.join(","))
        }
    }
}

/// Splits a description back into its model and (unvalidated) parameters.
pub fn deserialize(description: &str) -> Result<(Model, Params), SerializationError> {
    let (model, rest) = description
        .split_once(':')
        .ok_or(SerializationError::MissingModel)?;
    let model = Model::from_str(model)
        .map_err(|_| SerializationError::UnknownModel(CompactString::from(model)))?;

    let mut params = Params::new();
    for pair in rest.split(';').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| SerializationError::MalformedPair(pair.to_string()))?;
        params.insert(CompactString::from(unescape(key)?), decode(value)?);
    }
    Ok((model, params))
}

fn decode(encoded: &str) -> Result<Value, SerializationError> {
    let mut chars = encoded.chars();
    let tag = chars.next().ok_or(SerializationError::EmptyValue)?;
    let body = chars.as_str();
    let number = || SerializationError::InvalidNumber(body.to_string());

    Ok(match tag {
        'n' => Value::Null,
        'b' => match body {
            "1" => Value::Bool(true),
            "0" => Value::Bool(false),
            _ => return Err(SerializationError::InvalidBoolean(body.to_string())),
        },
        'i' => Value::Int(body.parse().map_err(|_| number())?),
        'f' => Value::Float(body.parse().map_err(|_| number())?),
        's' => Value::String(CompactString::from(unescape(body)?)),
        'y' => Value::Symbol(CompactString::from(unescape(body)?)),
        'a' if body.is_empty() => Value::Array(Vec::new()),
        'a' => Value::Array(
            body.split(',')
                .map(|item| decode(&unescape(item)?))
                .collect::<Result<_, _>>()?,
        ),
        'h' => {
            let mut map = Params::new();
            for entry in body.split(',').filter(|entry| !entry.is_empty()) {
                let (key, value) = entry
                    .split_once('=')
                    .ok_or_else(|| SerializationError::MalformedPair(entry.to_string()))?;
                map.insert(CompactString::from(unescape(key)?), decode(&unescape(value)?)?);
            }
            Value::Map(map)
        }
        other => return Err(SerializationError::UnknownTag(other)),
    })
}
