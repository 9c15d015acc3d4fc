//! `-p key=value` parsing.
//!
//! Values stay text; the validator coerces them to each parameter's
//! declared type. A dotted key (`name_query.misspellings=no`) sets a
//! parameter of a nested query.

use quarry::{CompactString, Params, Value};

use crate::error::CliError;

/// Parses one value: `a,b,c` is an array, `a..b` a range with optional
/// endpoints, anything else a single string.
pub fn parse_value(text: &str) -> Value {
    if let Some((min, max)) = text.split_once("..") {
        let endpoint = |s: &str| (!s.is_empty()).then(|| Value::from(s));
        return Value::range(endpoint(min), endpoint(max));
    }
    if text.contains(',') {
        return Value::Array(
            text.split(',')
                .filter(|s| !s.is_empty())
                .map(Value::from)
                .collect(),
        );
    }
    Value::from(text)
}

/// Collects `key=value` arguments into a parameter map.
pub fn parse_params(args: &[String]) -> Result<Params, CliError> {
    let mut params = Params::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| CliError::InvalidParam(arg.clone()))?;
        insert(&mut params, key, parse_value(value), arg)?;
    }
    Ok(params)
}

fn insert(params: &mut Params, key: &str, value: Value, arg: &str) -> Result<(), CliError> {
    let Some((head, rest)) = key.split_once('.') else {
        params.insert(CompactString::from(key), value);
        return Ok(());
    };
    let nested = params
        .entry(CompactString::from(head))
        .or_insert_with(|| Value::Map(Params::new()));
    match nested {
        Value::Map(inner) => insert(inner, rest, value, arg),
        _ => Err(CliError::InvalidParam(arg.to_string())),
    }
}
