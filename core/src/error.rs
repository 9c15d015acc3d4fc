use compact_str::CompactString;
use thiserror::Error;

/// Errors raised while validating caller-supplied parameters.
///
/// These are recoverable and carry the offending key so they can be shown
/// back to whoever built the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required parameter was absent (or explicitly null)
    #[error("Missing :{key} parameter for {model} query")]
    MissingParameter {
        model: &'static str,
        key: CompactString,
    },

    /// A value could not be coerced to the declared type
    #[error("Value for :{key} in {model} query should be {expected}, got: {got}")]
    TypeMismatch {
        model: &'static str,
        key: CompactString,
        expected: &'static str,
        got: String,
    },

    /// Keys left over after every declaration was processed
    #[error("Unexpected parameter(s) {} for {model} query", format_keys(.keys))]
    UnexpectedParameter {
        model: &'static str,
        keys: Vec<CompactString>,
    },

    /// The model name is not part of the catalog
    #[error("Invalid model: '{0}'")]
    UnknownModel(CompactString),
}

impl ValidationError {
    /// The parameter key this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingParameter { key, .. } | Self::TypeMismatch { key, .. } => Some(key),
            Self::UnexpectedParameter { keys, .. } => keys.first().map(CompactString::as_str),
            Self::UnknownModel(_) => None,
        }
    }
}

fn format_keys(keys: &[CompactString]) -> String {
    keys.iter()
        .map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Registry or programmer defects. Never a user-facing condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Neither a forward nor a reverse relation is registered
    #[error("Don't know how to join from {from} to {to}")]
    UnknownJoin {
        from: CompactString,
        to: CompactString,
    },

    /// A table token does not belong to the fixed schema
    #[error("Don't know the table '{0}'")]
    UnknownTable(CompactString),

    /// The order key has no handler, or the handler does not apply to the model
    #[error("Can't figure out how to sort {model} by :{by}")]
    UnknownOrder {
        model: &'static str,
        by: CompactString,
    },

    /// Letter pagination was requested for a model without a letter column
    #[error("{0} has no column to paginate by letter")]
    NoLetterColumn(&'static str),

    /// A nested query parameter is missing from the model's declarations
    #[error("{model} does not declare the subquery parameter :{key}")]
    UndeclaredSubquery {
        model: &'static str,
        key: CompactString,
    },
}

/// A stored description could not be turned back into a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializationError {
    #[error("Missing model prefix in description")]
    MissingModel,

    #[error("Unknown model '{0}' in description")]
    UnknownModel(CompactString),

    #[error("Malformed parameter pair: '{0}'")]
    MalformedPair(String),

    #[error("Unknown value tag '{0}'")]
    UnknownTag(char),

    #[error("Empty value encoding")]
    EmptyValue,

    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    #[error("Invalid boolean: '{0}'")]
    InvalidBoolean(String),

    #[error("Invalid escape sequence: {0}")]
    InvalidEscape(String),

    /// Decoded fine but the parameters no longer validate
    #[error("Stored parameters are invalid: {0}")]
    Invalid(#[from] ValidationError),
}

/// Error reported by a [`Connection`](crate::connection::Connection)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Execution error: {0}")]
pub struct ExecutionError(pub String);

#[cfg(feature = "rusqlite")]
impl From<rusqlite::Error> for ExecutionError {
    fn from(e: rusqlite::Error) -> Self {
        Self(e.to_string())
    }
}

/// Error reported by a [`RecordStore`](crate::records::RecordStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store error: {0}")]
    Backend(String),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: i64, reason: String },

    /// Insert and re-read both failed to produce a row
    #[error("Record for '{0}' vanished during find-or-create")]
    Vanished(String),
}

#[cfg(feature = "rusqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}
