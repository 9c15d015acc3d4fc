//! Parameter declarations.
//!
//! Each model declares the parameters it accepts as a static slice of
//! [`ParamDeclaration`]s, built with const fns:
//!
//! ```
//! use quarry_core::params::{ParamDeclaration, ParamKind};
//!
//! const DATE: ParamDeclaration = ParamDeclaration::new("date", ParamKind::Date).range();
//! assert!(DATE.is_range());
//! ```

use crate::model::Model;

/// The type a parameter value is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    String,
    /// `YYYY[-MM[-DD]]`, or a bare `MM[-DD]` for seasonal searches
    Date,
    /// `YYYY[-MM[-DD[ HH[:MM[:SS]]]]]`
    Time,
    /// Positive row id
    Id,
    /// Positive row id, or text naming a row of the model by its natural
    /// key (a user's login, a project's title, ...)
    Record(Model),
    /// One of a closed set of tokens
    Enum(&'static [&'static str]),
    /// Parameters of a nested query on another model
    Query(Model),
}

/// Handler key for a [`ParamKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    String,
    Date,
    Time,
    Id,
    Record,
    Enum,
    Query,
}

impl ParamKind {
    pub const fn tag(&self) -> TypeTag {
        match self {
            ParamKind::Bool => TypeTag::Bool,
            ParamKind::Int => TypeTag::Int,
            ParamKind::Float => TypeTag::Float,
            ParamKind::String => TypeTag::String,
            ParamKind::Date => TypeTag::Date,
            ParamKind::Time => TypeTag::Time,
            ParamKind::Id => TypeTag::Id,
            ParamKind::Record(_) => TypeTag::Record,
            ParamKind::Enum(_) => TypeTag::Enum,
            ParamKind::Query(_) => TypeTag::Query,
        }
    }

    /// Human description used in type-mismatch errors
    pub const fn expected(&self) -> &'static str {
        match self {
            ParamKind::Bool => "a boolean",
            ParamKind::Int => "an integer",
            ParamKind::Float => "a number",
            ParamKind::String => "a string",
            ParamKind::Date => "a date",
            ParamKind::Time => "a time",
            ParamKind::Id => "a positive id",
            ParamKind::Record(_) => "a positive id or a name",
            ParamKind::Enum(_) => "one of the allowed values",
            ParamKind::Query(_) => "a nested query",
        }
    }
}

/// How many values a parameter carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrapper {
    #[default]
    Scalar,
    /// Any number of values, capped at the configured maximum
    Array,
    /// A `[min, max]` pair, either end optional
    Range,
}

/// A declared query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDeclaration {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub wrapper: Wrapper,
}

impl ParamDeclaration {
    /// Optional scalar parameter
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            wrapper: Wrapper::Scalar,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn array(mut self) -> Self {
        self.wrapper = Wrapper::Array;
        self
    }

    pub const fn range(mut self) -> Self {
        self.wrapper = Wrapper::Range;
        self
    }

    pub const fn is_array(&self) -> bool {
        matches!(self.wrapper, Wrapper::Array)
    }

    pub const fn is_range(&self) -> bool {
        matches!(self.wrapper, Wrapper::Range)
    }
}

/// Order key, accepted by every model
pub const BY: ParamDeclaration = ParamDeclaration::new("by", ParamKind::String);

/// Explicit id set, accepted by every model
pub const IDS: ParamDeclaration = ParamDeclaration::new("ids", ParamKind::Id).array();

/// Parameters every model accepts in addition to its own
pub const UNIVERSAL: &[ParamDeclaration] = &[BY, IDS];
