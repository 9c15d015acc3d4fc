//! SQL dialects the assembler can target.
//!
//! The generated statements are plain text. The only dialect-specific parts
//! are literal escaping, month/day extraction and substring matching;
//! everything else sticks to constructs both engines share (`CASE WHEN`
//! rather than `IF()`, explicit `OR` lists rather than `FIND_IN_SET()`).

use crate::search::{FOLD_FUNCTION, fold};
use crate::value::Value;

/// SQL dialect
///
/// # Examples
///
/// ```
/// use quarry_core::Dialect;
///
/// assert_eq!(Dialect::SQLite.quote_str("it's"), "'it''s'");
/// assert_eq!(Dialect::MySQL.quote_str("it's"), "'it\\'s'");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// SQLite, also used by the bundled rusqlite driver
    #[default]
    SQLite,

    /// MySQL / MariaDB
    MySQL,
}

impl Dialect {
    /// All supported dialects
    pub const ALL: &'static [Dialect] = &[Dialect::SQLite, Dialect::MySQL];

    /// Parse a dialect from a string (case-insensitive)
    ///
    /// ```
    /// use quarry_core::Dialect;
    ///
    /// assert_eq!(Dialect::parse("sqlite"), Some(Dialect::SQLite));
    /// assert_eq!(Dialect::parse("MariaDB"), Some(Dialect::MySQL));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("sqlite") || s.eq_ignore_ascii_case("sqlite3") {
            Some(Dialect::SQLite)
        } else if s.eq_ignore_ascii_case("mysql") || s.eq_ignore_ascii_case("mariadb") {
            Some(Dialect::MySQL)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::MySQL => "mysql",
        }
    }

    /// Quotes a string literal.
    #[must_use]
    pub fn quote_str(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        match self {
            Dialect::SQLite => {
                for c in s.chars() {
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
            }
            Dialect::MySQL => {
                for c in s.chars() {
                    match c {
                        '\'' | '\\' => {
                            out.push('\\');
                            out.push(c);
                        }
                        '\0' => out.push_str("\\0"),
                        _ => out.push(c),
                    }
                }
            }
        }
        out.push('\'');
        out
    }

    /// Quotes an identifier with backticks (both dialects accept them).
    #[must_use]
    pub fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    /// Renders a value as an SQL literal.
    #[must_use]
    pub fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => "0".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::String(s) | Value::Symbol(s) => self.quote_str(s),
            Value::Array(items) => items
                .iter()
                .map(|item| self.quote_value(item))
                .collect::<Vec<_>>()
                .join(","),
            Value::Map(_) => "NULL".to_string(),
        }
    }

    /// Integer month of a date column.
    #[must_use]
    pub fn month(&self, column: &str) -> String {
        match self {
            Dialect::SQLite => format!("CAST(strftime('%m', {column}) AS INTEGER)"),
            Dialect::MySQL => format!("MONTH({column})"),
        }
    }

    /// Integer day-of-month of a date column.
    #[must_use]
    pub fn day(&self, column: &str) -> String {
        match self {
            Dialect::SQLite => format!("CAST(strftime('%d', {column}) AS INTEGER)"),
            Dialect::MySQL => format!("DAYOFMONTH({column})"),
        }
    }

    /// Clause appended to `LIKE` patterns escaped with [`Dialect::escape_like`].
    ///
    /// MySQL already treats backslash as the escape character.
    #[must_use]
    pub const fn like_escape(&self) -> &'static str {
        match self {
            Dialect::SQLite => " ESCAPE '\\'",
            Dialect::MySQL => "",
        }
    }

    /// Escapes `LIKE` wildcards so the text matches literally.
    #[must_use]
    pub fn escape_like(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if matches!(c, '%' | '_' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    /// Substring test of `column` against `term`, ignoring case and accents.
    /// `*` in the term matches any run of characters.
    ///
    /// SQLite compares through the [`FOLD_FUNCTION`] the connection registers;
    /// MySQL relies on its accent-insensitive default collation.
    #[must_use]
    pub fn contains(&self, column: &str, term: &str, negated: bool) -> String {
        let op = if negated { "NOT LIKE" } else { "LIKE" };
        let pattern = |term: &str| format!("%{}%", self.escape_like(term).replace('*', "%"));
        match self {
            Dialect::SQLite => format!(
                "{FOLD_FUNCTION}({column}) {op} {}{}",
                self.quote_str(&pattern(&fold(term))),
                self.like_escape()
            ),
            Dialect::MySQL => format!("{column} {op} {}", self.quote_str(&pattern(term))),
        }
    }

    /// Concatenates several columns with single spaces, treating NULL as empty.
    #[must_use]
    pub fn concat(&self, columns: &[&str]) -> String {
        match (self, columns) {
            (_, [only]) => (*only).to_string(),
            (Dialect::SQLite, _) => {
                let parts = columns
                    .iter()
                    .map(|c| format!("COALESCE({c}, '')"))
                    .collect::<Vec<_>>();
                format!("({})", parts.join(" || ' ' || "))
            }
            (Dialect::MySQL, _) => format!("CONCAT_WS(' ', {})", columns.join(", ")),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect")]
pub struct DialectParseError;
