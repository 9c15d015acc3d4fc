//! CLI command implementations
//!
//! Each command module implements a specific quarry CLI command.

pub mod compile;
pub mod decode;
pub mod key;
pub mod sweep;

use quarry::{Dialect, Planner, QuarryConfig};

/// Planner from `config`, with the dialect optionally overridden.
pub(crate) fn planner(config: &QuarryConfig, dialect: Option<Dialect>) -> Planner {
    match dialect {
        Some(dialect) => Planner::new(dialect, config.limits),
        None => config.planner(),
    }
}
