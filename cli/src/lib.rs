//! quarry CLI
//!
//! Maintenance commands around the quarry query engine. Configuration is
//! read from `quarry.toml` in the working directory, or from the file given
//! with `--config`.
//!
//! # Commands
//!
//! - `quarry compile <Model> -p key=value ...` - print the SQL of a query
//! - `quarry key <Model> -p key=value ...` - print the canonical record key
//! - `quarry decode <key>` - show the model, parameters and SQL behind a key
//! - `quarry sweep --database <path>` - delete stale query records
//!
//! Parameter values are plain text and validated like any other request:
//! `a,b` is an array and `a..b` a range with either side optional.

pub mod commands;
pub mod error;
pub mod output;
pub mod params;
