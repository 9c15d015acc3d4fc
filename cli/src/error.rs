//! Error types for the CLI

use quarry::{ConfigError, QueryError};
use thiserror::Error;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation, compilation or execution failure
    #[error("{0}")]
    Query(#[from] QueryError),

    /// A `-p` argument that is not `key=value`
    #[error("Invalid parameter '{0}': expected key=value")]
    InvalidParam(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

