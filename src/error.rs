use quarry_core::{
    ConfigurationError, ExecutionError, SerializationError, StoreError, ValidationError,
};
use thiserror::Error;

use crate::config::ConfigError;

/// Any failure surfaced by the [`Engine`](crate::Engine) and the types it hands out.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Caller-supplied parameters were rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The model catalog or join registry is inconsistent
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl QueryError {
    /// True for errors caused by the request rather than by the system.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
