use thiserror::Error;
use turnover_model::ModelError;

#[derive(Error, Debug)]
pub enum TurnoverError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored value: {0}")]
    Model(#[from] ModelError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TurnoverError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        TurnoverError::NotFound(format!("{kind} {id}"))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for TurnoverError {
    fn from(err: sqlx::Error) -> Self {
        TurnoverError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TurnoverError>;
