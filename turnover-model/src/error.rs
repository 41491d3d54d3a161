use std::fmt::{self, Display};

/// Errors produced by model constructors and parsing routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A stored enum value did not match any known variant.
    UnknownVariant { kind: &'static str, value: String },
    InvalidValue(String),
}

impl ModelError {
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        ModelError::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownVariant { kind, value } => {
                write!(f, "unknown {kind}: {value}")
            }
            ModelError::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
