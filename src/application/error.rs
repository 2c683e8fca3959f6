//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Resolution failures plus application-level context around domain errors.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no conversion to {type_name} at '{path}'")]
    UnsupportedConversion { type_name: String, path: String },

    #[error("cannot parse '{raw}' as {target} at '{path}'")]
    ParseFailure {
        path: String,
        raw: String,
        target: String,
    },

    #[error("missing value at '{path}'")]
    NullInput { path: String },

    #[error("unknown case '{name}' of {enum_name} at '{path}'")]
    UnknownCase {
        path: String,
        name: String,
        enum_name: String,
    },

    #[error("ordinal {index} out of range (0..{len}) at '{path}'")]
    IndexOutOfRange { path: String, index: i64, len: usize },

    #[error("cannot instantiate {type_name}")]
    Instantiation { type_name: String },

    #[error("resolver \"{resolver}\" does not support {operation}")]
    UnsupportedOperation { resolver: String, operation: String },

    #[error("config error: {message}")]
    Configuration { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn parse_failure(path: &str, raw: impl Into<String>, target: impl Into<String>) -> Self {
        Self::ParseFailure {
            path: path.to_string(),
            raw: raw.into(),
            target: target.into(),
        }
    }

    pub fn null_input(path: &str) -> Self {
        Self::NullInput {
            path: path.to_string(),
        }
    }

    pub fn unsupported(type_name: impl Into<String>, path: &str) -> Self {
        Self::UnsupportedConversion {
            type_name: type_name.into(),
            path: path.to_string(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
