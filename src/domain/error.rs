//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree and binding model.
/// These are independent of resolver and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cannot create section, key already exists: {key} (at '{path}')")]
    Structural { key: String, path: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("node at '{path}' is not a mapping")]
    NotAMapping { path: String },
}

impl DomainError {
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
