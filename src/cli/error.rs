//! CLI-level errors (wraps application and infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("no value at '{key}' in {file}")]
    NotFound { key: String, file: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::NotFound { .. } => crate::exitcode::DATAERR,
            CliError::Application(e) => application_exit_code(e),
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Codec { .. } => crate::exitcode::DATAERR,
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Configuration { .. } => crate::exitcode::CONFIG,
        ApplicationError::Domain(DomainError::NotAMapping { .. })
        | ApplicationError::ParseFailure { .. }
        | ApplicationError::NullInput { .. }
        | ApplicationError::UnknownCase { .. }
        | ApplicationError::IndexOutOfRange { .. } => crate::exitcode::DATAERR,
        ApplicationError::OperationFailed { source, .. } => match source.downcast_ref::<InfraError>() {
            Some(InfraError::Io { .. }) => crate::exitcode::IOERR,
            Some(InfraError::Codec { .. }) => crate::exitcode::DATAERR,
            _ if source.is::<std::io::Error>() => crate::exitcode::IOERR,
            _ => crate::exitcode::SOFTWARE,
        },
        _ => crate::exitcode::SOFTWARE,
    }
}
