//! Core error types.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while compiling or executing a request.
///
/// Compilation errors (`Schema`, `InvalidComparison`, `InvalidFilters`,
/// `InvalidJoin`, `InvalidRequest`) are raised before any statement runs.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown table, unknown column, or an alias without a declared join.
    #[error("schema error: {0}")]
    Schema(String),

    /// Comparison operator or comparand not usable together.
    #[error("invalid comparison: {0}")]
    InvalidComparison(String),

    /// Malformed filter tree.
    #[error("invalid filters: {0}")]
    InvalidFilters(String),

    /// Malformed join chain.
    #[error("invalid join: {0}")]
    InvalidJoin(String),

    /// Malformed request arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Integrity or constraint violation raised by the backing store.
    #[error("database error: {0}")]
    Database(String),

    /// A batch command failed; the whole batch was rolled back.
    #[error("invalid batch command at index {index}: {source}")]
    InvalidBatchCommand {
        /// Position of the failing command.
        index: usize,
        /// What went wrong with it.
        source: Box<Error>,
    },

    /// Any other backing-store failure.
    #[error("storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an error raised by the command at `index` of a batch.
    pub fn batch(index: usize, source: Error) -> Self {
        Error::InvalidBatchCommand {
            index,
            source: Box::new(source),
        }
    }

    /// Index of the failing batch command, if this is a batch error.
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            Error::InvalidBatchCommand { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Whether the caller can fix the request that produced this error.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Schema(_)
            | Error::InvalidComparison(_)
            | Error::InvalidFilters(_)
            | Error::InvalidJoin(_)
            | Error::InvalidRequest(_)
            | Error::Database(_) => true,
            Error::InvalidBatchCommand { source, .. } => source.is_client_error(),
            Error::Storage(_) | Error::Config(_) => false,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if matches!(
                    failure.code,
                    ErrorCode::ConstraintViolation | ErrorCode::TypeMismatch
                ) =>
            {
                Error::Database(message.clone().unwrap_or_else(|| failure.to_string()))
            }
            _ => Error::Storage(err),
        }
    }
}
