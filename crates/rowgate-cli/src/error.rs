//! CLI errors.

use thiserror::Error;

/// Errors surfaced by the command-line runner.
#[derive(Debug, Error)]
pub enum CliError {
    /// Request failed in the core.
    #[error(transparent)]
    Core(#[from] rowgate_core::Error),

    /// Reading an input file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Input is not valid JSON.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status for this error: 2 for requests the caller can
    /// fix, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) if e.is_client_error() => 2,
            CliError::Json(_) => 2,
            _ => 1,
        }
    }
}
