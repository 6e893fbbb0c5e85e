//! CLI error types.

use ldapi_client::DirectoryError;
use ldapi_crypto::CryptoError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Directory operation error.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Password hashing error.
    #[error("password error: {0}")]
    Crypto(#[from] CryptoError),

    /// Resource not found.
    #[error("{resource_type} not found: {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Directory(e) if e.is_connection_error() => 3,
            Self::Directory(_) | Self::NotFound { .. } => 2,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
