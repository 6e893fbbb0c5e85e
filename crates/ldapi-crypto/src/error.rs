//! Error types for password hashing.

use thiserror::Error;

/// Error type for password hash operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The requested hash scheme is not supported.
    #[error("unknown password scheme: {0}")]
    UnknownScheme(String),

    /// A pre-computed digest was not valid hex.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// A stored `{SCHEME}value` string could not be parsed.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),
}

/// Result type for password hash operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
