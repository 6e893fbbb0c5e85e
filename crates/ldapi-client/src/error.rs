//! Directory client error types.
//!
//! ## Security Note
//!
//! Error messages must not leak bind credentials. Only DNs, filters and
//! server diagnostics are carried.

use ldap3::LdapError;
use thiserror::Error;

/// LDAP result code for `noSuchObject`.
pub const RC_NO_SUCH_OBJECT: u32 = 32;
/// LDAP result code for `invalidCredentials`.
pub const RC_INVALID_CREDENTIALS: u32 = 49;
/// LDAP result code for `entryAlreadyExists`.
pub const RC_ALREADY_EXISTS: u32 = 68;

/// Directory client errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Invalid configuration.
    #[error("directory configuration error: {0}")]
    Configuration(String),

    /// TLS was required but the host does not use it.
    #[error("security error: TLS is required but the host URL is not ldaps:// and STARTTLS is disabled")]
    InsecureProtocol,

    /// Connection failed.
    #[error("directory connection failed: {0}")]
    Connection(String),

    /// Bind (authentication) failed.
    #[error("directory bind failed: {0}")]
    Bind(String),

    /// The server rejected the credentials (result code 49).
    #[error("invalid credentials for {0}")]
    InvalidCredentials(String),

    /// Search operation failed.
    #[error("directory search failed: {0}")]
    Search(String),

    /// The target entry does not exist (result code 32).
    #[error("no such object: {0}")]
    NoSuchObject(String),

    /// The entry already exists (result code 68).
    #[error("entry already exists: {0}")]
    AlreadyExists(String),

    /// A write operation returned a non-success result code.
    #[error("{op} failed for {dn}: result code {rc} ({text})")]
    Operation {
        /// Operation name (add, modify, delete).
        op: &'static str,
        /// Target DN.
        dn: String,
        /// LDAP result code.
        rc: u32,
        /// Diagnostic text from the server.
        text: String,
    },

    /// Invalid DN syntax.
    #[error("invalid DN: {0}")]
    InvalidDn(String),

    /// The connection has already been closed.
    #[error("connection is closed")]
    Closed,

    /// Operation timed out.
    #[error("directory operation timed out")]
    Timeout,

    /// Underlying ldap3 error not covered by another variant.
    #[error("LDAP error: {0}")]
    Ldap3(#[source] LdapError),
}

impl From<LdapError> for DirectoryError {
    fn from(err: LdapError) -> Self {
        match err {
            LdapError::Timeout { .. } => Self::Timeout,
            LdapError::Io { .. }
            | LdapError::OpSend { .. }
            | LdapError::ResultRecv { .. }
            | LdapError::EndOfStream => Self::Connection(err.to_string()),
            other => Self::Ldap3(other),
        }
    }
}

impl DirectoryError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an invalid DN error.
    #[must_use]
    pub fn invalid_dn(msg: impl Into<String>) -> Self {
        Self::InvalidDn(msg.into())
    }

    /// Classifies an ldap3 error, using `fallback` for errors that are
    /// neither timeouts nor connection failures.
    pub(crate) fn classify(err: LdapError, fallback: impl FnOnce(LdapError) -> Self) -> Self {
        match Self::from(err) {
            Self::Ldap3(err) => fallback(err),
            classified => classified,
        }
    }

    /// Maps a non-zero result code of a write operation to an error.
    #[must_use]
    pub fn from_result_code(op: &'static str, dn: &str, rc: u32, text: &str) -> Self {
        match rc {
            RC_NO_SUCH_OBJECT => Self::NoSuchObject(dn.to_string()),
            RC_ALREADY_EXISTS => Self::AlreadyExists(dn.to_string()),
            RC_INVALID_CREDENTIALS => Self::InvalidCredentials(dn.to_string()),
            _ => Self::Operation {
                op,
                dn: dn.to_string(),
                rc,
                text: text.to_string(),
            },
        }
    }

    /// Returns the LDAP result code carried by this error, if any.
    #[must_use]
    pub fn result_code(&self) -> Option<u32> {
        match self {
            Self::NoSuchObject(_) => Some(RC_NO_SUCH_OBJECT),
            Self::AlreadyExists(_) => Some(RC_ALREADY_EXISTS),
            Self::InvalidCredentials(_) => Some(RC_INVALID_CREDENTIALS),
            Self::Operation { rc, .. } => Some(*rc),
            Self::Ldap3(LdapError::LdapResult { result }) => Some(result.rc),
            _ => None,
        }
    }

    /// Checks if this is a connection-related error.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout | Self::Closed)
    }

    /// Checks if the target entry was missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchObject(_))
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_codes_map_to_variants() {
        let dn = "uid=x,dc=example,dc=com";
        assert!(DirectoryError::from_result_code("delete", dn, 32, "").is_not_found());
        assert!(matches!(
            DirectoryError::from_result_code("add", dn, 68, ""),
            DirectoryError::AlreadyExists(_)
        ));
        assert!(matches!(
            DirectoryError::from_result_code("bind", dn, 49, ""),
            DirectoryError::InvalidCredentials(_)
        ));

        let err = DirectoryError::from_result_code("modify", dn, 50, "insufficient access");
        assert_eq!(err.result_code(), Some(50));
        assert_eq!(
            err.to_string(),
            "modify failed for uid=x,dc=example,dc=com: result code 50 (insufficient access)"
        );
    }

    #[test]
    fn error_categories() {
        assert!(DirectoryError::connection("refused").is_connection_error());
        assert!(DirectoryError::Timeout.is_connection_error());
        assert!(!DirectoryError::config("bad").is_connection_error());
        assert_eq!(DirectoryError::Timeout.result_code(), None);
    }

    #[tokio::test]
    async fn ldap3_errors_are_classified() {
        let elapsed = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        let err = DirectoryError::from(LdapError::from(elapsed));
        assert!(matches!(err, DirectoryError::Timeout));
        assert!(err.is_connection_error());

        let reset = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        let err = DirectoryError::from(LdapError::from(reset));
        assert!(matches!(err, DirectoryError::Connection(_)));

        let err = DirectoryError::from(LdapError::EndOfStream);
        assert!(err.is_connection_error());

        let err = DirectoryError::classify(LdapError::AddNoValues, |e| {
            DirectoryError::Search(e.to_string())
        });
        assert!(matches!(err, DirectoryError::Search(_)));
    }

    #[test]
    fn insecure_protocol_message() {
        let msg = DirectoryError::InsecureProtocol.to_string();
        assert!(msg.contains("ldaps://"));
        assert!(msg.contains("STARTTLS"));
    }
}
