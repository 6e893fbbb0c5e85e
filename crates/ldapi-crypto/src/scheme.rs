//! Password scheme definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Password storage schemes understood by directory servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    /// Unsalted SHA-1.
    Sha,

    /// Salted SHA-1.
    Ssha,

    /// Unsalted MD5.
    Md5,
}

impl PasswordScheme {
    /// Returns the scheme tag as it appears between the braces.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sha => "SHA",
            Self::Ssha => "SSHA",
            Self::Md5 => "MD5",
        }
    }

    /// Returns the raw digest length in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Sha | Self::Ssha => 20,
            Self::Md5 => 16,
        }
    }

    /// Returns true if the scheme appends a salt to the digest.
    #[must_use]
    pub const fn is_salted(self) -> bool {
        matches!(self, Self::Ssha)
    }

    /// Returns the `{TAG}` prefix.
    #[must_use]
    pub fn prefix(self) -> String {
        format!("{{{}}}", self.tag())
    }
}

impl fmt::Display for PasswordScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PasswordScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha" => Ok(Self::Sha),
            "ssha" => Ok(Self::Ssha),
            "md5" => Ok(Self::Md5),
            _ => Err(CryptoError::UnknownScheme(s.to_string())),
        }
    }
}
