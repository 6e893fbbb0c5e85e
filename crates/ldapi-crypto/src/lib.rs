//! # ldapi-crypto
//!
//! Password hash helpers for directory servers.
//!
//! Directory servers store `userPassword` values in the RFC 2307 form
//! `{SCHEME}base64(digest[+salt])`. This crate produces and verifies the
//! three schemes commonly accepted by OpenLDAP and 389 Directory Server:
//!
//! - `{SHA}`: unsalted SHA-1
//! - `{SSHA}`: SHA-1 over `password || salt`, salt appended to the digest
//! - `{MD5}`: unsalted MD5
//!
//! **WARNING**: none of these schemes is a modern password hash. They exist
//! for interoperability with directories that require them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod password;
pub mod random;
pub mod scheme;

pub use error::{CryptoError, CryptoResult};
pub use password::{
    hash_password, ldap_password, md5, md5_prehashed, sha, ssha, ssha_with_salt, verify_password,
};
pub use random::generate_salt;
pub use scheme::PasswordScheme;
