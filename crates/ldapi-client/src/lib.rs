//! # ldapi-client
//!
//! A small facade over the `ldap3` directory client.
//!
//! ## Overview
//!
//! - [`DirectoryConfig`]: connection settings, schema aliases and logging
//!   options, with builder, TOML loading and overlay merging
//! - [`DirectoryClient`]: bind once, then search, add, modify and delete
//! - [`ClientRegistry`]: one bound client per configuration fingerprint
//! - [`dn`]: DN splitting, parsing and escaping
//! - [`logging`]: optional daily log file
//!
//! ## Example
//!
//! ```no_run
//! use ldapi_client::{ClientRegistry, DirectoryConfig};
//!
//! # async fn example() -> ldapi_client::DirectoryResult<()> {
//! let config = DirectoryConfig::builder()
//!     .host("ldap://ldap.example.com:389")
//!     .base_dn("dc=example,dc=com")
//!     .bind_dn("cn=admin,dc=example,dc=com")
//!     .bind_password("secret")
//!     .build()?;
//!
//! let client = ClientRegistry::global().get_or_connect(&config).await?;
//! for entry in client.search(&config.person_filter(), None, &["uid", "cn"]).await? {
//!     println!("{}", entry.dn);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod client;
pub mod config;
pub mod connection;
pub mod dn;
pub mod entry;
pub mod error;
pub mod logging;
pub mod registry;

#[cfg(test)]
mod testing;

pub use client::{DirectoryClient, ModifyKind};
pub use config::{ConfigOverlay, DirectoryConfig, DirectoryConfigBuilder, LogConfig};
pub use connection::DirectoryConnection;
pub use dn::ParsedDn;
pub use entry::{Attributes, DirectoryEntry};
pub use error::{DirectoryError, DirectoryResult};
pub use registry::ClientRegistry;
