//! The directory client facade.
//!
//! [`DirectoryClient`] binds once with the configured service account and
//! exposes search and write operations. Every failure is logged with the
//! operation name and target before it is returned to the caller.

use std::collections::HashSet;

use ldap3::{LdapResult, Mod, Scope, SearchEntry, SearchResult};
use ldapi_crypto::{CryptoResult, PasswordScheme};
use tracing::{debug, error, info, instrument};

use crate::config::DirectoryConfig;
use crate::connection::DirectoryConnection;
use crate::dn::{self, ParsedDn};
use crate::entry::{Attributes, DirectoryEntry};
use crate::error::{DirectoryError, DirectoryResult, RC_NO_SUCH_OBJECT};

/// How [`DirectoryClient::modify_with`] applies attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyKind {
    /// Add values to the attribute.
    Add,
    /// Remove the given values; an empty value list removes the attribute.
    Delete,
    /// Replace all values of the attribute.
    Replace,
}

impl std::str::FromStr for ModifyKind {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "del" | "delete" => Ok(Self::Delete),
            "replace" => Ok(Self::Replace),
            other => Err(DirectoryError::config(format!("unknown modify kind '{other}'"))),
        }
    }
}

fn log_failure<T>(op: &'static str, target: &str, result: DirectoryResult<T>) -> DirectoryResult<T> {
    if let Err(e) = &result {
        error!(op, target, error = %e, "directory operation failed");
    }
    result
}

fn check_result(op: &'static str, dn: &str, res: &LdapResult) -> DirectoryResult<()> {
    match res.rc {
        0 => Ok(()),
        rc => Err(DirectoryError::from_result_code(op, dn, rc, &res.text)),
    }
}

fn value_sets(attributes: &Attributes) -> Vec<(&str, HashSet<&str>)> {
    attributes
        .iter()
        .map(|(name, values)| (name.as_str(), values.iter().map(String::as_str).collect()))
        .collect()
}

/// A bound connection plus the configuration it was built from.
#[derive(Debug)]
pub struct DirectoryClient {
    config: DirectoryConfig,
    conn: DirectoryConnection,
}

impl DirectoryClient {
    /// Validates `config`, connects and binds with its credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the server is
    /// unreachable or the bind fails.
    #[instrument(skip(config), fields(host = %config.host))]
    pub async fn connect(config: DirectoryConfig) -> DirectoryResult<Self> {
        let result = Self::open_and_bind(&config).await;

        let conn = log_failure("connect", &config.host, result)?;
        info!(bind_dn = %config.bind_dn, "directory client bound");
        Ok(Self { config, conn })
    }

    async fn open_and_bind(config: &DirectoryConfig) -> DirectoryResult<DirectoryConnection> {
        config.validate()?;
        let conn = DirectoryConnection::open(config).await?;
        conn.bind(&config.bind_dn, &config.bind_password).await?;
        Ok(conn)
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Re-binds the connection with other credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the bind.
    #[instrument(skip(self, password))]
    pub async fn bind(&self, dn: &str, password: &str) -> DirectoryResult<()> {
        log_failure("bind", dn, self.conn.bind(dn, password).await)
    }

    /// Searches the subtree under `base` (or the configured base DN).
    ///
    /// An empty `attributes` list returns all user attributes. A search
    /// that matches nothing returns an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NoSuchObject`] if the base does not exist,
    /// [`DirectoryError::Search`] for other failures.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &str,
        base: Option<&str>,
        attributes: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        let base = base
            .filter(|b| !b.is_empty())
            .unwrap_or(self.config.base_dn.as_str());

        let result = self.run_search(base, filter, attributes).await;

        let entries = log_failure("search", filter, result)?;
        debug!(count = entries.len(), "search completed");
        Ok(entries)
    }

    async fn run_search(
        &self,
        base: &str,
        filter: &str,
        attributes: &[&str],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        let mut ldap = self.conn.handle().await?;
        let SearchResult(rs, res) = ldap
            .search(base, Scope::Subtree, filter, attributes.to_vec())
            .await
            .map_err(|e| {
                DirectoryError::classify(e, |e| DirectoryError::Search(e.to_string()))
            })?;

        match res.rc {
            0 => Ok(rs
                .into_iter()
                .map(SearchEntry::construct)
                .map(DirectoryEntry::from)
                .collect()),
            RC_NO_SUCH_OBJECT => Err(DirectoryError::NoSuchObject(base.to_string())),
            rc => Err(DirectoryError::Search(format!(
                "result code {rc} ({}) for filter {filter}",
                res.text
            ))),
        }
    }

    /// Returns the first entry under the base DN matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn first_entry(&self, filter: &str) -> DirectoryResult<Option<DirectoryEntry>> {
        Ok(self.search(filter, None, &[]).await?.into_iter().next())
    }

    /// Returns the DN of the first entry matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn get_dn(&self, filter: &str) -> DirectoryResult<Option<String>> {
        let entries = self.search(filter, None, &["1.1"]).await?;
        Ok(entries.into_iter().next().map(|e| e.dn))
    }

    /// Looks up a person by the configured login attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn find_user(&self, login: &str) -> DirectoryResult<Option<DirectoryEntry>> {
        self.first_entry(&self.config.user_by_login_filter(login))
            .await
    }

    /// Checks a person's password by binding as them on a separate
    /// connection. The client's own binding is left untouched.
    ///
    /// Returns `false` for an unknown login or wrong password.
    ///
    /// # Errors
    ///
    /// Returns an error for connection or search failures.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, login: &str, password: &str) -> DirectoryResult<bool> {
        if password.is_empty() {
            // An empty password would be an unauthenticated bind, which succeeds.
            return Ok(false);
        }
        let Some(user_dn) = self.get_dn(&self.config.user_by_login_filter(login)).await? else {
            debug!("no such user");
            return Ok(false);
        };

        let conn = DirectoryConnection::open(&self.config).await?;
        let outcome = match conn.bind(&user_dn, password).await {
            Ok(()) => Ok(true),
            Err(DirectoryError::InvalidCredentials(_)) => Ok(false),
            Err(e) => Err(e),
        };
        if let Err(e) = conn.close().await {
            debug!("closing authentication connection failed: {}", e);
        }
        log_failure("authenticate", &user_dn, outcome)
    }

    /// Adds a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::AlreadyExists`] if the DN is taken, or
    /// another error carrying the server's result code.
    #[instrument(skip(self, attributes))]
    pub async fn add(&self, dn: &str, attributes: &Attributes) -> DirectoryResult<()> {
        let result = async {
            let res = self.conn.handle().await?.add(dn, value_sets(attributes)).await?;
            check_result("add", dn, &res)
        }
        .await;

        log_failure("add", dn, result)?;
        info!(dn = %dn, "entry added");
        Ok(())
    }

    /// Replaces the values of each given attribute.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the server's result code.
    pub async fn modify(&self, dn: &str, attributes: &Attributes) -> DirectoryResult<()> {
        self.modify_with(dn, attributes, ModifyKind::Replace).await
    }

    /// Adds, deletes or replaces values of each given attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NoSuchObject`] if the entry does not
    /// exist, or another error carrying the server's result code.
    #[instrument(skip(self, attributes))]
    pub async fn modify_with(
        &self,
        dn: &str,
        attributes: &Attributes,
        kind: ModifyKind,
    ) -> DirectoryResult<()> {
        if attributes.is_empty() {
            debug!("no changes to apply");
            return Ok(());
        }

        let mods: Vec<Mod<&str>> = value_sets(attributes)
            .into_iter()
            .map(|(name, values)| match kind {
                ModifyKind::Add => Mod::Add(name, values),
                ModifyKind::Delete => Mod::Delete(name, values),
                ModifyKind::Replace => Mod::Replace(name, values),
            })
            .collect();

        let result = async {
            let res = self.conn.handle().await?.modify(dn, mods).await?;
            check_result("modify", dn, &res)
        }
        .await;

        log_failure("modify", dn, result)?;
        info!(dn = %dn, "entry modified");
        Ok(())
    }

    /// Deletes an entry.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NoSuchObject`] if the entry does not
    /// exist, or another error carrying the server's result code.
    #[instrument(skip(self))]
    pub async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        let result = async {
            let res = self.conn.handle().await?.delete(dn).await?;
            check_result("delete", dn, &res)
        }
        .await;

        log_failure("delete", dn, result)?;
        info!(dn = %dn, "entry deleted");
        Ok(())
    }

    /// Hashes `password` with `scheme` and stores it as `userPassword`.
    ///
    /// # Errors
    ///
    /// Returns an error if the modify fails.
    #[instrument(skip(self, password))]
    pub async fn set_password(
        &self,
        dn: &str,
        password: &str,
        scheme: PasswordScheme,
    ) -> DirectoryResult<()> {
        let hashed = ldapi_crypto::hash_password(password, scheme);
        let attributes = Attributes::from([("userPassword".to_string(), vec![hashed])]);
        self.modify(dn, &attributes).await
    }

    /// Formats a `userPassword` value; see [`ldapi_crypto::ldap_password`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown algorithm or a malformed pre-hashed
    /// MD5 digest.
    pub fn ldap_password(password: &str, algo: &str, pre_hashed: bool) -> CryptoResult<String> {
        ldapi_crypto::ldap_password(password, algo, pre_hashed)
    }

    /// Unbinds and releases the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the unbind request cannot be sent.
    pub async fn close(&self) -> DirectoryResult<()> {
        log_failure("close", &self.config.host, self.conn.close().await)
    }

    /// Returns true until [`close`](Self::close) is called.
    pub async fn is_open(&self) -> bool {
        self.conn.is_open().await
    }

    /// Parses a DN into attribute types grouped with their values.
    ///
    /// # Errors
    ///
    /// Returns an error if the DN is malformed.
    pub fn parse_dn(dn: &str) -> DirectoryResult<ParsedDn> {
        dn::parse_dn(dn)
    }

    /// Returns the first `ou` value of a DN.
    ///
    /// # Errors
    ///
    /// Returns an error if the DN is malformed.
    pub fn ou_rdn(dn: &str) -> DirectoryResult<Option<String>> {
        dn::ou_rdn(dn)
    }
}
