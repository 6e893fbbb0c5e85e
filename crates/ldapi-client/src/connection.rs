//! Directory connection handling.
//!
//! A [`DirectoryConnection`] owns one `ldap3` connection. The connection
//! driver runs on a spawned task; operations clone the `Ldap` handle,
//! which multiplexes requests over that single connection.

use std::time::Duration;

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError};
use tokio::sync::Mutex;

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult, RC_INVALID_CREDENTIALS};

/// An open connection to a directory server.
pub struct DirectoryConnection {
    ldap: Mutex<Option<Ldap>>,
    operation_timeout: Duration,
}

impl std::fmt::Debug for DirectoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConnection")
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

impl DirectoryConnection {
    /// Opens a connection to the configured host without binding.
    ///
    /// The connection speaks LDAPv3 and does not chase referrals.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Connection`] if the server is unreachable
    /// or the TLS handshake fails, [`DirectoryError::Timeout`] if the
    /// connection timeout elapses first.
    pub async fn open(config: &DirectoryConfig) -> DirectoryResult<Self> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(config.connection_timeout())
            .set_starttls(config.starttls && !config.is_ldaps())
            .set_no_tls_verify(config.no_tls_verify);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &config.host)
            .await
            .map_err(|e| match e {
                LdapError::Timeout { .. } => DirectoryError::Timeout,
                e => DirectoryError::Connection(format!("{}: {e}", config.host)),
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!("LDAP connection driver error: {}", e);
            }
        });

        tracing::debug!(host = %config.host, "directory connection opened");

        Ok(Self {
            ldap: Mutex::new(Some(ldap)),
            operation_timeout: config.operation_timeout(),
        })
    }

    /// Returns a handle for one operation, with the operation timeout set.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Closed`] after [`close`](Self::close).
    pub async fn handle(&self) -> DirectoryResult<Ldap> {
        let guard = self.ldap.lock().await;
        let mut ldap = guard.as_ref().cloned().ok_or(DirectoryError::Closed)?;
        ldap.with_timeout(self.operation_timeout);
        Ok(ldap)
    }

    /// Authenticates the connection with a simple bind.
    ///
    /// An empty DN and password perform an anonymous bind.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidCredentials`] when the server
    /// rejects the credentials, [`DirectoryError::Bind`] for other failures.
    pub async fn bind(&self, dn: &str, password: &str) -> DirectoryResult<()> {
        let mut ldap = self.handle().await?;
        let result = ldap
            .simple_bind(dn, password)
            .await
            .map_err(|e| DirectoryError::classify(e, |e| DirectoryError::Bind(e.to_string())))?;

        match result.rc {
            0 => Ok(()),
            RC_INVALID_CREDENTIALS => Err(DirectoryError::InvalidCredentials(dn.to_string())),
            rc => Err(DirectoryError::Bind(format!(
                "result code {rc} ({})",
                result.text
            ))),
        }
    }

    /// Returns true until the connection is closed.
    pub async fn is_open(&self) -> bool {
        self.ldap.lock().await.is_some()
    }

    /// Unbinds and releases the connection.
    ///
    /// Closing an already closed connection is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the unbind request cannot be sent.
    pub async fn close(&self) -> DirectoryResult<()> {
        let ldap = self.ldap.lock().await.take();
        if let Some(mut ldap) = ldap {
            ldap.unbind().await?;
            tracing::debug!("directory connection closed");
        }
        Ok(())
    }
}

impl Drop for DirectoryConnection {
    fn drop(&mut self) {
        let Some(mut ldap) = self.ldap.get_mut().take() else {
            return;
        };
        // Unbind needs the runtime; without one the driver task is gone anyway.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = ldap.unbind().await {
                    tracing::debug!("unbind on drop failed: {}", e);
                }
            });
        }
    }
}
