//! Shared clients keyed by configuration fingerprint.
//!
//! Callers that ask for a client with the same configuration get the same
//! bound connection. Concurrent first requests for one fingerprint wait on
//! a single connect.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tokio::sync::OnceCell;

use crate::client::DirectoryClient;
use crate::config::DirectoryConfig;
use crate::error::DirectoryResult;

type Slot = Arc<OnceCell<Arc<DirectoryClient>>>;

static GLOBAL: Lazy<ClientRegistry> = Lazy::new(ClientRegistry::new);

/// Registry of bound clients, one per configuration fingerprint.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<String, Slot>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the client for `config`, connecting and binding on first use.
    ///
    /// A client that has been closed is replaced by a new connection. A
    /// failed connect leaves no entry behind, so the next call retries.
    ///
    /// # Errors
    ///
    /// Returns the connect or bind error.
    pub async fn get_or_connect(
        &self,
        config: &DirectoryConfig,
    ) -> DirectoryResult<Arc<DirectoryClient>> {
        let key = config.fingerprint();
        let mut slot: Slot = self.clients.entry(key.clone()).or_default().clone();

        if let Some(existing) = slot.get() {
            if existing.is_open().await {
                return Ok(Arc::clone(existing));
            }
            tracing::debug!(host = %config.host, "replacing closed directory client");
            let stale = Arc::clone(&slot);
            self.clients.remove_if(&key, |_, s| Arc::ptr_eq(s, &stale));
            slot = self.clients.entry(key.clone()).or_default().clone();
        }

        let result = slot
            .get_or_try_init(|| async {
                DirectoryClient::connect(config.clone()).await.map(Arc::new)
            })
            .await
            .cloned();

        if result.is_err() {
            self.clients.remove_if(&key, |_, s| s.get().is_none());
        }
        result
    }

    /// Returns the client for `config` if one is already bound.
    #[must_use]
    pub fn get(&self, config: &DirectoryConfig) -> Option<Arc<DirectoryClient>> {
        self.clients
            .get(&config.fingerprint())
            .and_then(|slot| slot.get().cloned())
    }

    /// Evicts and closes the client for `config`.
    ///
    /// Returns whether a client was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the unbind fails; the client is evicted anyway.
    pub async fn remove(&self, config: &DirectoryConfig) -> DirectoryResult<bool> {
        let Some((_, slot)) = self.clients.remove(&config.fingerprint()) else {
            return Ok(false);
        };
        match slot.get() {
            Some(client) => {
                client.close().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Evicts and closes every client.
    pub async fn close_all(&self) {
        let keys: Vec<String> = self.clients.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, slot)) = self.clients.remove(&key) {
                if let Some(client) = slot.get() {
                    if let Err(e) = client.close().await {
                        tracing::warn!(error = %e, "closing directory client failed");
                    }
                }
            }
        }
    }

    /// Number of bound clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Returns true if no client is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
