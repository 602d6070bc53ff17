//! Session registry for authenticated automation clients.

use std::sync::Arc;

use igrest_core::{AutomationClient, ClientFactory, ConfigError, normalize_session_id};
use tokio::sync::Mutex;

use crate::storage::MemoryStore;

/// A stored client handle.
///
/// Lock it for the duration of an upstream call: one handle must not serve
/// two in-flight requests at once.
pub type SharedClient<C> = Arc<Mutex<C>>;

/// Session registry error.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Session not found; log in again to obtain a new session id")]
    SessionNotFound,
    #[error("Client has no usable session id")]
    InvalidHandle,
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Process-wide registry mapping session ids to authenticated clients.
///
/// Construct one at startup, share it behind an `Arc`, and clear it at
/// shutdown. Sessions live until removed, cleared, or the process exits;
/// nothing is persisted.
pub struct SessionRegistry<F>
where
    F: ClientFactory,
{
    factory: F,
    store: MemoryStore<F::Client>,
}

impl<F> SessionRegistry<F>
where
    F: ClientFactory,
{
    /// Create an empty registry over a client factory.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            store: MemoryStore::new(),
        }
    }

    /// The factory used for new clients.
    #[must_use]
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Create a fresh, unauthenticated client.
    ///
    /// The client is not stored; call [`set`](Self::set) once login succeeds.
    ///
    /// # Errors
    /// Returns error if the factory configuration is rejected.
    pub fn new_client(&self) -> Result<F::Client, RegistryError> {
        Ok(self.factory.create()?)
    }

    /// Look up the client for a session id.
    ///
    /// The id is trimmed and percent-decoded before lookup.
    ///
    /// # Errors
    /// Returns `SessionNotFound` if no client is stored under the id.
    pub fn get(&self, session_id: &str) -> Result<SharedClient<F::Client>, RegistryError> {
        let key = normalize_session_id(session_id).ok_or(RegistryError::SessionNotFound)?;
        self.store.get(&key).ok_or_else(|| {
            tracing::debug!("Session lookup missed");
            RegistryError::SessionNotFound
        })
    }

    /// Store an authenticated client under its own session id.
    ///
    /// Replaces any client already stored under the same id. Returns the
    /// normalized key.
    ///
    /// # Errors
    /// Returns `InvalidHandle` if the client carries no usable session id.
    pub fn set(&self, client: F::Client) -> Result<String, RegistryError> {
        let key = client
            .session_id()
            .and_then(normalize_session_id)
            .ok_or(RegistryError::InvalidHandle)?;

        let replaced = self
            .store
            .insert(key.clone(), Arc::new(Mutex::new(client)))
            .is_some();
        tracing::debug!(replaced, sessions = self.store.len(), "Stored session");

        Ok(key)
    }

    /// Remove a single session, returning its client.
    ///
    /// # Errors
    /// Returns `SessionNotFound` if no client is stored under the id.
    pub fn remove(&self, session_id: &str) -> Result<SharedClient<F::Client>, RegistryError> {
        let key = normalize_session_id(session_id).ok_or(RegistryError::SessionNotFound)?;
        self.store
            .remove(&key)
            .ok_or(RegistryError::SessionNotFound)
    }

    /// Drop every session, returning how many were stored.
    ///
    /// Logs out nobody upstream. Meant for controlled shutdown and tests; do
    /// not expose it to tenants.
    pub fn clear(&self) -> usize {
        let dropped = self.store.clear();
        tracing::info!(dropped, "Cleared session registry");
        dropped
    }

    /// Whether a session id is stored.
    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        normalize_session_id(session_id).is_some_and(|key| self.store.contains(&key))
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no session is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
