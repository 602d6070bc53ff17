//! In-memory handle storage.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tokio::sync::Mutex;

type Table<C> = HashMap<String, Arc<Mutex<C>>>;

/// In-memory table of client handles keyed by normalized session id.
///
/// Handles are wrapped in an async mutex so callers can serialize network
/// calls on one handle. The table lock itself is only held for map access and
/// never across an await point. Data is lost on restart.
pub struct MemoryStore<C> {
    handles: RwLock<Table<C>>,
}

impl<C> MemoryStore<C> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
        }
    }

    // Map operations never leave the table half-written.
    fn read(&self) -> RwLockReadGuard<'_, Table<C>> {
        self.handles.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovering session table after a panicked writer");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table<C>> {
        self.handles.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovering session table after a panicked writer");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Get a handle by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<Mutex<C>>> {
        self.read().get(key).cloned()
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Insert or replace a handle, returning the previous one.
    pub fn insert(&self, key: String, handle: Arc<Mutex<C>>) -> Option<Arc<Mutex<C>>> {
        self.write().insert(key, handle)
    }

    /// Remove a handle by key.
    pub fn remove(&self, key: &str) -> Option<Arc<Mutex<C>>> {
        self.write().remove(key)
    }

    /// Drop every handle, returning how many were stored.
    pub fn clear(&self) -> usize {
        let mut handles = self.write();
        let dropped = handles.len();
        handles.clear();
        dropped
    }

    /// Number of stored handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<C> Default for MemoryStore<C> {
    fn default() -> Self {
        Self::new()
    }
}
