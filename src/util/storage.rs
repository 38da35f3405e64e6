//! Key/value storage scopes backing the persisted auth records.
//!
//! SYSTEM CONTEXT
//! ==============
//! The coordinator persists to two scopes: a short-lived per-tab scope
//! (`sessionStorage`) and a durable cross-tab scope (`localStorage`). Both
//! sit behind [`Storage`] so native builds and tests can use
//! [`MemoryStorage`], and several coordinators can share one map to stand in
//! for several tabs of the same origin.
//!
//! Browser storage can refuse writes (quota, privacy mode). Those failures are
//! logged and dropped; every reader already treats a missing key as "nothing
//! cached".

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// String key/value store with web-storage semantics.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

pub type SharedStorage = Arc<dyn Storage>;

/// The two persisted scopes used by the coordinator.
#[derive(Clone)]
pub struct StorageScopes {
    /// Short-lived, per-tab scope.
    pub session: SharedStorage,
    /// Durable scope shared by same-origin tabs.
    pub local: SharedStorage,
}

impl StorageScopes {
    pub fn new(session: SharedStorage, local: SharedStorage) -> Self {
        Self { session, local }
    }

    /// Two independent in-memory scopes.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()), Arc::new(MemoryStorage::default()))
    }

    /// `sessionStorage` + `localStorage` of the current window.
    #[cfg(feature = "hydrate")]
    pub fn browser() -> Self {
        Self::new(
            Arc::new(BrowserStorage::new(StorageKind::Session)),
            Arc::new(BrowserStorage::new(StorageKind::Local)),
        )
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

// =============================================================================
// BROWSER
// =============================================================================

#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Session,
    Local,
}

/// Web storage looked up on every call.
///
/// Holding no `web_sys` handle keeps this `Send + Sync`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug)]
pub struct BrowserStorage {
    kind: StorageKind,
}

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    pub fn new(kind: StorageKind) -> Self {
        Self { kind }
    }

    fn storage(self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        let storage = match self.kind {
            StorageKind::Session => window.session_storage(),
            StorageKind::Local => window.local_storage(),
        };
        storage.ok().flatten()
    }
}

#[cfg(feature = "hydrate")]
impl Storage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = self.storage() else {
            return;
        };
        if storage.set_item(key, value).is_err() {
            log::warn!("storage write refused: kind={:?} key={key}", self.kind);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = self.storage() {
            let _ = storage.remove_item(key);
        }
    }
}

// =============================================================================
// JSON HELPERS
// =============================================================================

/// Load a JSON value stored under `key`; corrupt entries read as absent.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("ignoring unreadable storage entry: key={key} error={e}");
            None
        }
    }
}

/// Save a JSON value under `key`.
pub fn save_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => storage.set(key, &raw),
        Err(e) => log::warn!("failed to encode storage entry: key={key} error={e}"),
    }
}
