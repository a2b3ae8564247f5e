//! Durable key-value storage boundary.
//!
//! The host environment provides the actual store (the browser's extension
//! storage in the real deployment, a JSON file for the CLI). The registry
//! only needs string get/set/remove; a store failure degrades to in-memory
//! operation for the session, it never takes the extension down.

use std::collections::HashMap;
use std::sync::Mutex;

use sg_core::types::ListKind;

/// Error from the durable store backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(String),
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Async-agnostic durable key-value store.
///
/// Implementations must survive process restarts; this is the sole
/// rehydration source on startup.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One backing store can be shared by several owners (registry, settings).
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// =============================================================================
// Storage Keys
// =============================================================================

/// Well-known storage keys.
pub mod keys {
    use super::ListKind;

    /// Timestamp of the last attempted refresh.
    pub const LAST_REFRESH: &str = "last_refresh_at";

    /// User settings document.
    pub const SETTINGS: &str = "settings";

    /// Cached record for one list.
    pub fn list(kind: ListKind) -> String {
        format!("list/{}", kind.as_str())
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store. Not durable; used in tests and as the fallback when a
/// durable backend cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").ok().flatten(), None);
        store.set("k", "v").ok();
        assert_eq!(store.get("k").ok().flatten().as_deref(), Some("v"));
        store.remove("k").ok();
        assert_eq!(store.get("k").ok().flatten(), None);
    }

    #[test]
    fn test_list_keys_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for kind in ListKind::ALL {
            assert!(seen.insert(keys::list(kind)));
        }
    }
}
