//! In-process blob storage

use super::{KeyValueStore, Result, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory [`KeyValueStore`]
///
/// Clones share the same data, so a test can keep a handle to inspect what
/// was written. An optional quota caps the total bytes held across all keys,
/// the way browser local storage does.
///
/// # Example
///
/// ```
/// use tasklist::storage::{KeyValueStore, MemoryStore, StorageError};
///
/// let store = MemoryStore::with_quota(8);
/// store.set("a", "1234").unwrap();
/// assert!(matches!(
///     store.set("b", "123456"),
///     Err(StorageError::QuotaExceeded { needed: 10, quota: 8 })
/// ));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create a new empty store with no quota
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store holding at most `quota` bytes of values
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            data: Arc::default(),
            quota: Some(quota),
        }
    }

    /// Total bytes of all stored values
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the lock is poisoned.
    pub fn used_bytes(&self) -> Result<usize> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.values().map(String::len).sum())
    }

    /// Check if the store is empty
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.data.read().map_err(|_| poisoned())?.is_empty())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.data.write().map_err(|_| poisoned())?;

        if let Some(quota) = self.quota {
            let others: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_owned())
}
