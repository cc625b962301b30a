//! Persistence for the todo list.
//!
//! Two layers:
//!
//! - [`KeyValueStore`]: a string blob store keyed by name. [`MemoryStore`]
//!   and [`FileStore`] implement it.
//! - [`TodoStorage`]: load, save, and clear the whole list. [`JsonStorage`]
//!   implements it over any [`KeyValueStore`] by keeping the list as a JSON
//!   array under a single key.
//!
//! Everything here reports failures as [`StorageError`]. Deciding what a
//! failure means for the running session is left to the caller.

use crate::types::Todo;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key the list is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Errors that can occur while reading or writing persisted data
#[derive(Error, Debug)]
pub enum StorageError {
    /// The underlying file system failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be parsed, or the list could not be encoded
    #[error("Malformed data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Writing would exceed the backend's capacity
    #[error("Quota exceeded: {needed} bytes needed, {quota} available")]
    QuotaExceeded {
        /// Bytes the backend would hold after the write
        needed: usize,
        /// Capacity of the backend in bytes
        quota: usize,
    },

    /// Storage keys are limited to ASCII letters, digits, `-` and `_`
    #[error("Invalid storage key {0:?}")]
    InvalidKey(String),

    /// Any other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Checks that `key` is usable with every backend
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] if `key` is empty or contains
/// anything besides ASCII alphanumerics, `-` and `_`.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

/// String blob storage keyed by name
///
/// The same shape as browser local storage: each key holds one opaque
/// string, and a write replaces the previous value wholesale.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key succeeds
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Whole-list persistence for todos
pub trait TodoStorage: Send + Sync {
    /// Read the persisted list
    ///
    /// Returns an empty list when nothing has been saved yet. Elements that
    /// do not decode as a todo are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Malformed`] if the stored data is not a JSON
    /// array, or the backend's error if it cannot be read.
    fn load(&self) -> Result<Vec<Todo>>;

    /// Replace the persisted list with `todos`
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the write fails.
    fn save(&self, todos: &[Todo]) -> Result<()>;

    /// Remove all persisted data
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the removal fails.
    fn clear(&self) -> Result<()>;
}

/// [`TodoStorage`] that keeps the list as a JSON array under one key
#[derive(Clone, Debug)]
pub struct JsonStorage<B> {
    backend: B,
    key: String,
}

impl<B: KeyValueStore> JsonStorage<B> {
    /// Store under [`DEFAULT_STORAGE_KEY`]
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }

    /// Store under a custom key
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if `key` fails [`validate_key`].
    pub fn with_key(backend: B, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { backend, key })
    }

    /// The key the list is stored under
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying blob store
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: KeyValueStore> TodoStorage for JsonStorage<B> {
    fn load(&self) -> Result<Vec<Todo>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            tracing::debug!(key = %self.key, "No persisted todos");
            return Ok(Vec::new());
        };

        // An empty blob is what a cleared or truncated entry looks like
        if raw.trim().is_empty() {
            tracing::debug!(key = %self.key, "Persisted todos are empty");
            return Ok(Vec::new());
        }

        // Only the outer array must parse; unreadable elements are dropped
        let items: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
        let stored = items.len();
        let todos: Vec<Todo> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(todo) => Some(todo),
                Err(error) => {
                    tracing::warn!(
                        key = %self.key,
                        index,
                        %error,
                        "Dropping unreadable stored todo"
                    );
                    None
                },
            })
            .collect();
        tracing::debug!(
            key = %self.key,
            count = todos.len(),
            dropped = stored - todos.len(),
            "Loaded todos"
        );
        Ok(todos)
    }

    fn save(&self, todos: &[Todo]) -> Result<()> {
        let raw = serde_json::to_string(todos)?;
        self.backend.set(&self.key, &raw)?;
        tracing::debug!(
            key = %self.key,
            count = todos.len(),
            bytes = raw.len(),
            "Saved todos"
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.backend.remove(&self.key)
    }
}

/// JSON storage in process memory
pub type MemoryStorage = JsonStorage<MemoryStore>;

/// JSON storage in files on disk
pub type FileStorage = JsonStorage<FileStore>;
