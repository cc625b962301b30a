//! Configuration for the tasklist binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::reducer::TodoEnvironment;
use crate::storage::{self, FileStorage, FileStore, JsonStorage, StorageError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tasklist_runtime::StoreConfig;
use thiserror::Error;

/// Directory for data files
pub const DATA_DIR_VAR: &str = "TASKLIST_DATA_DIR";
/// Storage key (file name without extension)
pub const STORAGE_KEY_VAR: &str = "TASKLIST_STORAGE_KEY";
/// Runtime feedback limit
pub const MAX_FEEDBACK_ACTIONS_VAR: &str = "TASKLIST_MAX_FEEDBACK_ACTIONS";

const DEFAULT_DATA_DIR: &str = "./.tasklist";

/// Errors from reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// What a valid value looks like
        expected: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the data file
    pub data_dir: PathBuf,
    /// Key the list is stored under
    pub storage_key: String,
    /// Cap on actions fed back by effects during one dispatch
    pub max_feedback_actions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: storage::DEFAULT_STORAGE_KEY.to_owned(),
            max_feedback_actions: StoreConfig::DEFAULT_MAX_FEEDBACK_ACTIONS,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Unset or empty variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unusable
    /// value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unusable
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let data_dir = get(DATA_DIR_VAR).map_or(defaults.data_dir, PathBuf::from);

        let storage_key = match get(STORAGE_KEY_VAR) {
            Some(key) => {
                storage::validate_key(&key).map_err(|_| ConfigError::Invalid {
                    var: STORAGE_KEY_VAR,
                    value: key.clone(),
                    expected: "ASCII letters, digits, '-' or '_'",
                })?;
                key
            },
            None => defaults.storage_key,
        };

        let max_feedback_actions = match get(MAX_FEEDBACK_ACTIONS_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::Invalid {
                    var: MAX_FEEDBACK_ACTIONS_VAR,
                    value: raw,
                    expected: "a positive integer",
                })?,
            None => defaults.max_feedback_actions,
        };

        Ok(Self {
            data_dir,
            storage_key,
            max_feedback_actions,
        })
    }

    /// Set the data directory
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the feedback limit
    #[must_use]
    pub const fn with_max_feedback_actions(mut self, limit: usize) -> Self {
        self.max_feedback_actions = limit;
        self
    }

    /// Runtime configuration
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.max_feedback_actions)
    }

    /// File-backed storage under `data_dir`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the storage key was set to an
    /// invalid value through [`Self::with_storage_key`].
    pub fn file_storage(&self) -> Result<FileStorage, StorageError> {
        JsonStorage::with_key(FileStore::new(&self.data_dir), &self.storage_key)
    }

    /// Production environment over [`Self::file_storage`]
    ///
    /// # Errors
    ///
    /// See [`Self::file_storage`].
    pub fn environment(&self) -> Result<TodoEnvironment, StorageError> {
        Ok(TodoEnvironment::production(Arc::new(self.file_storage()?)))
    }
}
