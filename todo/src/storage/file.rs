//! On-disk blob storage

use super::{KeyValueStore, Result, validate_key};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// [`KeyValueStore`] keeping each key in `<dir>/<key>.json`
///
/// The directory is created on first write. Writes go to a sibling temp file
/// that is then renamed over the target, so a crash mid-write leaves the
/// previous value intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store files under `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory files are kept in
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    ///
    /// # Errors
    ///
    /// Returns [`super::StorageError::InvalidKey`] for keys that could escape
    /// the directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::trace!(path = %path.display(), bytes = value.len(), "Wrote file");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("todos").unwrap(), None);
    }

    #[test]
    fn set_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("data"));

        store.set("todos", "[]").unwrap();

        let path = store.path_for("todos").unwrap();
        assert!(path.ends_with("nested/data/todos.json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn set_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("todos", "[1,2,3]").unwrap();
        store.set("todos", "[]").unwrap();
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn remove_deletes_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("todos", "[]").unwrap();

        store.remove("todos").unwrap();
        assert_eq!(store.get("todos").unwrap(), None);
        store.remove("todos").unwrap();
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.set("../outside", "[]"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
