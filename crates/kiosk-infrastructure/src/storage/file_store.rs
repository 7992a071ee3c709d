//! File-backed key-value store with atomic writes.
//!
//! Each key is stored as its own file inside one directory. Writes go to a
//! temporary sibling first and are renamed into place, so a reader never
//! observes a half-written document.

use std::fs::{self, File};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};

use kiosk_core::error::{KioskError, Result};
use kiosk_core::storage::KeyValueStore;

/// A directory of `<key>.json` files.
///
/// Provides:
/// - **Atomicity**: Every `set` is all-or-nothing via tmp file + atomic rename
/// - **Durability**: Explicit fsync before rename
///
/// Last write wins. Concurrent writers from several processes are not
/// coordinated.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to its file, rejecting anything that could escape the root.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(KioskError::validation(format!(
                "invalid storage key: '{}'",
                key
            )));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    /// Gets a temporary file path for atomic writes.
    fn temp_path(path: &Path) -> Result<PathBuf> {
        let parent = path
            .parent()
            .ok_or_else(|| KioskError::io("Path has no parent directory"))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| KioskError::io("Path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }

        let tmp_path = Self::temp_path(&path)?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &path)?;
        tracing::trace!("[FileKeyValueStore] Wrote '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("store"));

        store.set("cart.items", "[]").unwrap();
        assert_eq!(store.get("cart.items").unwrap().as_deref(), Some("[]"));

        store.set("cart.items", "[1]").unwrap();
        assert_eq!(store.get("cart.items").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());
        assert!(store.get("conversation.history").unwrap().is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("cart.items", "[]").unwrap();

        assert!(temp_dir.path().join("cart.items.json").exists());
        assert!(!temp_dir.path().join(".cart.items.json.tmp").exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, KioskError::Validation(_)), "key {:?}", key);
        }
    }
}
