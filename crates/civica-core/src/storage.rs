//! Key/value storage port.
//!
//! The ledger, tracking store, and session store all persist JSON blobs
//! through this trait instead of touching the filesystem directly, so tests
//! run against [`MemoryStorage`] and production uses [`FileStorage`] rooted
//! in the project's `.civica/state/` directory.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// String-keyed blob storage. Each value is one JSON document.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage for tests and fakes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// File-backed storage: one `<key>.json` file per key under `dir`.
///
/// Writes are whole-value replacement, matching the read-modify-write
/// semantics the stores expect. Concurrent writers are last-write-wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::Storage(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| Error::Storage(format!("cannot write {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "cannot remove {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStorage, MemoryStorage, Storage};

    #[test]
    fn memory_storage_round_trips() {
        let storage = MemoryStorage::new();
        assert!(storage.get("user").expect("get").is_none());

        storage.set("user", r#"{"name":"alice"}"#).expect("set");
        assert_eq!(
            storage.get("user").expect("get"),
            Some(r#"{"name":"alice"}"#.to_string())
        );

        storage.remove("user").expect("remove");
        assert!(storage.get("user").expect("get").is_none());
    }

    #[test]
    fn file_storage_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path()).expect("open");

        storage.set("issue_tracking", "{}").expect("set");
        assert_eq!(
            storage.get("issue_tracking").expect("get"),
            Some("{}".to_string())
        );

        // A fresh handle over the same directory sees the same data.
        let reopened = FileStorage::open(dir.path()).expect("reopen");
        assert_eq!(
            reopened.get("issue_tracking").expect("get"),
            Some("{}".to_string())
        );

        reopened.remove("issue_tracking").expect("remove");
        assert!(storage.get("issue_tracking").expect("get").is_none());
    }

    #[test]
    fn removing_a_missing_key_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(dir.path()).expect("open");
        storage.remove("nope").expect("remove absent key");
    }
}
