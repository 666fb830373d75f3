//! Key-value backends for the JSON blobs.
//!
//! The repository only ever needs three operations on string blobs: get, put,
//! and remove by key. `MemoryStore` backs tests and ephemeral use; `FileStore`
//! keeps one `<key>.json` file per key in a data directory.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::StoreError;

/// Durable string storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Returns true if it existed.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly (cloning shares the same underlying storage).
#[derive(Clone, Default)]
pub struct MemoryStore {
    storage: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("memory store read"))?;
        Ok(storage.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("memory store write"))?;
        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("memory store write"))?;
        Ok(storage.remove(key).is_some())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// File-backed store: `{dir}/{key}.json`.
///
/// Writes go to a temp file in the same directory and are renamed into place,
/// so a crash mid-write leaves either the old blob or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The directory where blobs are stored.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map `key` to its blob file.
    ///
    /// Keys are percent-encoded, so any string (user ids with `@`, spaces, or
    /// non-ASCII text) maps to exactly one file name and never to a path
    /// separator. A leading `.` is encoded too, which keeps `.` and `..` out.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let encoded = urlencoding::encode(key);
        let name = match encoded.strip_prefix('.') {
            Some(rest) => format!("%2E{rest}"),
            None => encoded.into_owned(),
        };
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(value.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_put_and_get() {
        let store = MemoryStore::new();
        store.put("sessions", "[]").unwrap();
        assert_eq!(store.get("sessions").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn memory_get_missing_returns_none() {
        assert!(MemoryStore::new().get("missing").unwrap().is_none());
    }

    #[test]
    fn memory_put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", "1").unwrap();
        store.put("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn memory_remove() {
        let store = MemoryStore::new();
        store.put("k", "1").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn memory_clone_shares_storage() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.put("k", "shared").unwrap();
        assert_eq!(clone.get("k").unwrap().as_deref(), Some("shared"));
    }

    #[test]
    fn file_store_rejects_empty_key() {
        let store = FileStore {
            dir: PathBuf::from("/nonexistent"),
        };
        assert!(matches!(store.path_for(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn file_store_keys_stay_inside_dir() {
        let store = FileStore {
            dir: PathBuf::from("/data"),
        };
        for key in ["../etc/passwd", "a/b", "a\\b", ".", "..", ".hidden", "timer state"] {
            let path = store.path_for(key).unwrap();
            assert_eq!(path.parent(), Some(Path::new("/data")), "key {key:?}");
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(!name.starts_with('.'), "key {key:?} mapped to {name}");
        }
    }

    #[test]
    fn file_store_plain_keys_are_unchanged() {
        let store = FileStore {
            dir: PathBuf::from("/data"),
        };
        assert_eq!(
            store.path_for("timer_state_user-1").unwrap(),
            PathBuf::from("/data/timer_state_user-1.json")
        );
    }

    #[test]
    fn file_store_distinct_keys_get_distinct_files() {
        let store = FileStore {
            dir: PathBuf::from("/data"),
        };
        let keys = [".a", "%2Ea", "a b", "a%20b", "a+b", "a@b", "ユーザー"];
        let paths: std::collections::HashSet<_> =
            keys.iter().map(|k| store.path_for(k).unwrap()).collect();
        assert_eq!(paths.len(), keys.len());
    }
}
