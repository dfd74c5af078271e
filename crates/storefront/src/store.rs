//! Durable key/value storage for cart and catalog state.
//!
//! The store is deliberately forgiving: absent keys, unreadable files and
//! malformed payloads all degrade to "no value". Callers treat a missing
//! value as empty state and carry on; losing a cached catalog costs one
//! refetch, while an error here would cost the whole subsystem.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Durable key/value layer that survives process restarts.
///
/// Implementations never surface errors to the caller: a failed read is an
/// absent value, a failed write is logged and dropped.
pub trait PersistentStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// File-backed store: one file per key under a data directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read persisted value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "failed to create data directory");
            return;
        }
        if let Err(e) = fs::write(self.path(key), value) {
            warn!(key, error = %e, "failed to persist value");
        }
    }

    fn remove(&self, key: &str) {
        match fs::remove_file(self.path(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "failed to remove persisted value"),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.get("cart"), None);
        store.set("cart", "[]");
        assert_eq!(store.get("cart").as_deref(), Some("[]"));
        store.set("cart", r#"[{"x":1}]"#);
        assert_eq!(store.get("cart").as_deref(), Some(r#"[{"x":1}]"#));
    }

    #[test]
    fn test_file_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("cart", "[]");
        store.remove("cart");
        assert_eq!(store.get("cart"), None);
        // Removing again must not log-and-fail differently or panic.
        store.remove("cart");
    }

    #[test]
    fn test_file_store_creates_directory_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("profile").join("data");
        let store = FileStore::new(&nested);

        store.set("catalog_fetched_at", "1722470400000");
        assert_eq!(
            store.get("catalog_fetched_at").as_deref(),
            Some("1722470400000")
        );
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path());
            store.set("cart", "[1,2,3]");
        }
        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get("cart").as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_path_is_scoped_to_dir() {
        let store = FileStore::new(Path::new("/data"));
        assert_eq!(store.path("cart"), Path::new("/data/cart"));
    }
}
