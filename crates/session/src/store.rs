//! Durable key/value storage for token material.
//!
//! Pure storage: no validation, no expiry logic. Writes are visible to the
//! next read immediately. Writers in different processes are not coordinated;
//! the last write wins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

/// Keys the client persists.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const TOKEN_EXPIRY: &str = "token_expiry";
    pub const TOKEN_SECONDARY: &str = "token_secondary";
    pub const TOKEN_SECONDARY_EXPIRY: &str = "token_secondary_expiry";
    /// Lives in the browsing-session scoped store, not the persistent one.
    pub const INTENDED_URL: &str = "intendedUrl";

    /// Every key that makes up the credential set, cleared together on logout.
    pub const CREDENTIALS: [&str; 4] = [TOKEN, TOKEN_EXPIRY, TOKEN_SECONDARY, TOKEN_SECONDARY_EXPIRY];
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// A change applied by [`KeyValueStore::apply`]: `None` removes the key.
pub type Change<'a> = (&'a str, Option<String>);

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Apply all changes as one write.
    fn apply(&self, changes: &[Change<'_>]) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.apply(&[(key, Some(value.to_string()))])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.apply(&[(key, None)])
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

fn apply_changes(map: &mut BTreeMap<String, String>, changes: &[Change<'_>]) {
    for (key, value) in changes {
        match value {
            Some(v) => {
                map.insert((*key).to_string(), v.clone());
            }
            None => {
                map.remove(*key);
            }
        }
    }
}

/// Process-local store.
///
/// Used for the browsing-session scope and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn apply(&self, changes: &[Change<'_>]) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(|_| StoreError::Poisoned)?;
        apply_changes(&mut values, changes);
        Ok(())
    }
}

/// JSON-file-backed store that survives restarts.
///
/// The whole map is rewritten on each change (temp file + rename), so a crash
/// leaves either the old or the new file, never a torn one.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "opened session store");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_vec_pretty(values)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    /// The in-memory view is updated even when the disk write fails, so the
    /// running process never observes a half-applied batch.
    fn apply(&self, changes: &[Change<'_>]) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(|_| StoreError::Poisoned)?;
        apply_changes(&mut values, changes);
        self.persist(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_reads_see_writes() {
        let store = InMemoryStore::new();
        assert_eq!(store.get(keys::TOKEN), None);
        assert_eq!(store.get_or(keys::TOKEN, ""), "");

        store.set(keys::TOKEN, "abc").unwrap();
        assert_eq!(store.get(keys::TOKEN).as_deref(), Some("abc"));

        store.remove(keys::TOKEN).unwrap();
        assert_eq!(store.get(keys::TOKEN), None);
    }

    #[test]
    fn batch_applies_sets_and_removes() {
        let store = InMemoryStore::new();
        store.set(keys::TOKEN, "abc").unwrap();
        store
            .apply(&[(keys::TOKEN, None), (keys::TOKEN_EXPIRY, Some("5".into()))])
            .unwrap();
        assert_eq!(store.get(keys::TOKEN), None);
        assert_eq!(store.get(keys::TOKEN_EXPIRY).as_deref(), Some("5"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set(keys::TOKEN, "persisted").unwrap();
            store.set(keys::TOKEN_EXPIRY, "-1").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::TOKEN).as_deref(), Some("persisted"));
        assert_eq!(reopened.get(keys::TOKEN_EXPIRY).as_deref(), Some("-1"));
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Corrupt(_))));
    }
}
