//! Persisted session identifier
//!
//! The agent API keys its conversational context on a caller-chosen user
//! id. One id is generated per installation, stored under a single key,
//! and reused for every request after that.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::Utc;
use tracing::debug;
use tracing::info;
use uuid::Uuid;

use crate::errors::FolioChatError;
use crate::errors::Result;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A persisted string-to-string slot
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Rc<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Key-value pairs kept in a single JSON object file
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&data).map_err(|err| {
            FolioChatError::SessionStore(format!("failed to parse {}: {err}", self.path.display()))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(entries)?;

        fs::write(&tmp_path, bytes)?;
        match fs::rename(&tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                    fs::rename(&tmp_path, &self.path)?;
                    Ok(())
                } else {
                    Err(rename_err.into())
                }
            }
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

/// Process-local store; forgets everything on exit
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read-or-create access to the session identifier
#[derive(Debug)]
pub struct SessionIdentity<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> SessionIdentity<K> {
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Return the stored id, generating and persisting one on first use
    pub fn user_id(&self) -> Result<String> {
        if let Some(existing) = self.store.get(&self.key)?.filter(|id| !id.is_empty()) {
            debug!("Using stored session id {}", existing);
            return Ok(existing);
        }

        let id = generate_user_id();
        self.store.set(&self.key, &id)?;
        info!("Created session id {}", id);
        Ok(id)
    }
}

/// `user_<unix millis>_<13 base-36 chars>`
pub fn generate_user_id() -> String {
    let random: String = Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(13)
        .map(|b| BASE36[usize::from(*b) % BASE36.len()] as char)
        .collect();
    format!("user_{}_{random}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let id = generate_user_id();
        let parts: Vec<_> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 13);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_identity_is_created_once() {
        let identity = SessionIdentity::new(MemoryKeyValueStore::new(), "uid");
        let first = identity.user_id().unwrap();
        let second = identity.user_id().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_identity_reads_existing_value() {
        let store = MemoryKeyValueStore::new();
        store.set("uid", "user_1_abc").unwrap();
        let identity = SessionIdentity::new(store, "uid");
        assert_eq!(identity.user_id().unwrap(), "user_1_abc");
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileKeyValueStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        let first = SessionIdentity::new(store, "uid").user_id().unwrap();
        let second = SessionIdentity::new(FileKeyValueStore::new(&path), "uid")
            .user_id()
            .unwrap();

        assert_eq!(first, second);
        assert!(path.exists());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("state.json"));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("c").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let err = FileKeyValueStore::new(&path).get("uid").unwrap_err();
        assert!(matches!(err, FolioChatError::SessionStore(_)));
    }
}
