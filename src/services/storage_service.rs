use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Synchronous string key/value store. Every write is a full overwrite of one key.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw (still encoded) keys currently held.
    pub fn raw_keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// JSON object file rewritten on every mutation, so state outlives the process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens or creates the store file. A corrupt file is moved aside to
    /// `<name>.corrupt` and the store starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read(&path)?;
            if raw.iter().all(u8::is_ascii_whitespace) {
                BTreeMap::new()
            } else {
                match serde_json::from_slice(&raw) {
                    Ok(entries) => entries,
                    Err(e) => {
                        let aside = corrupt_path(&path);
                        warn!(
                            path = %path.display(),
                            moved_to = %aside.display(),
                            error = %e,
                            "Storage file is corrupt; starting empty"
                        );
                        if let Err(e) = std::fs::rename(&path, &aside) {
                            warn!(path = %path.display(), error = %e, "Could not move corrupt storage file aside");
                        }
                        BTreeMap::new()
                    }
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}

fn poisoned() -> Error {
    Error::Storage("store lock poisoned".to_string())
}

/// Key/value persistence with reversible base64 obfuscation of keys and values.
/// Not a security boundary: it only keeps the on-disk layout of older sessions.
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn KeyValueStore>,
    obfuscate: bool,
}

impl StorageService {
    pub fn new(store: Arc<dyn KeyValueStore>, obfuscate: bool) -> Self {
        Self { store, obfuscate }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), true)
    }

    fn encode(&self, raw: &str) -> String {
        if self.obfuscate {
            STANDARD.encode(raw.as_bytes())
        } else {
            raw.to_string()
        }
    }

    fn decode(&self, stored: &str) -> Result<String> {
        if !self.obfuscate {
            return Ok(stored.to_string());
        }
        let bytes = STANDARD.decode(stored.trim())?;
        String::from_utf8(bytes)
            .map_err(|e| Error::Storage(format!("stored value is not UTF-8: {}", e)))
    }

    pub fn save(&self, key: &str, value: &str) -> Result<()> {
        self.store.set_item(&self.encode(key), &self.encode(value))
    }

    /// Unreadable or undecodable values read as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let stored = match self.store.get_item(&self.encode(key)) {
            Ok(v) => v?,
            Err(e) => {
                warn!(key, kind = e.kind(), error = %e, "Storage read failed");
                return None;
            }
        };

        match self.decode(&stored) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, kind = e.kind(), error = %e, "Discarding undecodable stored value");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove_item(&self.encode(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let body = serde_json::to_string(value)?;
        self.save(key, &body)
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding corrupt persisted state");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscates_keys_and_values_like_btoa() {
        let store = Arc::new(MemoryStore::new());
        let storage = StorageService::new(store.clone(), true);

        storage.save("locale", "en").unwrap();

        assert_eq!(store.raw_keys(), vec!["bG9jYWxl".to_string()]);
        assert_eq!(store.get_item("bG9jYWxl").unwrap().as_deref(), Some("ZW4="));
        assert_eq!(storage.get("locale").as_deref(), Some("en"));
    }

    #[test]
    fn plain_mode_stores_values_verbatim() {
        let store = Arc::new(MemoryStore::new());
        let storage = StorageService::new(store.clone(), false);

        storage.save("quiz_timer_q1", "{}").unwrap();
        assert_eq!(store.get_item("quiz_timer_q1").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn remove_and_contains() {
        let storage = StorageService::in_memory();
        storage.save("k", "v").unwrap();
        assert!(storage.contains("k"));
        storage.remove("k").unwrap();
        assert!(!storage.contains("k"));
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn undecodable_value_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_item(&STANDARD.encode("broken"), "***not base64***")
            .unwrap();
        let storage = StorageService::new(store, true);
        assert_eq!(storage.get("broken"), None);
    }

    #[test]
    fn corrupt_json_reads_as_absent() {
        let storage = StorageService::in_memory();
        storage.save("quiz_progress_q1", "{not json").unwrap();
        let loaded: Option<serde_json::Value> = storage.load_json("quiz_progress_q1");
        assert!(loaded.is_none());
    }

    #[test]
    fn failing_store_degrades_reads_and_surfaces_writes() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get_item()
            .returning(|_| Err(Error::Storage("quota exceeded".into())));
        mock.expect_set_item()
            .returning(|_, _| Err(Error::Storage("quota exceeded".into())));

        let storage = StorageService::new(Arc::new(mock), true);
        assert_eq!(storage.get("key"), None);
        assert!(matches!(storage.save("key", "value"), Err(Error::Storage(_))));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let storage = StorageService::new(Arc::new(FileStore::open(&path).unwrap()), true);
            storage.save("quiz_timer_q1", "{\"elapsedTime\":1000}").unwrap();
        }

        let reopened = StorageService::new(Arc::new(FileStore::open(&path).unwrap()), true);
        assert_eq!(
            reopened.get("quiz_timer_q1").as_deref(),
            Some("{\"elapsedTime\":1000}")
        );
    }

    #[test]
    fn corrupt_file_store_starts_empty_and_keeps_the_evidence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let storage = StorageService::new(Arc::new(FileStore::open(&path).unwrap()), true);
        assert_eq!(storage.get("locale"), None);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("storage.json.corrupt")).unwrap(),
            "{ truncated"
        );

        storage.save("locale", "ar").unwrap();
        let reopened = StorageService::new(Arc::new(FileStore::open(&path).unwrap()), true);
        assert_eq!(reopened.get("locale").as_deref(), Some("ar"));
    }

    #[test]
    fn failed_flush_leaves_file_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = FileStore::open(blocker.join("storage.json")).unwrap();

        assert!(store.set_item("k", "v").is_err());
        assert_eq!(store.get_item("k").unwrap(), None);
    }
}
