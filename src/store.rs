//! Key-value preference storage.
//!
//! The engine persists exactly one preference, whether the overlay is
//! visible, but the store itself is a plain string-to-JSON map so hosts can
//! back it with whatever they already have.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Preference file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Preference file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preference store lock poisoned")]
    Poisoned,
}

/// Get/set access to persisted preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-memory store for tests and embedders without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object on disk, rewritten atomically on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `$XDG_STATE_HOME/overscribe/preferences.json`, falling back to the
    /// data directory where no state directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("overscribe").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(map).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut tmp = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)
                .map_err(io_err)?;
            tmp.write_all(&json).map_err(io_err)?;
            tmp.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value);
        self.write_map(&map)
    }
}

/// Typed access to the overlay visibility preference.
pub struct OverlayPreferences<S: PreferenceStore> {
    store: S,
    visibility_key: String,
    visible_by_default: bool,
}

impl<S: PreferenceStore> OverlayPreferences<S> {
    pub fn new(store: S, visibility_key: impl Into<String>, visible_by_default: bool) -> Self {
        Self {
            store,
            visibility_key: visibility_key.into(),
            visible_by_default,
        }
    }

    /// Stored visibility, or the default when unset, unreadable or not a bool.
    pub fn overlay_visible(&self) -> bool {
        match self.store.get(&self.visibility_key) {
            Ok(Some(Value::Bool(visible))) => visible,
            Ok(Some(other)) => {
                log::warn!(
                    "Ignoring non-boolean value {} for '{}'",
                    other,
                    self.visibility_key
                );
                self.visible_by_default
            }
            Ok(None) => self.visible_by_default,
            Err(e) => {
                log::warn!("Failed to read overlay visibility: {}", e);
                self.visible_by_default
            }
        }
    }

    pub fn set_overlay_visible(&self, visible: bool) -> Result<(), StoreError> {
        log::debug!("Persisting {} = {}", self.visibility_key, visible);
        self.store.set(&self.visibility_key, Value::Bool(visible))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", Value::Bool(true)).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn json_store_persists_across_instances() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("prefs.json");

        JsonFileStore::new(&path)
            .set("overlay.visible", Value::Bool(false))
            .unwrap();
        JsonFileStore::new(&path)
            .set("other", Value::from(3))
            .unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(
            store.get("overlay.visible").unwrap(),
            Some(Value::Bool(false))
        );
        assert_eq!(store.get("other").unwrap(), Some(Value::from(3)));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");
        fs::write(&path, b"{not json").unwrap();

        let err = JsonFileStore::new(&path).get("x").unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn overlay_preferences_default_and_update() {
        let prefs = OverlayPreferences::new(MemoryStore::new(), "overlay.visible", true);
        assert!(prefs.overlay_visible());

        prefs.set_overlay_visible(false).unwrap();
        assert!(!prefs.overlay_visible());
    }

    #[test]
    fn overlay_preferences_ignore_wrong_type() {
        let store = MemoryStore::new();
        store.set("overlay.visible", Value::from("yes")).unwrap();
        let prefs = OverlayPreferences::new(store, "overlay.visible", false);
        assert!(!prefs.overlay_visible());
    }
}
