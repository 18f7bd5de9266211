//! Durable preferences and favorites.
//!
//! [`KeyValueStore`] is the storage capability; [`PreferenceStore`] layers the
//! dashboard's persisted records on top of it. Reads never fail: unreadable
//! data degrades to defaults. Writes propagate their errors to the caller.

use std::{collections::BTreeMap, fs, path::PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::{
    error::StorageError,
    model::{Location, MAX_FAVORITES, Preferences},
};

pub const FAVORITES_KEY: &str = "wnp-favorites-v1";
pub const PREFERENCES_KEY: &str = "wnp-prefs-v1";

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys stored as string entries of one JSON object on disk.
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

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();

        let mut document = self.read_document().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable state file: {}", e);
            BTreeMap::new()
        });
        document.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }
}

/// Preferences and favorites persisted through a [`KeyValueStore`].
#[derive(Debug)]
pub struct PreferenceStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Stored preferences, or metric defaults when absent or unreadable.
    pub fn load(&self) -> Preferences {
        self.read_or_default(PREFERENCES_KEY)
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), StorageError> {
        self.backend.set(PREFERENCES_KEY, &serde_json::to_string(prefs)?)
    }

    /// Stored favorites, most recent first. Unreadable data yields an empty list.
    pub fn load_favorites(&self) -> Vec<Location> {
        self.read_or_default(FAVORITES_KEY)
    }

    /// Inserts at the front unless an entry with the same (name, country)
    /// exists. The list is persisted either way.
    pub fn add_favorite(&self, location: &Location) -> Result<Vec<Location>, StorageError> {
        let mut list = self.load_favorites();
        if !list.iter().any(|f| f.same_favorite_key(location)) {
            list.insert(0, location.clone());
        }
        list.truncate(MAX_FAVORITES);
        self.write_favorites(&list)?;
        Ok(list)
    }

    /// Removes every entry with the same (name, country).
    pub fn remove_favorite(&self, location: &Location) -> Result<Vec<Location>, StorageError> {
        let mut list = self.load_favorites();
        list.retain(|f| !f.same_favorite_key(location));
        self.write_favorites(&list)?;
        Ok(list)
    }

    fn write_favorites(&self, list: &[Location]) -> Result<(), StorageError> {
        self.backend.set(FAVORITES_KEY, &serde_json::to_string(list)?)
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!("Falling back to defaults for '{}': {}", key, e);
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Stored value for '{}' is malformed, using defaults: {}", key, e);
            T::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitSystem;

    fn city(name: &str, country: &str, latitude: f64) -> Location {
        Location {
            id: None,
            name: name.into(),
            country: Some(country.into()),
            latitude,
            longitude: 0.0,
            timezone: None,
        }
    }

    fn store() -> PreferenceStore<MemoryStore> {
        PreferenceStore::new(MemoryStore::new())
    }

    #[test]
    fn preferences_default_to_metric() {
        let prefs = store().load();
        assert_eq!(prefs.unit, UnitSystem::Metric);
        assert_eq!(prefs.theme, None);
    }

    #[test]
    fn preferences_roundtrip() {
        let store = store();
        for prefs in [
            Preferences::default(),
            Preferences {
                unit: UnitSystem::Imperial,
                theme: Some("dark".into()),
            },
            Preferences {
                unit: UnitSystem::Metric,
                theme: Some("solarized".into()),
            },
        ] {
            store.save(&prefs).unwrap();
            assert_eq!(store.load(), prefs);
        }
    }

    #[test]
    fn preferences_use_versioned_key() {
        let store = store();
        store
            .save(&Preferences {
                unit: UnitSystem::Imperial,
                theme: None,
            })
            .unwrap();
        let raw = store.backend().get(PREFERENCES_KEY).unwrap();
        assert_eq!(raw.as_deref(), Some(r#"{"unit":"imperial"}"#));
    }

    #[test]
    fn malformed_preferences_fall_back() {
        let store = store();
        store.backend().set(PREFERENCES_KEY, r#"{"unit":"kelvin"}"#).unwrap();
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn missing_unit_keeps_stored_theme() {
        let store = store();
        store.backend().set(PREFERENCES_KEY, r#"{"theme":"dark"}"#).unwrap();
        let prefs = store.load();
        assert_eq!(prefs.unit, UnitSystem::Metric);
        assert_eq!(prefs.theme.as_deref(), Some("dark"));
    }

    #[test]
    fn malformed_favorites_yield_empty_list() {
        let store = store();
        store.backend().set(FAVORITES_KEY, "not json").unwrap();
        assert!(store.load_favorites().is_empty());
    }

    #[test]
    fn adding_twice_keeps_one_entry() {
        let store = store();
        let paris = city("Paris", "France", 48.86);

        store.add_favorite(&paris).unwrap();
        let list = store.add_favorite(&paris).unwrap();

        assert_eq!(list, vec![paris.clone()]);
        assert_eq!(store.load_favorites(), vec![paris]);
    }

    #[test]
    fn duplicate_key_ignores_latitude() {
        let store = store();
        store.add_favorite(&city("Springfield", "US", 39.8)).unwrap();
        let list = store.add_favorite(&city("Springfield", "US", 42.1)).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].latitude, 39.8);
    }

    #[test]
    fn eleventh_favorite_evicts_oldest() {
        let store = store();
        for i in 0..11 {
            store
                .add_favorite(&city(&format!("City {i}"), "Nowhere", f64::from(i)))
                .unwrap();
        }

        let list = store.load_favorites();
        assert_eq!(list.len(), MAX_FAVORITES);
        assert_eq!(list[0].name, "City 10");
        assert_eq!(list[9].name, "City 1");
        assert!(!list.iter().any(|f| f.name == "City 0"));
    }

    #[test]
    fn remove_drops_all_matching_entries() {
        let store = store();
        let tokyo = city("Tokyo", "Japan", 35.68);
        let twin = city("Tokyo", "Japan", 35.0);
        let paris = city("Paris", "France", 48.86);
        store
            .backend()
            .set(
                FAVORITES_KEY,
                &serde_json::to_string(&[tokyo.clone(), paris.clone(), twin]).unwrap(),
            )
            .unwrap();

        let list = store.remove_favorite(&tokyo).unwrap();
        assert_eq!(list, vec![paris.clone()]);
        assert_eq!(store.load_favorites(), vec![paris]);
    }
}
