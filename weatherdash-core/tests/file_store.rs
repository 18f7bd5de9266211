//! JsonFileStore persistence across store instances.

use std::fs;

use weatherdash_core::{
    JsonFileStore, KeyValueStore, Location, PreferenceStore, Preferences, UnitSystem,
    storage::FAVORITES_KEY,
};

fn lisbon() -> Location {
    Location {
        id: Some(2267057),
        name: "Lisbon".into(),
        country: Some("Portugal".into()),
        latitude: 38.72,
        longitude: -9.13,
        timezone: Some("Europe/Lisbon".into()),
    }
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");

    {
        let store = PreferenceStore::new(JsonFileStore::new(&path));
        store
            .save(&Preferences {
                unit: UnitSystem::Imperial,
                theme: Some("dark".into()),
            })
            .unwrap();
        store.add_favorite(&lisbon()).unwrap();
    }

    let reopened = PreferenceStore::new(JsonFileStore::new(&path));
    assert_eq!(reopened.load().unit, UnitSystem::Imperial);
    assert_eq!(reopened.load().theme.as_deref(), Some("dark"));

    let favorites = reopened.load_favorites();
    assert_eq!(favorites, vec![lisbon()]);
    assert_eq!(favorites[0].id, Some(2267057));
    assert_eq!(favorites[0].timezone.as_deref(), Some("Europe/Lisbon"));
}

#[test]
fn test_missing_file_reads_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = PreferenceStore::new(JsonFileStore::new(dir.path().join("absent.json")));

    assert_eq!(store.load(), Preferences::default());
    assert!(store.load_favorites().is_empty());
}

#[test]
fn test_corrupt_file_reads_as_defaults_and_is_replaced_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "{ definitely not json").unwrap();

    let store = PreferenceStore::new(JsonFileStore::new(&path));
    assert_eq!(store.load(), Preferences::default());
    assert!(store.load_favorites().is_empty());

    store.add_favorite(&lisbon()).unwrap();
    assert_eq!(store.load_favorites(), vec![lisbon()]);
}

#[test]
fn test_malformed_entry_only_affects_its_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let backend = JsonFileStore::new(&path);
    backend.set(FAVORITES_KEY, "not json").unwrap();

    let store = PreferenceStore::new(backend);
    store
        .save(&Preferences {
            unit: UnitSystem::Imperial,
            theme: None,
        })
        .unwrap();

    assert!(store.load_favorites().is_empty());
    assert_eq!(store.load().unit, UnitSystem::Imperial);
}
