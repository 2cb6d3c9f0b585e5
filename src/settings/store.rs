use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Section, SettingsDocument, SettingsError, SettingsSection};
use crate::storage::KeyValueStore;

/// Storage slot holding the serialized settings document
pub const SETTINGS_KEY: &str = "devtab-settings";

/// Standalone slots written by older builds, and the field each one feeds
const LEGACY_KEYS: [(&str, Section, &str); 3] = [
    ("github_username", Section::Github, "username"),
    ("weatherLocation", Section::Weather, "location"),
    ("tempatureScale", Section::Weather, "tempScale"),
];

/// Single source of truth for widget settings
///
/// Every mutation updates the in-memory document first and then writes the
/// whole document to storage. If that write fails the error is returned and
/// the in-memory change is kept.
pub struct SettingsStore {
    storage: Arc<dyn KeyValueStore>,
    document: SettingsDocument,
}

impl SettingsStore {
    /// Opens the store and loads the persisted document.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let document = read_document(storage.as_ref());
        Self { storage, document }
    }

    /// Reloads the document from storage, merged over the defaults.
    ///
    /// Never fails: a missing, unreadable or unparsable slot yields the
    /// default document.
    pub fn load(&mut self) -> &SettingsDocument {
        self.document = read_document(self.storage.as_ref());
        &self.document
    }

    pub fn document(&self) -> &SettingsDocument {
        &self.document
    }

    /// Typed view of one section
    pub fn section<S: SettingsSection>(&self) -> S {
        self.document.section()
    }

    /// Shallow-merges `partial` into `section` and persists.
    ///
    /// `partial` must be a JSON object; an empty object changes nothing but
    /// still re-persists the document.
    pub fn update_section(
        &mut self,
        section: Section,
        partial: Value,
    ) -> Result<&SettingsDocument, SettingsError> {
        let Value::Object(fields) = partial else {
            return Err(SettingsError::NotAnObject(format!("section '{}'", section)));
        };
        log::debug!("updating settings section '{}': {:?}", section, fields);
        self.document.merge_section(section, fields);
        self.persist()?;
        Ok(&self.document)
    }

    /// Sets a single field of `section` and persists.
    pub fn update_setting(
        &mut self,
        section: Section,
        field: &str,
        value: Value,
    ) -> Result<&SettingsDocument, SettingsError> {
        let mut partial = Map::new();
        partial.insert(field.to_string(), value);
        self.update_section(section, Value::Object(partial))
    }

    /// Replaces `section` with its default and persists.
    pub fn reset_section(&mut self, section: Section) -> Result<&SettingsDocument, SettingsError> {
        self.document.replace_section(section, section.default_value());
        self.persist()?;
        Ok(&self.document)
    }

    /// Replaces the whole document with the defaults and persists.
    pub fn reset_all(&mut self) -> Result<&SettingsDocument, SettingsError> {
        self.document = SettingsDocument::default();
        self.persist()?;
        Ok(&self.document)
    }

    /// Pretty-printed JSON of the current document
    pub fn export_json(&self) -> String {
        self.document.to_pretty_json()
    }

    /// Replaces the document with `text` and persists.
    ///
    /// The imported document is taken as-is: sections it lacks stay absent
    /// until the next [`load`](Self::load). On a parse error the current
    /// document is left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<&SettingsDocument, SettingsError> {
        let parsed: Value = serde_json::from_str(text)?;
        let Value::Object(sections) = parsed else {
            return Err(SettingsError::NotAnObject("imported settings".to_string()));
        };
        self.document = SettingsDocument::from_map(sections);
        self.persist()?;
        Ok(&self.document)
    }

    /// Moves values from the standalone slots older builds used into the
    /// document.
    ///
    /// A legacy value is adopted only when the document field is absent or
    /// empty. Returns whether anything changed.
    pub fn adopt_legacy_keys(&mut self) -> Result<bool, SettingsError> {
        let mut adopted = false;
        for (legacy_key, section, field) in LEGACY_KEYS {
            let current = self.document.get(section).and_then(|value| value.get(field));
            let is_unset = match current {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            if !is_unset {
                continue;
            }

            let legacy = match self.storage.get(legacy_key) {
                Ok(Some(value)) if !value.is_empty() => value,
                Ok(_) => continue,
                Err(e) => {
                    log::warn!("could not read legacy slot '{}': {}", legacy_key, e);
                    continue;
                }
            };

            log::info!("adopting legacy '{}' into {}.{}", legacy_key, section, field);
            let mut partial = Map::new();
            partial.insert(field.to_string(), Value::String(legacy));
            self.document.merge_section(section, partial);
            adopted = true;
        }

        if adopted {
            self.persist()?;
        }
        Ok(adopted)
    }

    fn persist(&self) -> Result<(), SettingsError> {
        self.storage.set(SETTINGS_KEY, &self.document.to_json())?;
        Ok(())
    }
}

/// Reads the stored document, falling back to defaults on any failure.
fn read_document(storage: &dyn KeyValueStore) -> SettingsDocument {
    let text = match storage.get(SETTINGS_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return SettingsDocument::default(),
        Err(e) => {
            log::warn!("could not read settings, using defaults: {}", e);
            return SettingsDocument::default();
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(stored)) => SettingsDocument::merged_over_defaults(stored),
        Ok(_) => {
            log::warn!("stored settings are not a JSON object, using defaults");
            SettingsDocument::default()
        }
        Err(e) => {
            log::warn!("error parsing saved settings, using defaults: {}", e);
            SettingsDocument::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ClockSettings, TempScale, WeatherSettings};
    use crate::storage::{FileStore, MemoryStore, StorageError};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (SettingsStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let store = SettingsStore::open(storage.clone());
        (store, storage)
    }

    fn stored_document(storage: &MemoryStore) -> Value {
        let text = storage.get(SETTINGS_KEY).unwrap().expect("settings should be persisted");
        serde_json::from_str(&text).unwrap()
    }

    /// Storage whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDirectory)
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_load_empty_storage_yields_defaults() {
        let (mut store, storage) = create_test_store();

        assert_eq!(store.load(), &SettingsDocument::default());
        // Loading alone does not write anything.
        assert!(storage.is_empty());
    }

    #[test]
    fn test_load_corrupt_json_yields_defaults() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(SETTINGS_KEY, "{not json").unwrap();

        let store = SettingsStore::open(storage);

        assert_eq!(store.document(), &SettingsDocument::default());
    }

    #[test]
    fn test_load_non_object_yields_defaults() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(SETTINGS_KEY, "[1, 2, 3]").unwrap();

        let store = SettingsStore::open(storage);

        assert_eq!(store.document(), &SettingsDocument::default());
    }

    #[test]
    fn test_load_keeps_partial_section_as_stored() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(SETTINGS_KEY, r#"{"weather":{"location":"Đà Nẵng"}}"#)
            .unwrap();

        let store = SettingsStore::open(storage);

        assert_eq!(
            store.document().get(Section::Weather),
            Some(&json!({"location": "Đà Nẵng"}))
        );
        assert_eq!(
            store.document().get(Section::Clock),
            Some(&Section::Clock.default_value())
        );
        let weather: WeatherSettings = store.section();
        assert_eq!(weather.location, "Đà Nẵng");
        assert_eq!(weather.refresh_interval, 30);
    }

    #[test]
    fn test_update_section_changes_only_that_section() {
        let (mut store, storage) = create_test_store();
        let before = store.document().clone();

        store
            .update_section(Section::Clock, json!({"hour12": true}))
            .unwrap();

        for section in Section::ALL {
            if section == Section::Clock {
                continue;
            }
            assert_eq!(store.document().get(section), before.get(section));
        }
        let clock: ClockSettings = store.section();
        assert!(clock.hour12);
        assert_eq!(clock.timezone, 7.0);
        assert_eq!(stored_document(&storage)["clock"]["hour12"], json!(true));
    }

    #[test]
    fn test_update_with_empty_partial_still_persists() {
        let (mut store, storage) = create_test_store();

        store.update_section(Section::Notes, json!({})).unwrap();

        assert_eq!(store.document(), &SettingsDocument::default());
        assert_eq!(
            stored_document(&storage),
            Value::Object(SettingsDocument::default().as_map().clone())
        );
    }

    #[test]
    fn test_update_rejects_non_object_partial() {
        let (mut store, storage) = create_test_store();

        let result = store.update_section(Section::Clock, json!(true));

        assert!(matches!(result, Err(SettingsError::NotAnObject(_))));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_update_setting_sets_single_field() {
        let (mut store, _storage) = create_test_store();

        store
            .update_setting(Section::Weather, "tempScale", json!("F"))
            .unwrap();

        let weather: WeatherSettings = store.section();
        assert_eq!(weather.temp_scale, TempScale::F);
        assert_eq!(weather.location, "Hồ Chí Minh");
    }

    #[test]
    fn test_lowercase_scale_keeps_rest_of_section() {
        let (mut store, _storage) = create_test_store();
        store
            .update_section(Section::Weather, json!({"location": "Hà Nội"}))
            .unwrap();

        store
            .update_setting(Section::Weather, "tempScale", json!("f"))
            .unwrap();

        let weather: WeatherSettings = store.section();
        assert_eq!(weather.location, "Hà Nội");
        assert_eq!(weather.temp_scale, TempScale::F);
    }

    #[test]
    fn test_fractional_timezone_keeps_rest_of_section() {
        let (mut store, _storage) = create_test_store();

        store
            .update_section(Section::Clock, json!({"hour12": true, "timezone": 5.5}))
            .unwrap();

        let clock: ClockSettings = store.section();
        assert!(clock.hour12);
        assert_eq!(clock.timezone, 5.5);
    }

    #[test]
    fn test_reset_section_restores_default() {
        let (mut store, _storage) = create_test_store();
        store
            .update_section(Section::Theme, json!({"darkMode": false}))
            .unwrap();
        store
            .update_section(Section::Clock, json!({"hour12": true}))
            .unwrap();

        store.reset_section(Section::Theme).unwrap();

        assert_eq!(
            store.document().get(Section::Theme),
            Some(&Section::Theme.default_value())
        );
        assert_eq!(store.document().get(Section::Clock).unwrap()["hour12"], json!(true));
    }

    #[test]
    fn test_reset_all_restores_defaults_and_persists() {
        let (mut store, storage) = create_test_store();
        store
            .update_section(Section::General, json!({"language": "en-US"}))
            .unwrap();

        store.reset_all().unwrap();

        assert_eq!(store.document(), &SettingsDocument::default());
        assert_eq!(stored_document(&storage)["general"]["language"], json!("vi-VN"));
    }

    #[test]
    fn test_export_then_load_round_trips() {
        let (mut store, storage) = create_test_store();
        store
            .update_section(
                Section::Background,
                json!({"brightness": 0.8, "selectedImages": ["a.jpg"]}),
            )
            .unwrap();
        store
            .update_section(
                Section::Github,
                json!({"username": "octocat", "excludedLanguages": ["HTML"]}),
            )
            .unwrap();
        let exported = store.export_json();
        let expected = store.document().clone();

        storage.remove(SETTINGS_KEY).unwrap();
        storage.set(SETTINGS_KEY, &exported).unwrap();
        let reloaded = SettingsStore::open(storage);

        assert_eq!(reloaded.document(), &expected);
    }

    #[test]
    fn test_import_invalid_json_leaves_document_untouched() {
        let (mut store, storage) = create_test_store();
        store
            .update_section(Section::Clock, json!({"hour12": true}))
            .unwrap();
        let before = store.document().clone();
        let stored_before = storage.get(SETTINGS_KEY).unwrap();

        let result = store.import_json("{\"clock\": ");

        assert!(matches!(result, Err(SettingsError::Import(_))));
        assert_eq!(store.document(), &before);
        assert_eq!(storage.get(SETTINGS_KEY).unwrap(), stored_before);
    }

    #[test]
    fn test_import_non_object_is_rejected() {
        let (mut store, _storage) = create_test_store();

        let result = store.import_json("42");

        assert!(matches!(result, Err(SettingsError::NotAnObject(_))));
        assert_eq!(store.document(), &SettingsDocument::default());
    }

    #[test]
    fn test_import_does_not_merge_defaults_until_next_load() {
        let (mut store, _storage) = create_test_store();

        store
            .import_json(r#"{"clock": {"hour12": true}}"#)
            .unwrap();

        assert!(store.document().get(Section::Weather).is_none());
        assert_eq!(store.document().as_map().len(), 1);
        // Typed readers still see defaults for the missing section.
        assert_eq!(store.section::<WeatherSettings>(), WeatherSettings::default());

        store.load();
        assert_eq!(
            store.document().get(Section::Weather),
            Some(&Section::Weather.default_value())
        );
        assert_eq!(store.document().get(Section::Clock), Some(&json!({"hour12": true})));
    }

    #[test]
    fn test_adopt_legacy_keys_fills_empty_fields_only() {
        let storage = Arc::new(MemoryStore::new());
        storage.set("github_username", "octocat").unwrap();
        storage.set("weatherLocation", "Hà Nội").unwrap();
        storage.set("tempatureScale", "F").unwrap();
        let mut store = SettingsStore::open(storage.clone());

        let adopted = store.adopt_legacy_keys().unwrap();

        assert!(adopted);
        assert_eq!(store.document().get(Section::Github).unwrap()["username"], json!("octocat"));
        // Defaults already hold a location and scale, so those stay.
        let weather: WeatherSettings = store.section();
        assert_eq!(weather.location, "Hồ Chí Minh");
        assert_eq!(weather.temp_scale, TempScale::C);
        assert_eq!(stored_document(&storage)["github"]["username"], json!("octocat"));

        assert!(!store.adopt_legacy_keys().unwrap());
    }

    #[test]
    fn test_adopt_legacy_keys_fills_missing_fields() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(SETTINGS_KEY, r#"{"weather":{"enable":true}}"#)
            .unwrap();
        storage.set("weatherLocation", "Hà Nội").unwrap();
        storage.set("tempatureScale", "F").unwrap();
        let mut store = SettingsStore::open(storage);

        assert!(store.adopt_legacy_keys().unwrap());

        let weather: WeatherSettings = store.section();
        assert_eq!(weather.location, "Hà Nội");
        assert_eq!(weather.temp_scale, TempScale::F);
    }

    #[test]
    fn test_persist_failure_is_reported_but_change_is_kept() {
        let mut store = SettingsStore::open(Arc::new(ReadOnlyStore));

        let result = store.update_section(Section::Clock, json!({"hour12": true}));

        assert!(matches!(result, Err(SettingsError::Storage(_))));
        assert!(store.section::<ClockSettings>().hour12);
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf()));
        let mut store = SettingsStore::open(storage.clone());
        store
            .update_section(Section::Weather, json!({"location": "Hà Nội", "tempScale": "C"}))
            .unwrap();

        let reopened = SettingsStore::open(storage);

        assert_eq!(reopened.section::<WeatherSettings>().location, "Hà Nội");
        assert!(temp_dir.path().join("devtab-settings.json").exists());
    }
}
