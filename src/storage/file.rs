//! File-backed key-value store
//!
//! Each key is stored as its own JSON file in a directory, written atomically
//! through a temporary file so a crash never leaves a half-written slot.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;

use super::{KeyValueStore, StorageError};

/// Stores each key as `<dir>/<key>.json`
///
/// The default directories are XDG-compliant: settings live under the data
/// directory (`~/.local/share/devtab/` on Linux) and cached widget data under
/// the cache directory (`~/.cache/devtab/`).
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted in the platform data directory.
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn for_settings() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "devtab")?;
        Some(Self::with_dir(project_dirs.data_dir().to_path_buf()))
    }

    /// Store rooted in the platform cache directory.
    pub fn for_cache() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "devtab")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Store rooted in an explicit directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file backing `key`
    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        // Each write gets its own temp file, so concurrent writers never share one.
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.slot_path(key)).map_err(|e| e.error)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Replaces characters that are not safe in file names with underscores.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_set_creates_file_in_directory() {
        let (store, temp_dir) = create_test_store();

        store.set("devtab-settings", "{\"clock\":{}}").expect("Write should succeed");

        let expected_path = temp_dir.path().join("devtab-settings.json");
        assert!(expected_path.exists(), "Slot file should exist");
        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert_eq!(content, "{\"clock\":{}}");
        let files = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(files, 1, "No temp file should be left behind");
    }

    #[test]
    fn test_concurrent_writers_to_same_key() {
        let (store, temp_dir) = create_test_store();
        let values: Vec<String> = (0..8).map(|i| format!("{{\"writer\":{}}}", i)).collect();

        std::thread::scope(|scope| {
            for value in &values {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..20 {
                        store.set("cache.weather", value).expect("Write should succeed");
                    }
                });
            }
        });

        let stored = store.get("cache.weather").unwrap().unwrap();
        assert!(values.contains(&stored), "Slot should hold one complete write");
        let files = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(files, 1, "No temp file should be left behind");
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();

        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let (store, _temp_dir) = create_test_store();

        store.set("key", "first").unwrap();
        store.set("key", "second").unwrap();

        assert_eq!(store.get("key").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("devtab");
        let store = FileStore::with_dir(nested_path.clone());

        store.set("key", "value").expect("Write should succeed");

        assert!(nested_path.join("key.json").exists());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _temp_dir) = create_test_store();

        store.set("key", "value").unwrap();
        store.remove("key").unwrap();
        store.remove("key").unwrap();

        assert!(store.get("key").unwrap().is_none());
    }

    #[test]
    fn test_keys_are_sanitized() {
        let (store, temp_dir) = create_test_store();

        store.set("cache.github/octo:cat", "{}").unwrap();

        assert!(temp_dir.path().join("cache.github_octo_cat.json").exists());
        assert_eq!(store.get("cache.github/octo:cat").unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn test_for_settings_uses_project_directory() {
        if let Some(store) = FileStore::for_settings() {
            assert!(store.dir().to_string_lossy().contains("devtab"));
        }
        // Passes when no home directory is available (e.g., in CI)
    }
}
