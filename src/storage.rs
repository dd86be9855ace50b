//! Local Storage Module
//!
//! Persists preference and session blobs as JSON files under the app data dir.
//! One file per fixed key, no schema versioning.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::{info, error, debug};

/// Key/value storage backed by JSON files
pub struct PreferenceStorage {
    storage_path: PathBuf,
}

impl PreferenceStorage {
    /// Create storage rooted at the platform app data dir
    pub fn new() -> Self {
        let storage_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("MotoConnect");

        Self::with_root(storage_path)
    }

    /// Create storage rooted at an explicit directory
    pub fn with_root(storage_path: PathBuf) -> Self {
        // Ensure directory exists
        if let Err(e) = std::fs::create_dir_all(&storage_path) {
            error!("Failed to create storage directory: {}", e);
        }

        debug!("Storage initialized at: {:?}", storage_path);

        Self { storage_path }
    }

    /// Save a value under a fixed key
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let file_path = self.storage_path.join(format!("{}.json", key));
        std::fs::write(&file_path, json)
            .map_err(|e| StorageError::Io(e.to_string()))?;

        info!("Saved data for key: {}", key);
        Ok(())
    }

    /// Load a value stored under a fixed key
    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<T, StorageError> {
        let file_path = self.storage_path.join(format!("{}.json", key));

        let json = std::fs::read_to_string(&file_path)
            .map_err(|e| StorageError::Io(e.to_string()))?;

        serde_json::from_str(&json)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Delete stored data
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.storage_path.join(format!("{}.json", key));

        if file_path.exists() {
            std::fs::remove_file(&file_path)
                .map_err(|e| StorageError::Io(e.to_string()))?;
            info!("Deleted stored data for key: {}", key);
        }

        Ok(())
    }

    /// Check if key exists
    pub fn exists(&self, key: &str) -> bool {
        let file_path = self.storage_path.join(format!("{}.json", key));
        file_path.exists()
    }
}

impl Default for PreferenceStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        value: String,
        count: u32,
    }

    fn temp_storage() -> (tempfile::TempDir, PreferenceStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = PreferenceStorage::with_root(dir.path().to_path_buf());
        (dir, storage)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, storage) = temp_storage();
        let blob = Blob { value: "abc".into(), count: 3 };

        storage.save("test_key", &blob).unwrap();
        let loaded: Blob = storage.load("test_key").unwrap();

        assert_eq!(loaded, blob);
    }

    #[test]
    fn load_missing_key_is_io_error() {
        let (_dir, storage) = temp_storage();
        let result: Result<Blob, _> = storage.load("missing");
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn delete_removes_key() {
        let (_dir, storage) = temp_storage();
        storage.save("doomed", &Blob { value: "x".into(), count: 0 }).unwrap();
        assert!(storage.exists("doomed"));

        storage.delete("doomed").unwrap();
        assert!(!storage.exists("doomed"));
    }

    #[test]
    fn delete_missing_key_is_ok() {
        let (_dir, storage) = temp_storage();
        assert!(storage.delete("never_saved").is_ok());
    }
}
