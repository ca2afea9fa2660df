// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Key-value persistence
//
// Small string values stored under string keys, one file per key.
// Every write replaces the whole value.

use crate::types::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key holding the "light" / "dark" theme flag
pub const THEME_KEY: &str = "theme";
/// Key holding the serialized session
pub const AUTH_KEY: &str = "persist:auth";
/// Key holding the serialized favourites collection
pub const FAVOURITES_KEY: &str = "persist:favourites";

/// Durable string storage shared by all stores
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Remove a value. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Directory-backed store, one file per key
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::FileIo(format!("Failed to create data dir: {}", e)))?;
        tracing::info!("Key-value store path: {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a logical key to its file, rejecting anything that could escape the directory
    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let file_name: String = key
            .chars()
            .map(|c| if c == ':' { '-' } else { c })
            .collect();

        let valid = !file_name.is_empty()
            && file_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::InvalidConfig(format!(
                "Invalid storage key: {:?}",
                key
            )));
        }

        Ok(self.dir.join(format!("{}.json", file_name)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::FileIo(format!("Failed to read {}: {}", key, e))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");

        // Write to a sibling file first so readers never see a torn value
        tokio::fs::write(&tmp_path, value)
            .await
            .map_err(|e| AppError::FileIo(format!("Failed to write {}: {}", key, e)))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| AppError::FileIo(format!("Failed to replace {}: {}", key, e)))?;

        tracing::debug!("Persisted '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::FileIo(format!("Failed to remove {}: {}", key, e))),
        }
    }
}

/// Process-local store, used when nothing should touch the disk
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.values
            .lock()
            .map_err(|_| AppError::FileIo("Memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path().join("data")).await.unwrap();

        assert_eq!(store.get(AUTH_KEY).await.unwrap(), None);

        store.set(AUTH_KEY, "{\"user\":null}").await.unwrap();
        assert_eq!(
            store.get(AUTH_KEY).await.unwrap().as_deref(),
            Some("{\"user\":null}")
        );
        assert!(dir.path().join("data").join("persist-auth.json").exists());

        store.set(AUTH_KEY, "{}").await.unwrap();
        assert_eq!(store.get(AUTH_KEY).await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileKeyValueStore::open(dir.path()).await.unwrap();
            store.set(THEME_KEY, "dark").await.unwrap();
        }

        let reopened = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_file_store_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();

        store.set(FAVOURITES_KEY, "[]").await.unwrap();
        store.remove(FAVOURITES_KEY).await.unwrap();
        store.remove(FAVOURITES_KEY).await.unwrap();
        assert_eq!(store.get(FAVOURITES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();

        assert!(matches!(
            store.set("../escape", "x").await,
            Err(AppError::InvalidConfig(_))
        ));
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_seeded_values() {
        let store = MemoryKeyValueStore::with_values([(THEME_KEY, "dark")]);
        assert_eq!(store.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));

        store.remove(THEME_KEY).await.unwrap();
        assert_eq!(store.get(THEME_KEY).await.unwrap(), None);
    }
}
