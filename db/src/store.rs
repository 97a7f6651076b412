//! Key-value persistence.
//!
//! The engine treats persistence as an opaque `get`/`put` store of JSON
//! documents. Two backends live here: [`MemoryStore`] for tests and
//! ephemeral sessions, and [`JsonFileStore`], which keeps one file per key.
//! A SQLite backend is provided by the `shellsense-sqlite` crate.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Asynchronous get/put store.
///
/// A missing key is `Ok(None)`, never an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Reads `key` and deserializes it as JSON.
pub(crate) async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` as JSON and writes it under `key`.
pub(crate) async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.put(key, &raw).await
}

/// In-process store backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store with one JSON file per key.
///
/// File names are the hex SHA-256 of the key, so arbitrary keys map to
/// safe, fixed-length names. Writes go to a temporary file first and are
/// renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that holds `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let hash = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{hash:x}.json"))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.entry_path(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_put() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
        store.put("k", "v1").await.unwrap();
        store.put("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_json_file_store_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("nested").join("state"));

        assert_eq!(store.get("history").await.unwrap(), None);
        store.put("history", "[]").await.unwrap();
        assert_eq!(store.get("history").await.unwrap().as_deref(), Some("[]"));

        let name = store.entry_path("history");
        assert!(name.exists());
        assert_eq!(name.file_name().unwrap().len(), 64 + ".json".len());
    }

    #[tokio::test]
    async fn test_json_helpers_round_trip() {
        let store = MemoryStore::new();
        save_json(&store, "dirs", &vec!["/tmp", "/var"]).await.unwrap();
        let dirs: Vec<String> = load_json(&store, "dirs").await.unwrap().unwrap();
        assert_eq!(dirs, vec!["/tmp", "/var"]);

        store.put("broken", "{not json").await.unwrap();
        assert!(load_json::<Vec<String>>(&store, "broken").await.is_err());
    }
}
