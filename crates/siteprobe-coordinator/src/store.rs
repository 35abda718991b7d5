//! Durable analysis storage.
//!
//! Written best-effort after every successful analysis; the read path of the
//! coordinator never consults it.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use siteprobe_protocols::CacheEntry;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Key/value storage for cache entries, keyed by `analysis_<domain>`.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Insert or replace the entry under `key`.
    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Remove the entry under `key`; absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Every stored entry, oldest `cachedAt` first.
    async fn list(&self) -> Result<Vec<CacheEntry>, StoreError>;
}

/// In-memory analysis store.
pub struct MemoryAnalysisStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryAnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CacheEntry>, StoreError> {
        let entries = self.entries.read().await;
        let mut list: Vec<_> = entries.values().cloned().collect();
        list.sort_by_key(|entry| entry.cached_at);
        Ok(list)
    }
}

/// File system analysis store.
///
/// One pretty-printed JSON file per key:
/// ```text
/// {storage_path}/
/// ├── analysis_example.com.json
/// ├── analysis_www.rust-lang.org.json
/// └── ...
/// ```
pub struct FileAnalysisStore {
    storage_path: PathBuf,
}

impl FileAnalysisStore {
    /// Open the store, creating `storage_path` when missing.
    pub async fn new(storage_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage_path = storage_path.into();
        fs::create_dir_all(&storage_path).await?;

        debug!("FileAnalysisStore initialized at {:?}", storage_path);

        Ok(Self { storage_path })
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self
            .storage_path
            .join(format!("{}.json", Self::sanitize_key(key))))
    }

    /// Keep hostname characters; everything else becomes `_`.
    fn sanitize_key(key: &str) -> String {
        key.chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[async_trait]
impl AnalysisStore for FileAnalysisStore {
    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        let content = serde_json::to_string_pretty(entry).map_err(|e| {
            StoreError::Serialization(format!("Failed to serialize analysis: {}", e))
        })?;

        fs::write(&path, content).await?;

        debug!("Stored analysis '{}' to {:?}", key, path);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let path = self.entry_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let entry = serde_json::from_str(&content).map_err(|e| {
            StoreError::Serialization(format!("Failed to deserialize analysis: {}", e))
        })?;

        Ok(Some(entry))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        if path.exists() {
            fs::remove_file(&path).await?;
            debug!("Deleted analysis '{}'", key);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CacheEntry>, StoreError> {
        let mut list = Vec::new();
        let mut entries = fs::read_dir(&self.storage_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<CacheEntry>(&content) {
                    Ok(entry) => list.push(entry),
                    Err(e) => warn!("Failed to deserialize analysis from {:?}: {}", path, e),
                },
                Err(e) => warn!("Failed to read analysis file {:?}: {}", path, e),
            }
        }

        list.sort_by_key(|entry| entry.cached_at);
        Ok(list)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
