//! In-process object storage backend.
//!
//! Holds objects in a sorted map keyed by path. There are no real
//! directories: a folder "exists" when some object lives under its
//! prefix, which is why folder creation on this backend goes through a
//! placeholder object. Used by tests and as the stand-in for
//! bucket-style disks.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::traits::StorageBackend;

/// Storage backend holding all objects in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryBackend {
    /// Create a new empty memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects. Test helper.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    fn key(path: &str) -> String {
        path.trim_matches('/').to_string()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn driver(&self) -> &str {
        "memory"
    }

    fn supports_directories(&self) -> bool {
        false
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let key = Self::key(path);
        let objects = self.objects.read().await;
        if objects.contains_key(&key) {
            return Ok(true);
        }
        // A prefix with objects under it counts as an existing directory.
        let dir_prefix = format!("{key}/");
        Ok(objects
            .range::<str, _>((Bound::Included(dir_prefix.as_str()), Bound::Unbounded))
            .next()
            .is_some_and(|(k, _)| k.starts_with(&dir_prefix)))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let key = Self::key(path);
        self.objects
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {path}")))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let key = Self::key(path);
        debug!(path = %key, bytes = data.len(), "Stored object");
        self.objects.write().await.insert(key, data);
        Ok(())
    }

    async fn create_dir(&self, _path: &str) -> AppResult<()> {
        // Object stores have no directories to create.
        Ok(())
    }

    async fn all_files(&self, prefix: &str) -> AppResult<Vec<String>> {
        let key = Self::key(prefix);
        let objects = self.objects.read().await;
        if key.is_empty() {
            return Ok(objects.keys().cloned().collect());
        }

        let dir_prefix = format!("{key}/");
        Ok(objects
            .range::<str, _>((Bound::Included(dir_prefix.as_str()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(&dir_prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_key = Self::key(from);
        let to_key = Self::key(to);
        let mut objects = self.objects.write().await;
        let data = objects
            .remove(&from_key)
            .ok_or_else(|| AppError::not_found(format!("Object not found: {from}")))?;
        objects.insert(to_key, data);
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let from_key = Self::key(from);
        let to_key = Self::key(to);
        let mut objects = self.objects.write().await;
        let data = objects
            .get(&from_key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {from}")))?;
        objects.insert(to_key, data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let key = Self::key(path);
        self.objects.write().await.remove(&key);
        Ok(())
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        let key = Self::key(path);
        let dir_prefix = format!("{key}/");
        let mut objects = self.objects.write().await;
        objects.retain(|k, _| k != &key && !k.starts_with(&dir_prefix));
        Ok(())
    }
}
