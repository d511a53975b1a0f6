//! Local filesystem storage backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use arbor_core::error::{AppError, ErrorKind};
use arbor_core::result::AppResult;
use arbor_core::traits::StorageBackend;

/// Storage backend rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn driver(&self) -> &str {
        "local"
    }

    fn supports_directories(&self) -> bool {
        true
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.resolve(path).exists())
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Wrote file");
        Ok(())
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        fs::create_dir_all(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {path}"),
                e,
            )
        })?;
        Ok(())
    }

    async fn all_files(&self, prefix: &str) -> AppResult<Vec<String>> {
        let base = self.resolve(prefix);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let clean = prefix.trim_matches('/').to_string();
        let mut files = Vec::new();
        let mut pending = vec![(base, clean)];

        while let Some((dir, rel)) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list directory: {}", dir.display()),
                    e,
                )
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
            })? {
                let name = entry.file_name().to_string_lossy().to_string();
                let entry_rel = if rel.is_empty() {
                    name
                } else {
                    format!("{rel}/{name}")
                };

                let meta = entry.metadata().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
                })?;

                if meta.is_dir() {
                    pending.push((entry.path(), entry_rel));
                } else {
                    files.push(entry_rel);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from);
        let to_path = self.resolve(to);
        self.ensure_parent(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to rename {from} -> {to}"),
                e,
            )
        })?;
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from);
        let to_path = self.resolve(to);
        self.ensure_parent(&to_path).await?;

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to copy {from} -> {to}"),
                e,
            )
        })?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete file: {path}"),
                    e,
                )
            })?;
        }
        Ok(())
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        if full_path.exists() {
            fs::remove_dir_all(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete directory: {path}"),
                    e,
                )
            })?;
        }
        Ok(())
    }
}
