//! Storage backend trait for pluggable byte storage.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for byte storage backends.
///
/// Implementations exist for the local filesystem and an in-process
/// object store. The [`StorageBackend`] trait is defined here in
/// `arbor-core` and implemented in `arbor-storage`.
///
/// Paths are always backend-relative, `/`-separated, and never begin
/// with a slash.
#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend driver name (e.g., "local", "memory").
    fn driver(&self) -> &str;

    /// Whether the backend has native directories. Backends without them
    /// (object stores) materialize folders through placeholder objects.
    fn supports_directories(&self) -> bool;

    /// Check whether an object or directory exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Read an object into memory as a complete byte vector.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write bytes to an object at the given path, creating missing
    /// parent directories where the backend has them.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Create a directory (and any missing parents).
    async fn create_dir(&self, path: &str) -> AppResult<()>;

    /// List every object path under the given prefix, recursively, in
    /// lexicographic order. Directories themselves are not listed.
    async fn all_files(&self, prefix: &str) -> AppResult<Vec<String>>;

    /// Move (rename) an object from one path to another.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Copy an object from one path to another.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Delete an object at the given path.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Delete a directory and all its contents recursively.
    async fn delete_dir(&self, path: &str) -> AppResult<()>;
}
