//! Disk registry routing operations to the correct backend by disk name.

use std::collections::HashMap;
use std::sync::Arc;

use arbor_core::config::StorageConfig;
use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::traits::StorageBackend;

use crate::backends::local::LocalBackend;
use crate::backends::memory::MemoryBackend;

/// Registry of named storage backends.
///
/// Built once from configuration (or assembled by hand in tests) and
/// passed to services explicitly. Disks do not change at runtime.
#[derive(Debug, Default)]
pub struct DiskRegistry {
    backends: HashMap<String, Arc<dyn StorageBackend>>,
    default_disk: Option<String>,
}

impl DiskRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration, one backend per configured disk.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let mut registry = Self::new();
        for (name, disk) in &config.disks {
            let backend: Arc<dyn StorageBackend> = match disk.driver.as_str() {
                "local" => {
                    let root = disk.root_path.as_deref().ok_or_else(|| {
                        AppError::configuration(format!("Disk {name} has no root_path"))
                    })?;
                    Arc::new(LocalBackend::new(root).await?)
                }
                "memory" => Arc::new(MemoryBackend::new()),
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown storage driver for disk {name}: {other}"
                    )));
                }
            };
            registry.register(name.clone(), backend, *name == config.default_disk);
        }

        if registry.default_disk.is_none() {
            return Err(AppError::configuration(format!(
                "Default disk {} is not configured",
                config.default_disk
            )));
        }
        Ok(registry)
    }

    /// Register a backend under a disk name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        is_default: bool,
    ) {
        let name = name.into();
        if is_default {
            self.default_disk = Some(name.clone());
        }
        self.backends.insert(name, backend);
    }

    /// Get a backend by disk name.
    pub fn get(&self, name: &str) -> AppResult<Arc<dyn StorageBackend>> {
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Disk {name} not found")))
    }

    /// Get the default disk and its backend.
    pub fn get_default(&self) -> AppResult<(String, Arc<dyn StorageBackend>)> {
        let name = self
            .default_disk
            .clone()
            .ok_or_else(|| AppError::configuration("No default disk configured"))?;
        let backend = self.get(&name)?;
        Ok((name, backend))
    }

    /// Resolve an optional disk name to a concrete disk and backend,
    /// falling back to the default disk.
    pub fn resolve(&self, disk: Option<&str>) -> AppResult<(String, Arc<dyn StorageBackend>)> {
        match disk {
            Some(name) => Ok((name.to_string(), self.get(name)?)),
            None => self.get_default(),
        }
    }

    /// The configured default disk name, if any.
    pub fn default_disk(&self) -> Option<&str> {
        self.default_disk.as_deref()
    }
}
