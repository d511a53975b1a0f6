//! Storage disk configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level storage configuration: the set of named disks plus which one
/// is the default target for new nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Name of the disk used when an operation does not specify one.
    #[serde(default = "default_disk")]
    pub default_disk: String,
    /// URL path segment under which the default disk is publicly served
    /// (e.g. `storage` for `https://host/storage/<path>`).
    #[serde(default = "default_public_mount")]
    pub public_mount: String,
    /// Named disk definitions.
    #[serde(default)]
    pub disks: HashMap<String, DiskConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_disk: default_disk(),
            public_mount: default_public_mount(),
            disks: HashMap::new(),
        }
    }
}

/// Configuration for a single named disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskConfig {
    /// Backend driver: `"local"` or `"memory"`.
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Base URL this disk is served from, without a trailing slash. When
    /// set it takes precedence over every other URL derivation rule.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Root directory for the `local` driver.
    #[serde(default)]
    pub root_path: Option<String>,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            base_url: None,
            root_path: None,
        }
    }
}

fn default_disk() -> String {
    "public".to_string()
}

fn default_public_mount() -> String {
    "storage".to_string()
}

fn default_driver() -> String {
    "local".to_string()
}
