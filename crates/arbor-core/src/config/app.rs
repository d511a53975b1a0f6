//! Application-level settings.

use serde::{Deserialize, Serialize};

/// Application settings shared by URL derivation and serialization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    /// Public base URL of the application, without a trailing slash
    /// (e.g. `https://files.example.com`). When unset, derived URLs are
    /// root-relative.
    #[serde(default)]
    pub base_url: Option<String>,
}
