//! Absolute URL resolution for stored objects.

use std::collections::HashMap;

use arbor_core::config::{AppSettings, StorageConfig};

/// Resolves the public URL of a stored object from its disk-relative
/// path and disk name.
///
/// Resolution is pure and total: the same inputs always produce the
/// same string, and no input fails. Rules, in order:
/// 1. the disk carries an explicit `base_url` in configuration;
/// 2. the disk is the default public disk, so objects are served from
///    the public mount segment under the application base URL;
/// 3. the generic asset rule joins the path onto the application base
///    URL, or onto `/` when no base URL is configured.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    /// Application base URL, e.g. `https://cms.example.com`.
    app_base_url: Option<String>,
    /// Disk whose objects are served from the public mount.
    public_disk: String,
    /// URL segment the public disk is mounted under.
    public_mount: String,
    /// Per-disk explicit base URLs; these win over everything else.
    disk_base_urls: HashMap<String, String>,
}

impl UrlResolver {
    /// Build a resolver from the application and storage configuration.
    pub fn new(app: &AppSettings, storage: &StorageConfig) -> Self {
        let disk_base_urls = storage
            .disks
            .iter()
            .filter_map(|(name, disk)| {
                disk.base_url.clone().map(|url| (name.clone(), url))
            })
            .collect();

        Self {
            app_base_url: app.base_url.clone(),
            public_disk: storage.default_disk.clone(),
            public_mount: storage.public_mount.clone(),
            disk_base_urls,
        }
    }

    /// Build a resolver with the stock disk layout and an optional
    /// application base URL.
    pub fn with_defaults(app_base_url: Option<String>) -> Self {
        Self {
            app_base_url,
            public_disk: "public".to_string(),
            public_mount: "storage".to_string(),
            disk_base_urls: HashMap::new(),
        }
    }

    /// Set an explicit base URL for one disk.
    pub fn set_disk_base_url(&mut self, disk: impl Into<String>, base_url: impl Into<String>) {
        self.disk_base_urls.insert(disk.into(), base_url.into());
    }

    /// Resolve the absolute URL for an object path on a disk.
    pub fn resolve(&self, path: &str, disk: &str) -> String {
        let clean = path.trim_start_matches('/');

        if let Some(base) = self.disk_base_urls.get(disk) {
            return join(base, clean);
        }

        if disk == self.public_disk {
            return self.asset(&format!("{}/{}", self.public_mount, clean));
        }

        self.asset(clean)
    }

    fn asset(&self, rel: &str) -> String {
        match &self.app_base_url {
            Some(base) => join(base, rel),
            None => format!("/{rel}"),
        }
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::with_defaults(None)
    }
}

fn join(base: &str, rel: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_base_url_wins() {
        let mut resolver = UrlResolver::with_defaults(Some("https://cms.example.com".into()));
        resolver.set_disk_base_url("cdn", "https://cdn.example.com/assets");

        assert_eq!(
            resolver.resolve("Images/a.png", "cdn"),
            "https://cdn.example.com/assets/Images/a.png"
        );
    }

    #[test]
    fn test_public_disk_uses_mount() {
        let resolver = UrlResolver::with_defaults(Some("https://cms.example.com/".into()));
        assert_eq!(
            resolver.resolve("Images/a.png", "public"),
            "https://cms.example.com/storage/Images/a.png"
        );
    }

    #[test]
    fn test_public_disk_without_app_base_is_rootless() {
        let resolver = UrlResolver::with_defaults(None);
        assert_eq!(resolver.resolve("Images/a.png", "public"), "/storage/Images/a.png");
    }

    #[test]
    fn test_other_disk_falls_back_to_asset_rule() {
        let resolver = UrlResolver::with_defaults(Some("https://cms.example.com".into()));
        assert_eq!(
            resolver.resolve("backups/db.sql", "archive"),
            "https://cms.example.com/backups/db.sql"
        );

        let rootless = UrlResolver::with_defaults(None);
        assert_eq!(rootless.resolve("backups/db.sql", "archive"), "/backups/db.sql");
    }

    #[test]
    fn test_deterministic() {
        let resolver = UrlResolver::with_defaults(Some("https://cms.example.com".into()));
        let first = resolver.resolve("a/b/c.txt", "public");
        for _ in 0..3 {
            assert_eq!(resolver.resolve("a/b/c.txt", "public"), first);
        }
    }
}
