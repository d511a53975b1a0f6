//! Shared fixtures for service integration tests.

use std::sync::Arc;

use bytes::Bytes;

use arbor_core::types::NodeId;
use arbor_database::{MemoryNodeStore, NodeStore};
use arbor_entity::Node;
use arbor_service::{LibraryService, UploadedFile};
use arbor_storage::{DiskRegistry, MemoryBackend, UrlResolver};

/// A library service wired to in-process stores, with direct handles to
/// both sides for assertions.
pub struct TestLibrary {
    /// The service under test.
    pub service: LibraryService,
    /// The record store behind it.
    pub store: Arc<MemoryNodeStore>,
    /// The single `public` disk behind it.
    pub backend: Arc<MemoryBackend>,
}

impl TestLibrary {
    /// Create a service over a memory store and one memory disk named
    /// `public`.
    pub fn new() -> Self {
        let store = Arc::new(MemoryNodeStore::new());
        let backend = Arc::new(MemoryBackend::new());

        let mut disks = DiskRegistry::new();
        disks.register("public", backend.clone(), true);

        let service = LibraryService::new(
            store.clone(),
            Arc::new(disks),
            UrlResolver::with_defaults(None),
        );

        Self {
            service,
            store,
            backend,
        }
    }

    /// Upload a small text file under the given parent.
    pub async fn upload(&self, name: &str, content: &str, parent: Option<NodeId>) -> Node {
        self.service
            .upload(
                UploadedFile {
                    original_name: name.to_string(),
                    bytes: Bytes::copy_from_slice(content.as_bytes()),
                    mime_type: Some("text/plain".to_string()),
                },
                parent,
                None,
            )
            .await
            .expect("upload failed")
    }

    /// Create a folder under the given parent.
    pub async fn folder(&self, name: &str, parent: Option<NodeId>) -> Node {
        self.service
            .create_folder(name, parent, None)
            .await
            .expect("create_folder failed")
    }

    /// Fetch the current record for a node.
    pub async fn node(&self, id: NodeId) -> Node {
        self.store
            .find(id)
            .await
            .expect("find failed")
            .expect("node missing")
    }

    /// Whether a record still exists for the id.
    pub async fn exists(&self, id: NodeId) -> bool {
        self.store.find(id).await.expect("find failed").is_some()
    }
}
