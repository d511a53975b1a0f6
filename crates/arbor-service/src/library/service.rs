//! The storage-backed hierarchy manager.
//!
//! Every mutation here touches two coupled representations: the node
//! records and the bytes held by a storage backend. The records are the
//! source of truth for listing; the backend holds the content. Neither
//! side is transactional across the other, so operations order their
//! steps to keep a mid-operation failure recoverable: storage first,
//! descendant records next, the node's own record last.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::traits::StorageBackend;
use arbor_core::types::{NodeId, PageRequest, PageResponse};
use arbor_database::{NodeQuery, NodeStore};
use arbor_entity::node::{FolderRef, NewNode, Node, NodeKind};
use arbor_entity::tree::{TreeEntry, build_forest};
use arbor_storage::{DiskRegistry, UrlResolver};

use crate::library::naming;
use crate::library::pathsync::NodeArena;
use crate::library::report::BatchReport;
use crate::listing::{ListMode, ListRequest, Listing, ProjectedNode};

/// Placeholder object written inside folders on backends without native
/// directories, so empty folders remain enumerable.
const FOLDER_PLACEHOLDER: &str = ".keep";

/// An uploaded file handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name; becomes the display name.
    pub original_name: String,
    /// File content.
    pub bytes: Bytes,
    /// Client-supplied MIME type, if any.
    pub mime_type: Option<String>,
}

/// Manages the node hierarchy and its storage objects together.
#[derive(Debug, Clone)]
pub struct LibraryService {
    /// Node record store.
    store: Arc<dyn NodeStore>,
    /// Named storage backends.
    disks: Arc<DiskRegistry>,
    /// URL derivation rules.
    urls: UrlResolver,
}

impl LibraryService {
    /// Creates a new library service.
    pub fn new(store: Arc<dyn NodeStore>, disks: Arc<DiskRegistry>, urls: UrlResolver) -> Self {
        Self { store, disks, urls }
    }

    /// Stores an uploaded file and records it under the given parent.
    ///
    /// The stored object name is derived from the client name and the
    /// upload time, never the client name verbatim; the display name
    /// keeps the client name.
    pub async fn upload(
        &self,
        file: UploadedFile,
        parent: Option<NodeId>,
        disk: Option<&str>,
    ) -> AppResult<Node> {
        let original_name = file.original_name.trim();
        if original_name.is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }

        let (parent_id, prefix) = self.resolve_parent(parent).await?;
        let (disk_name, backend) = self.disks.resolve(disk)?;

        let stored_name = naming::stored_file_name(original_name, Utc::now());
        let path = child_path(&prefix, &stored_name);
        backend.write(&path, file.bytes.clone()).await?;

        let checksum = hex::encode(Sha256::digest(&file.bytes));
        let extension = naming::split_extension(original_name)
            .1
            .map(str::to_ascii_lowercase);

        let node = self
            .store
            .insert(NewNode {
                parent_id,
                kind: NodeKind::File,
                name: original_name.to_string(),
                path: path.clone(),
                size_bytes: file.bytes.len() as i64,
                mime_type: file.mime_type.clone(),
                extension,
                checksum_sha256: Some(checksum),
                disk: disk_name.clone(),
                absolute_url: self.urls.resolve(&path, &disk_name),
            })
            .await?;

        info!(
            node_id = %node.id,
            path = %node.path,
            disk = %disk_name,
            size_bytes = node.size_bytes,
            "File uploaded"
        );

        Ok(node)
    }

    /// Creates a folder under the given parent.
    pub async fn create_folder(
        &self,
        name: &str,
        parent: Option<NodeId>,
        disk: Option<&str>,
    ) -> AppResult<Node> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        let (parent_id, prefix) = self.resolve_parent(parent).await?;
        let (disk_name, backend) = self.disks.resolve(disk)?;
        let path = child_path(&prefix, name);

        if backend.supports_directories() {
            backend.create_dir(&path).await?;
        } else {
            let placeholder = format!("{path}/{FOLDER_PLACEHOLDER}");
            backend.write(&placeholder, Bytes::new()).await?;
        }

        let node = self
            .store
            .insert(NewNode {
                parent_id,
                kind: NodeKind::Folder,
                name: name.to_string(),
                path: path.clone(),
                size_bytes: 0,
                mime_type: None,
                extension: None,
                checksum_sha256: None,
                disk: disk_name.clone(),
                absolute_url: self.urls.resolve(&path, &disk_name),
            })
            .await?;

        info!(node_id = %node.id, path = %node.path, disk = %disk_name, "Folder created");
        Ok(node)
    }

    /// Renames a node, rewriting descendant paths for folders.
    pub async fn rename(&self, id: NodeId, new_name: &str) -> AppResult<Node> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::validation("Name cannot be empty"));
        }

        let node = self.find_node(id).await?;
        if node.is_folder() {
            self.rename_folder(node, new_name).await
        } else {
            self.rename_file(node, new_name).await
        }
    }

    async fn rename_folder(&self, node: Node, new_name: &str) -> AppResult<Node> {
        let old_path = node.path.clone();
        let new_path = child_path(node.parent_prefix(), new_name);
        if new_path == old_path {
            return Ok(node);
        }

        let backend = self.disks.get(&node.disk)?;
        let mut arena = NodeArena::new(self.store.subtree(node.id).await?);

        self.relocate_objects(&backend, &old_path, &new_path).await?;

        // Descendant records first, the renamed node's own record last.
        for descendant in arena
            .rewrite_prefix(&old_path, &new_path, &self.urls)
            .into_iter()
            .filter(|n| n.id != node.id)
        {
            self.store.update(&descendant).await?;
        }

        let mut updated = node;
        updated.name = new_name.to_string();
        updated.path = new_path;
        updated.absolute_url = self.urls.resolve(&updated.path, &updated.disk);
        let updated = self.store.update(&updated).await?;

        info!(
            node_id = %updated.id,
            old_path = %old_path,
            new_path = %updated.path,
            "Folder renamed"
        );
        Ok(updated)
    }

    async fn rename_file(&self, node: Node, new_name: &str) -> AppResult<Node> {
        let final_name = naming::ensure_extension(new_name, node.extension.as_deref());
        let new_path = child_path(node.parent_prefix(), &final_name);

        let backend = self.disks.get(&node.disk)?;
        if !backend.exists(&node.path).await? {
            return Err(AppError::not_found(format!(
                "Object {} is missing on disk {}",
                node.path, node.disk
            )));
        }
        if new_path != node.path {
            backend.rename(&node.path, &new_path).await?;
        }

        let mut updated = node;
        updated.name = final_name;
        updated.extension = naming::split_extension(&updated.name)
            .1
            .map(str::to_ascii_lowercase);
        updated.path = new_path;
        updated.absolute_url = self.urls.resolve(&updated.path, &updated.disk);
        let updated = self.store.update(&updated).await?;

        info!(node_id = %updated.id, path = %updated.path, "File renamed");
        Ok(updated)
    }

    /// Moves a node under a new parent (`None` for the root), keeping
    /// its final path segment.
    pub async fn move_node(&self, id: NodeId, new_parent: Option<NodeId>) -> AppResult<Node> {
        let node = self.find_node(id).await?;
        let (parent_id, prefix) = self.resolve_parent(new_parent).await?;
        let new_path = child_path(&prefix, node.basename());

        // A move that lands on the current path would relocate objects
        // onto themselves and then sweep them away with the emptied
        // source directory.
        if parent_id == node.parent_id || new_path == node.path {
            return Ok(node);
        }

        if node.is_folder() {
            self.move_folder(node, parent_id, new_path).await
        } else {
            self.move_file(node, parent_id, new_path).await
        }
    }

    async fn move_folder(
        &self,
        node: Node,
        parent_id: Option<NodeId>,
        new_path: String,
    ) -> AppResult<Node> {
        let mut arena = NodeArena::new(self.store.subtree(node.id).await?);
        if let Some(target) = parent_id {
            if arena.contains(target) {
                return Err(AppError::invalid_state(
                    "Cannot move a folder into its own subtree",
                ));
            }
        }

        let old_path = node.path.clone();
        let backend = self.disks.get(&node.disk)?;
        self.relocate_objects(&backend, &old_path, &new_path).await?;

        for descendant in arena
            .rewrite_prefix(&old_path, &new_path, &self.urls)
            .into_iter()
            .filter(|n| n.id != node.id)
        {
            self.store.update(&descendant).await?;
        }

        let mut updated = node;
        updated.parent_id = parent_id;
        updated.path = new_path;
        updated.absolute_url = self.urls.resolve(&updated.path, &updated.disk);
        let updated = self.store.update(&updated).await?;

        info!(
            node_id = %updated.id,
            old_path = %old_path,
            new_path = %updated.path,
            "Folder moved"
        );
        Ok(updated)
    }

    async fn move_file(
        &self,
        node: Node,
        parent_id: Option<NodeId>,
        new_path: String,
    ) -> AppResult<Node> {
        let backend = self.disks.get(&node.disk)?;
        // A file whose object has gone missing is reparented record-only.
        if backend.exists(&node.path).await? {
            backend.rename(&node.path, &new_path).await?;
        }

        let mut updated = node;
        updated.parent_id = parent_id;
        updated.path = new_path;
        updated.absolute_url = self.urls.resolve(&updated.path, &updated.disk);
        let updated = self.store.update(&updated).await?;

        info!(node_id = %updated.id, path = %updated.path, "File moved");
        Ok(updated)
    }

    /// Moves each id independently; one failure never aborts the rest.
    pub async fn move_many(&self, ids: &[NodeId], new_parent: Option<NodeId>) -> BatchReport {
        let mut report = BatchReport::new();
        for &id in ids {
            let result = self.move_node(id, new_parent).await;
            report.record(id, result);
        }
        report
    }

    /// Deep-copies a node, producing entirely new identities that share
    /// no record with the source subtree.
    ///
    /// The destination defaults to the source's current parent; the new
    /// name defaults to the source's name.
    pub async fn duplicate(
        &self,
        id: NodeId,
        new_name: Option<&str>,
        target_parent: Option<NodeId>,
    ) -> AppResult<Node> {
        let source = self.find_node(id).await?;

        let name = match new_name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::validation("Name cannot be empty"));
                }
                name.to_string()
            }
            None => source.name.clone(),
        };

        let (parent_id, prefix) = match target_parent {
            Some(target) => self.resolve_parent(Some(target)).await?,
            None => (source.parent_id, source.parent_prefix().to_string()),
        };
        let new_path = child_path(&prefix, &name);

        // Copying a subtree onto its own path would overwrite the
        // source objects mid-copy.
        if new_path == source.path {
            return Err(AppError::conflict(format!(
                "Duplicate target path '{new_path}' equals the source path"
            )));
        }

        if source.is_folder() {
            self.duplicate_folder(source, name, parent_id, new_path).await
        } else {
            self.duplicate_file(source, name, parent_id, new_path).await
        }
    }

    async fn duplicate_folder(
        &self,
        source: Node,
        name: String,
        parent_id: Option<NodeId>,
        new_path: String,
    ) -> AppResult<Node> {
        let backend = self.disks.get(&source.disk)?;

        // One bulk object copy; stored basenames stay intact under the
        // new prefix. A source folder absent from storage gets no
        // objects, only records.
        if backend.exists(&source.path).await? {
            let dir_prefix = format!("{}/", source.path);
            for object in backend.all_files(&source.path).await? {
                if let Some(suffix) = object.strip_prefix(&dir_prefix) {
                    backend.copy(&object, &format!("{new_path}/{suffix}")).await?;
                }
            }
        }

        let new_root = self
            .store
            .insert(NewNode {
                parent_id,
                kind: source.kind,
                name,
                path: new_path.clone(),
                size_bytes: source.size_bytes,
                mime_type: source.mime_type.clone(),
                extension: source.extension.clone(),
                checksum_sha256: source.checksum_sha256.clone(),
                disk: source.disk.clone(),
                absolute_url: self.urls.resolve(&new_path, &source.disk),
            })
            .await?;

        // Record-only recursion; the objects were copied above.
        let mut seen = HashSet::from([source.id]);
        let mut worklist = VecDeque::from([(source.id, new_root.id, new_path)]);
        while let Some((source_id, copy_id, copy_path)) = worklist.pop_front() {
            for child in self.store.find_children(Some(source_id)).await? {
                let child_copy_path = child_path(&copy_path, child.basename());
                let child_copy = self
                    .store
                    .insert(NewNode {
                        parent_id: Some(copy_id),
                        kind: child.kind,
                        name: child.name.clone(),
                        path: child_copy_path.clone(),
                        size_bytes: child.size_bytes,
                        mime_type: child.mime_type.clone(),
                        extension: child.extension.clone(),
                        checksum_sha256: child.checksum_sha256.clone(),
                        disk: child.disk.clone(),
                        absolute_url: self.urls.resolve(&child_copy_path, &child.disk),
                    })
                    .await?;
                if child.is_folder() && seen.insert(child.id) {
                    worklist.push_back((child.id, child_copy.id, child_copy_path));
                }
            }
        }

        info!(
            source_id = %source.id,
            node_id = %new_root.id,
            path = %new_root.path,
            "Folder duplicated"
        );
        Ok(new_root)
    }

    async fn duplicate_file(
        &self,
        source: Node,
        name: String,
        parent_id: Option<NodeId>,
        new_path: String,
    ) -> AppResult<Node> {
        let backend = self.disks.get(&source.disk)?;
        // A source object missing from storage yields a record-only copy.
        if backend.exists(&source.path).await? {
            backend.copy(&source.path, &new_path).await?;
        }

        let node = self
            .store
            .insert(NewNode {
                parent_id,
                kind: source.kind,
                name,
                path: new_path.clone(),
                size_bytes: source.size_bytes,
                mime_type: source.mime_type.clone(),
                extension: source.extension.clone(),
                checksum_sha256: source.checksum_sha256.clone(),
                disk: source.disk.clone(),
                absolute_url: self.urls.resolve(&new_path, &source.disk),
            })
            .await?;

        info!(source_id = %source.id, node_id = %node.id, path = %node.path, "File duplicated");
        Ok(node)
    }

    /// Deletes a node and every descendant, leaves first.
    ///
    /// Storage cleanup is best-effort when `cascade_storage` is set;
    /// record removal proceeds even when a backend delete fails. Record
    /// deletion errors propagate.
    pub async fn delete(&self, id: NodeId, cascade_storage: bool) -> AppResult<()> {
        self.find_node(id).await?;
        let rows = self.store.subtree(id).await?;

        // Reverse subtree order removes leaves before their folders.
        for node in rows.iter().rev() {
            if cascade_storage {
                self.remove_object(node).await;
            }
            self.store.delete(node.id).await?;
        }

        info!(node_id = %id, removed = rows.len(), "Node subtree deleted");
        Ok(())
    }

    async fn remove_object(&self, node: &Node) {
        let result = match self.disks.get(&node.disk) {
            Ok(backend) if node.is_folder() => backend.delete_dir(&node.path).await,
            Ok(backend) => backend.delete(&node.path).await,
            Err(error) => Err(error),
        };
        if let Err(error) = result {
            warn!(node_id = %node.id, path = %node.path, %error, "Storage cleanup failed");
        }
    }

    /// Deletes each id independently; one failure never aborts the rest.
    pub async fn delete_many(&self, ids: &[NodeId], cascade_storage: bool) -> BatchReport {
        let mut report = BatchReport::new();
        for &id in ids {
            let result = self.delete(id, cascade_storage).await;
            report.record(id, result);
        }
        report
    }

    /// The folder hierarchy as slim references, for navigation.
    pub async fn folders_tree(&self, exclude: Vec<NodeId>) -> AppResult<Vec<TreeEntry<FolderRef>>> {
        let rows = self.store.list(&NodeQuery::folders(exclude)).await?;
        let refs: Vec<FolderRef> = rows.iter().map(FolderRef::from).collect();
        Ok(build_forest(refs))
    }

    /// The ancestor chain of a node, root first, the node itself last.
    ///
    /// A dangling parent reference ends the walk with a partial trail.
    pub async fn breadcrumbs(&self, id: NodeId) -> AppResult<Vec<Node>> {
        let mut trail = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(self.find_node(id).await?);

        while let Some(node) = current {
            // A corrupted parent chain could cycle; stop at the repeat.
            if !visited.insert(node.id) {
                break;
            }
            let parent = node.parent_id;
            trail.push(node);
            current = match parent {
                Some(parent_id) => self.store.find(parent_id).await?,
                None => None,
            };
        }

        trail.reverse();
        Ok(trail)
    }

    /// Reads a file node's content from its backend.
    pub async fn read_file(&self, id: NodeId) -> AppResult<(Node, Bytes)> {
        let node = self.find_node(id).await?;
        if node.is_folder() {
            return Err(AppError::invalid_state(
                "Cannot read the content of a folder",
            ));
        }
        let backend = self.disks.get(&node.disk)?;
        let bytes = backend.read_bytes(&node.path).await?;
        Ok((node, bytes))
    }

    /// Lists nodes in the shape the request's options resolve to: a
    /// page, flat rows, or the nested tree.
    pub async fn list(&self, request: &ListRequest) -> AppResult<Listing> {
        match ListMode::resolve(&request.options) {
            ListMode::Tree => {
                let mut projection = request.options.projection.clone();
                projection.ensure_tree_columns("parent_id");

                let mut query = base_query(request);
                query.roots_first = true;
                let rows = self.store.list(&query).await?;

                let records = ProjectedNode::rows(&rows, &projection)?;
                Ok(Listing::Tree(build_forest(records)))
            }
            ListMode::Page { page, page_size } => {
                let page_request = PageRequest::new(page, page_size);
                let mut query = base_query(request);
                query.limit = Some(page_request.limit() as i64);
                query.offset = Some(page_request.offset() as i64);

                let rows = self.store.list(&query).await?;
                let total = self.store.count(&query).await?;
                let items = ProjectedNode::rows(&rows, &request.options.projection)?;

                Ok(Listing::Page(PageResponse::new(
                    items,
                    page_request.page,
                    page_request.page_size,
                    total,
                )))
            }
            ListMode::Flat { limit } => {
                let mut query = base_query(request);
                query.limit = limit;
                let rows = self.store.list(&query).await?;
                let items = ProjectedNode::rows(&rows, &request.options.projection)?;
                Ok(Listing::Flat(items))
            }
        }
    }

    /// Move every object under `old_path` to the same suffix under
    /// `new_path`, then drop the emptied source directory. A source
    /// absent from storage is skipped; records move regardless.
    async fn relocate_objects(
        &self,
        backend: &Arc<dyn StorageBackend>,
        old_path: &str,
        new_path: &str,
    ) -> AppResult<()> {
        if !backend.exists(old_path).await? {
            return Ok(());
        }

        let dir_prefix = format!("{old_path}/");
        for object in backend.all_files(old_path).await? {
            if let Some(suffix) = object.strip_prefix(&dir_prefix) {
                backend.rename(&object, &format!("{new_path}/{suffix}")).await?;
            }
        }
        backend.delete_dir(old_path).await
    }

    /// Resolve an optional parent id to the `(parent_id, prefix)` pair
    /// recorded on children. A file can never anchor children, so a
    /// file parent resolves to the root pair.
    async fn resolve_parent(&self, parent: Option<NodeId>) -> AppResult<(Option<NodeId>, String)> {
        let Some(id) = parent else {
            return Ok((None, String::new()));
        };

        let node = self.find_node(id).await?;
        if node.is_folder() {
            Ok((Some(node.id), node.path))
        } else {
            Ok((None, String::new()))
        }
    }

    async fn find_node(&self, id: NodeId) -> AppResult<Node> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }
}

/// Join a parent prefix and a final path segment. Root nodes have an
/// empty prefix and a bare-segment path.
fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn base_query(request: &ListRequest) -> NodeQuery {
    NodeQuery {
        parent: request.parent,
        kind: request.kind,
        search: request.search.clone(),
        sort: request.sort,
        ..NodeQuery::default()
    }
}
