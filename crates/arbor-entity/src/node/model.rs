//! Node entity model.

use arbor_core::types::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tree::TreeRecord;

/// Discriminant for the two node shapes in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "node_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A folder; may have children.
    Folder,
    /// A file; never has children.
    File,
}

/// A node in the resource tree: one row of the `nodes` table.
///
/// `size_bytes`, `mime_type`, `extension`, and `checksum_sha256` are
/// populated for files only; folders carry `0` / `None`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Parent node ID (null for root nodes).
    pub parent_id: Option<NodeId>,
    /// Whether this node is a folder or a file.
    pub kind: NodeKind,
    /// Display name. For files this usually includes the extension.
    pub name: String,
    /// Disk-relative path (e.g., `reports/2024/summary.pdf`). No leading
    /// slash; for every non-root node it equals the parent's path plus
    /// `/` plus this node's final path segment.
    pub path: String,
    /// Size in bytes (0 for folders).
    pub size_bytes: i64,
    /// MIME type of the content.
    pub mime_type: Option<String>,
    /// Lowercased file extension, without the dot.
    pub extension: Option<String>,
    /// SHA-256 checksum of the content, hex-encoded.
    pub checksum_sha256: Option<String>,
    /// Name of the disk holding the bytes.
    pub disk: String,
    /// Derived absolute URL. Recomputed from `(path, disk)` on every
    /// path or disk change; never authoritative.
    pub absolute_url: String,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Check if this is a root node (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// The final segment of this node's path.
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// The path of the directory containing this node; empty for nodes
    /// that sit at the root of their disk.
    pub fn parent_prefix(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((prefix, _)) => prefix,
            None => "",
        }
    }
}

impl TreeRecord for Node {
    fn tree_id(&self) -> NodeId {
        self.id
    }

    fn tree_parent(&self) -> Option<NodeId> {
        self.parent_id
    }
}

/// Data required to insert a new node record.
///
/// The store assigns the identifier and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNode {
    /// Parent node (None for root).
    pub parent_id: Option<NodeId>,
    /// Whether the node is a folder or a file.
    pub kind: NodeKind,
    /// Display name.
    pub name: String,
    /// Disk-relative path.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Lowercased file extension.
    pub extension: Option<String>,
    /// SHA-256 checksum, hex-encoded.
    pub checksum_sha256: Option<String>,
    /// Disk name.
    pub disk: String,
    /// Derived absolute URL.
    pub absolute_url: String,
}
