//! Serialized node views for API responses.

use arbor_core::types::NodeId;
use serde::{Deserialize, Serialize};

use crate::node::model::{Node, NodeKind};
use crate::tree::TreeRecord;

/// Timestamp format used in serialized views, e.g. `14:05 23/08/2026`.
const TIMESTAMP_FORMAT: &str = "%H:%M %d/%m/%Y";

/// The caller-facing shape of a node.
///
/// Identifiers are rendered as strings, size as a human-readable unit
/// string (`-` for folders), and the creation timestamp in the listing
/// display format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    /// Node identifier as a string.
    pub id: String,
    /// Display name.
    pub name: String,
    /// `"folder"` or `"file"`.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Disk-relative path.
    pub path: String,
    /// Derived absolute URL.
    pub absolute_url: String,
    /// Parent identifier as a string, when present.
    pub parent_id: Option<String>,
    /// Formatted size (`-` for folders, else e.g. `1.5 MB`).
    pub size: String,
    /// File extension.
    pub extension: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Formatted creation timestamp.
    pub created_at: String,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.to_string(),
            name: node.name.clone(),
            kind: node.kind,
            path: node.path.clone(),
            absolute_url: node.absolute_url.clone(),
            parent_id: node.parent_id.map(|p| p.to_string()),
            size: format_size(node.kind, node.size_bytes),
            extension: node.extension.clone(),
            mime_type: node.mime_type.clone(),
            created_at: node.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Format a byte count with binary units, rounded to two decimals.
///
/// Folders have no meaningful size and render as `-`. The loop divides
/// while the value is strictly greater than 1024, so exactly 1024 bytes
/// stays `1024 B`.
pub fn format_size(kind: NodeKind, size_bytes: i64) -> String {
    if kind == NodeKind::Folder {
        return "-".to_string();
    }

    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = size_bytes as f64;
    let mut unit = 0;
    while value > 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// A slim folder reference for navigation trees: identifier, name, and
/// parent only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRef {
    /// Folder identifier.
    pub id: NodeId,
    /// Folder name.
    pub name: String,
    /// Parent folder identifier.
    pub parent_id: Option<NodeId>,
}

impl From<&Node> for FolderRef {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            parent_id: node.parent_id,
        }
    }
}

impl TreeRecord for FolderRef {
    fn tree_id(&self) -> NodeId {
        self.id
    }

    fn tree_parent(&self) -> Option<NodeId> {
        self.parent_id
    }
}
