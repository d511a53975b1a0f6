//! Subtree path rewriting over an indexed arena.
//!
//! Structural mutations (rename, move) change the path prefix of a whole
//! subtree. The subtree is fetched once, indexed by id and by parent,
//! and rewritten in a single depth-first pass. The service persists the
//! returned update set through the store.

use std::collections::HashMap;

use arbor_core::types::NodeId;
use arbor_entity::Node;
use arbor_storage::UrlResolver;

/// A fetched subtree indexed for prefix rewriting.
///
/// The first row is the subtree root; rows arrive parents-first from
/// the store's subtree query.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
    by_id: HashMap<NodeId, usize>,
    children: HashMap<NodeId, Vec<usize>>,
}

impl NodeArena {
    /// Index a subtree row set.
    pub fn new(rows: Vec<Node>) -> Self {
        let mut by_id = HashMap::with_capacity(rows.len());
        let mut children: HashMap<NodeId, Vec<usize>> = HashMap::new();

        for (idx, node) in rows.iter().enumerate() {
            by_id.insert(node.id, idx);
            if let Some(parent) = node.parent_id {
                children.entry(parent).or_default().push(idx);
            }
        }

        Self {
            nodes: rows,
            by_id,
            children,
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the given id is part of this subtree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.by_id.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Rewrite the paths of every node under `old_prefix`, swapping in
    /// `new_prefix` and recomputing each URL from the new path. Returns
    /// the changed nodes in depth-first order, the subtree root first.
    ///
    /// Nodes whose path does not start at the prefix boundary are left
    /// untouched, so a stray `Imagesque/...` row survives a rewrite of
    /// `Images`.
    pub fn rewrite_prefix(
        &mut self,
        old_prefix: &str,
        new_prefix: &str,
        urls: &UrlResolver,
    ) -> Vec<Node> {
        let mut changed = Vec::new();
        let Some(root_id) = self.nodes.first().map(|n| n.id) else {
            return changed;
        };

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![self.by_id[&root_id]];

        while let Some(idx) = stack.pop() {
            // A corrupted parent chain could revisit a node; stop there.
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let node = &mut self.nodes[idx];
            if let Some(new_path) = swap_prefix(&node.path, old_prefix, new_prefix) {
                node.path = new_path;
                node.absolute_url = urls.resolve(&node.path, &node.disk);
                changed.push(node.clone());
            }

            let id = self.nodes[idx].id;
            if let Some(child_indices) = self.children.get(&id) {
                stack.extend(child_indices.iter().rev().copied());
            }
        }

        changed
    }
}

/// Replace `old` with `new` at the front of `path`, requiring a `/`
/// boundary (or an exact match) after the prefix.
fn swap_prefix(path: &str, old: &str, new: &str) -> Option<String> {
    if path == old {
        return Some(new.to_string());
    }
    path.strip_prefix(old)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|rest| format!("{new}/{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_entity::NodeKind;
    use chrono::Utc;

    fn node(id: NodeId, parent: Option<NodeId>, name: &str, path: &str) -> Node {
        let now = Utc::now();
        Node {
            id,
            parent_id: parent,
            kind: NodeKind::Folder,
            name: name.to_string(),
            path: path.to_string(),
            size_bytes: 0,
            mime_type: None,
            extension: None,
            checksum_sha256: None,
            disk: "public".to_string(),
            absolute_url: format!("/storage/{path}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rewrite_covers_whole_subtree() {
        let root = NodeId::new();
        let mid = NodeId::new();
        let leaf = NodeId::new();
        let rows = vec![
            node(root, None, "Images", "Images"),
            node(mid, Some(root), "2024", "Images/2024"),
            node(leaf, Some(mid), "a.png", "Images/2024/a.png"),
        ];

        let mut arena = NodeArena::new(rows);
        let urls = UrlResolver::with_defaults(None);
        let changed = arena.rewrite_prefix("Images", "Photos", &urls);

        assert_eq!(changed.len(), 3);
        assert_eq!(changed[0].path, "Photos");
        assert_eq!(changed[1].path, "Photos/2024");
        assert_eq!(changed[2].path, "Photos/2024/a.png");
        assert_eq!(changed[2].absolute_url, "/storage/Photos/2024/a.png");
    }

    #[test]
    fn test_prefix_needs_boundary() {
        assert_eq!(swap_prefix("Images", "Images", "Photos").as_deref(), Some("Photos"));
        assert_eq!(
            swap_prefix("Images/a.png", "Images", "Photos").as_deref(),
            Some("Photos/a.png")
        );
        assert_eq!(swap_prefix("Imagesque/a.png", "Images", "Photos"), None);
    }

    #[test]
    fn test_contains_and_get() {
        let root = NodeId::new();
        let child = NodeId::new();
        let arena = NodeArena::new(vec![
            node(root, None, "docs", "docs"),
            node(child, Some(root), "a", "docs/a"),
        ]);

        assert!(arena.contains(child));
        assert!(!arena.contains(NodeId::new()));
        assert_eq!(arena.get(root).map(|n| n.name.as_str()), Some("docs"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_cyclic_rows_terminate() {
        let a = NodeId::new();
        let b = NodeId::new();
        // b claims a as parent and a claims b: the pass must still finish.
        let rows = vec![
            node(a, Some(b), "a", "X/a"),
            node(b, Some(a), "b", "X/b"),
        ];

        let mut arena = NodeArena::new(rows);
        let urls = UrlResolver::with_defaults(None);
        let changed = arena.rewrite_prefix("X", "Y", &urls);
        assert_eq!(changed.len(), 2);
    }
}
