//! In-process node store implementation.
//!
//! Backs the engine in tests and embedded setups where PostgreSQL is
//! not available. Behavior mirrors [`PgNodeStore`](crate::PgNodeStore):
//! same ordering rules, same error cases.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::types::sorting::{NodeSortField, SortDirection};
use arbor_core::types::NodeId;
use arbor_entity::node::{NewNode, Node};

use crate::store::{NodeQuery, NodeStore, ParentFilter};

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<NodeId, Node>,
    /// Insertion order; ids of deleted nodes are pruned on removal.
    order: Vec<NodeId>,
}

impl Inner {
    /// All live nodes in insertion order.
    fn rows(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }
}

/// Node store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    inner: RwLock<Inner>,
}

impl MemoryNodeStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(node: &Node, query: &NodeQuery) -> bool {
        let parent_ok = match query.parent {
            ParentFilter::Any => true,
            ParentFilter::Root => node.parent_id.is_none(),
            ParentFilter::Of(id) => node.parent_id == Some(id),
        };
        if !parent_ok {
            return false;
        }

        if let Some(kind) = query.kind {
            if node.kind != kind {
                return false;
            }
        }

        if let Some(search) = &query.search {
            if !node
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }

        !query.exclude.contains(&node.id)
    }

    fn sort_rows(rows: &mut [Node], query: &NodeQuery) {
        rows.sort_by(|a, b| {
            if query.roots_first {
                let rank = |n: &Node| u8::from(n.parent_id.is_some());
                let by_rank = rank(a).cmp(&rank(b));
                if by_rank != std::cmp::Ordering::Equal {
                    return by_rank;
                }
            }

            let by_field = match query.sort.field {
                NodeSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                NodeSortField::Size => a.size_bytes.cmp(&b.size_bytes),
                NodeSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match query.sort.direction {
                SortDirection::Asc => by_field,
                SortDirection::Desc => by_field.reverse(),
            }
        });
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn insert(&self, data: NewNode) -> AppResult<Node> {
        let now = Utc::now();
        let node = Node {
            id: NodeId::new(),
            parent_id: data.parent_id,
            kind: data.kind,
            name: data.name,
            path: data.path,
            size_bytes: data.size_bytes,
            mime_type: data.mime_type,
            extension: data.extension,
            checksum_sha256: data.checksum_sha256,
            disk: data.disk,
            absolute_url: data.absolute_url,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().await;
        inner.order.push(node.id);
        inner.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    async fn find(&self, id: NodeId) -> AppResult<Option<Node>> {
        let inner = self.inner.read().await;
        Ok(inner.nodes.get(&id).cloned())
    }

    async fn find_children(&self, parent: Option<NodeId>) -> AppResult<Vec<Node>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows()
            .filter(|n| n.parent_id == parent)
            .cloned()
            .collect())
    }

    async fn subtree(&self, id: NodeId) -> AppResult<Vec<Node>> {
        let inner = self.inner.read().await;
        let Some(root) = inner.nodes.get(&id) else {
            return Ok(Vec::new());
        };

        // Level-order walk so parents always precede their descendants.
        let mut result = vec![root.clone()];
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for node in inner.rows().filter(|n| n.parent_id == Some(current)) {
                // A corrupted chain could lead back to a visited node.
                if result.iter().any(|seen| seen.id == node.id) {
                    continue;
                }
                result.push(node.clone());
                frontier.push(node.id);
            }
        }
        Ok(result)
    }

    async fn update(&self, node: &Node) -> AppResult<Node> {
        let mut inner = self.inner.write().await;
        let Some(existing) = inner.nodes.get_mut(&node.id) else {
            return Err(AppError::not_found(format!("Node {} not found", node.id)));
        };

        let mut updated = node.clone();
        updated.created_at = existing.created_at;
        updated.updated_at = Utc::now();
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: NodeId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let existed = inner.nodes.remove(&id).is_some();
        if existed {
            inner.order.retain(|other| *other != id);
        }
        Ok(existed)
    }

    async fn list(&self, query: &NodeQuery) -> AppResult<Vec<Node>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Node> = inner
            .rows()
            .filter(|n| Self::matches(n, query))
            .cloned()
            .collect();
        drop(inner);

        Self::sort_rows(&mut rows, query);

        let offset = query.offset.unwrap_or(0).max(0) as usize;
        let rows = rows.into_iter().skip(offset);
        Ok(match query.limit {
            Some(limit) if limit >= 0 => rows.take(limit as usize).collect(),
            _ => rows.collect(),
        })
    }

    async fn count(&self, query: &NodeQuery) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.rows().filter(|n| Self::matches(n, query)).count() as u64)
    }
}
