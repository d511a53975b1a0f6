//! The node record store abstraction.
//!
//! Both the PostgreSQL store and the in-process memory store implement
//! [`NodeStore`]; everything above this layer is written against the
//! trait and never against a concrete store.

use async_trait::async_trait;

use arbor_core::result::AppResult;
use arbor_core::types::sorting::NodeSort;
use arbor_core::types::NodeId;
use arbor_entity::node::{NewNode, Node, NodeKind};

/// Which parent a listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentFilter {
    /// No parent constraint.
    #[default]
    Any,
    /// Root nodes only (`parent_id IS NULL`).
    Root,
    /// Direct children of the given node.
    Of(NodeId),
}

/// A declarative node listing query.
///
/// `sort`, `roots_first`, `limit`, and `offset` shape the row set;
/// `count` ignores them and evaluates the filters alone.
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    /// Parent scope.
    pub parent: ParentFilter,
    /// Restrict to one node kind.
    pub kind: Option<NodeKind>,
    /// Case-insensitive substring match on the display name.
    pub search: Option<String>,
    /// Identifiers to leave out of the result.
    pub exclude: Vec<NodeId>,
    /// Sort specification. Name ordering is case-insensitive in every
    /// store implementation.
    pub sort: NodeSort,
    /// Order rows with roots (`parent_id IS NULL`) before non-roots,
    /// ahead of the sort field. Tree assembly relies on this.
    pub roots_first: bool,
    /// Maximum number of rows to return.
    pub limit: Option<i64>,
    /// Number of rows to skip.
    pub offset: Option<i64>,
}

impl NodeQuery {
    /// Query scoped to direct children of `parent` (roots when `None`).
    pub fn children_of(parent: Option<NodeId>) -> Self {
        Self {
            parent: match parent {
                Some(id) => ParentFilter::Of(id),
                None => ParentFilter::Root,
            },
            ..Self::default()
        }
    }

    /// Query over every folder node, name-ordered, minus `exclude`.
    pub fn folders(exclude: Vec<NodeId>) -> Self {
        Self {
            kind: Some(NodeKind::Folder),
            exclude,
            ..Self::default()
        }
    }
}

/// Persistence operations for node records.
#[async_trait]
pub trait NodeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new node and return the stored row.
    async fn insert(&self, data: NewNode) -> AppResult<Node>;

    /// Find a node by ID.
    async fn find(&self, id: NodeId) -> AppResult<Option<Node>>;

    /// List direct children of a node (root nodes when `parent` is
    /// `None`), in creation order.
    async fn find_children(&self, parent: Option<NodeId>) -> AppResult<Vec<Node>>;

    /// Fetch a node and all of its descendants. The node itself comes
    /// first and parents always precede their descendants.
    async fn subtree(&self, id: NodeId) -> AppResult<Vec<Node>>;

    /// Persist every mutable field of the node and return the stored
    /// row. Bumps `updated_at`.
    async fn update(&self, node: &Node) -> AppResult<Node>;

    /// Delete a node record. Returns `true` if a row was removed.
    async fn delete(&self, id: NodeId) -> AppResult<bool>;

    /// List nodes matching the query.
    async fn list(&self, query: &NodeQuery) -> AppResult<Vec<Node>>;

    /// Count nodes matching the query's filters, ignoring ordering and
    /// windowing.
    async fn count(&self, query: &NodeQuery) -> AppResult<u64>;
}
