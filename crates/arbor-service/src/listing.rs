//! Listing modes: flat pages, flat windows, and full trees.
//!
//! One request shape drives three output shapes. Tree mode always wins:
//! it fetches the unbounded row set, forces the id and parent columns
//! through the projection, and nests the rows. Pagination and limits
//! only apply to flat output.

use serde::Serialize;
use serde_json::{Map, Value};

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::types::{NodeId, PageRequest, PageResponse, Projection};
use arbor_core::types::sorting::NodeSort;
use arbor_database::ParentFilter;
use arbor_entity::node::NodeKind;
use arbor_entity::tree::{TreeEntry, TreeRecord};
use arbor_entity::{Node, NodeView};

/// Output-shaping options for a listing call.
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Return a page of flat rows with metadata.
    pub paginate: bool,
    /// Return the full nested tree instead of flat rows.
    pub tree: bool,
    /// Row cap for unpaginated flat listings, and the page size when
    /// paginating. `None` or `-1` mean no cap (default page size).
    pub limit: Option<i64>,
    /// 1-based page number for paginated listings.
    pub page: u64,
    /// Columns to keep in serialized output.
    pub projection: Projection,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            paginate: true,
            tree: false,
            limit: None,
            page: 1,
            projection: Projection::All,
        }
    }
}

/// Filters plus output options for one listing call.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    /// Scope rows by parent: everything, roots only, or one folder's
    /// children.
    pub parent: ParentFilter,
    /// Restrict to folders or files.
    pub kind: Option<NodeKind>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    /// Row ordering.
    pub sort: NodeSort,
    /// Output shape.
    pub options: ListOptions,
}

/// The concrete fetch strategy resolved from [`ListOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Unbounded fetch, nested output.
    Tree,
    /// Offset/limit page with metadata.
    Page { page: u64, page_size: u64 },
    /// Flat rows, optionally capped.
    Flat { limit: Option<i64> },
}

impl ListMode {
    /// Resolve the decision table: tree wins outright, then pagination,
    /// then the explicit row cap.
    pub fn resolve(options: &ListOptions) -> Self {
        if options.tree {
            return Self::Tree;
        }

        if options.paginate {
            let page_size = match options.limit {
                Some(limit) if limit > 0 => limit as u64,
                _ => PageRequest::default().page_size,
            };
            return Self::Page {
                page: options.page.max(1),
                page_size,
            };
        }

        match options.limit {
            Some(limit) if limit > 0 => Self::Flat { limit: Some(limit) },
            _ => Self::Flat { limit: None },
        }
    }
}

/// A serialized node row narrowed to the requested columns.
///
/// The typed id and parent reference are captured before narrowing, so
/// tree assembly still works when the projection drops either column
/// from the serialized map.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectedNode {
    /// The retained view fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip)]
    id: NodeId,
    #[serde(skip)]
    parent_id: Option<NodeId>,
}

impl ProjectedNode {
    /// Serialize a node through its view and keep only the projected
    /// columns.
    pub fn new(node: &Node, projection: &Projection) -> AppResult<Self> {
        let view = NodeView::from(node);
        let Value::Object(full) = serde_json::to_value(&view)? else {
            return Err(AppError::internal("Node view did not serialize to an object"));
        };

        let fields = if projection.is_all() {
            full
        } else {
            full.into_iter()
                .filter(|(key, _)| projection.selects(key))
                .collect()
        };

        Ok(Self {
            fields,
            id: node.id,
            parent_id: node.parent_id,
        })
    }

    /// Project a whole row set.
    pub fn rows(nodes: &[Node], projection: &Projection) -> AppResult<Vec<Self>> {
        nodes.iter().map(|n| Self::new(n, projection)).collect()
    }
}

impl TreeRecord for ProjectedNode {
    fn tree_id(&self) -> NodeId {
        self.id
    }

    fn tree_parent(&self) -> Option<NodeId> {
        self.parent_id
    }
}

/// Result of a listing call in one of the three output shapes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing {
    /// A page of flat rows with metadata.
    Page(PageResponse<ProjectedNode>),
    /// Flat rows without metadata.
    Flat(Vec<ProjectedNode>),
    /// The nested forest.
    Tree(Vec<TreeEntry<ProjectedNode>>),
}

impl Listing {
    /// Number of top-level entries in the result.
    pub fn len(&self) -> usize {
        match self {
            Self::Page(page) => page.items.len(),
            Self::Flat(rows) => rows.len(),
            Self::Tree(roots) => roots.len(),
        }
    }

    /// Whether the result holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
