//! PostgreSQL node store implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use arbor_core::error::{AppError, ErrorKind};
use arbor_core::result::AppResult;
use arbor_core::types::sorting::NodeSortField;
use arbor_core::types::NodeId;
use arbor_entity::node::{NewNode, Node};

use crate::store::{NodeQuery, NodeStore, ParentFilter};

/// Maximum recursion depth for subtree queries. Parent chains are
/// acyclic by construction; the cap keeps a corrupted chain from
/// recursing without bound.
const MAX_SUBTREE_DEPTH: i32 = 1000;

/// Node store backed by the `nodes` table.
#[derive(Debug, Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    /// Create a new PostgreSQL node store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append the query's filter conditions to a builder that already
    /// ends in a `WHERE`-compatible position.
    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &NodeQuery) {
        match query.parent {
            ParentFilter::Any => {}
            ParentFilter::Root => {
                builder.push(" AND parent_id IS NULL");
            }
            ParentFilter::Of(id) => {
                builder.push(" AND parent_id = ");
                builder.push_bind(id.into_uuid());
            }
        }

        if let Some(kind) = query.kind {
            builder.push(" AND kind = ");
            builder.push_bind(kind);
        }

        if let Some(search) = &query.search {
            builder.push(" AND name ILIKE ");
            builder.push_bind(format!("%{search}%"));
        }

        if !query.exclude.is_empty() {
            let ids: Vec<Uuid> = query.exclude.iter().map(|id| id.into_uuid()).collect();
            builder.push(" AND id <> ALL(");
            builder.push_bind(ids);
            builder.push(")");
        }
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn insert(&self, data: NewNode) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "INSERT INTO nodes (parent_id, kind, name, path, size_bytes, mime_type, \
             extension, checksum_sha256, disk, absolute_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(data.parent_id)
        .bind(data.kind)
        .bind(&data.name)
        .bind(&data.path)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(&data.extension)
        .bind(&data.checksum_sha256)
        .bind(&data.disk)
        .bind(&data.absolute_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert node", e))
    }

    async fn find(&self, id: NodeId) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find node", e))
    }

    async fn find_children(&self, parent: Option<NodeId>) -> AppResult<Vec<Node>> {
        let query = match parent {
            Some(id) => sqlx::query_as::<_, Node>(
                "SELECT * FROM nodes WHERE parent_id = $1 ORDER BY created_at ASC",
            )
            .bind(id),
            None => sqlx::query_as::<_, Node>(
                "SELECT * FROM nodes WHERE parent_id IS NULL ORDER BY created_at ASC",
            ),
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn subtree(&self, id: NodeId) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            "WITH RECURSIVE subtree AS ( \
                SELECT n.*, 0 AS depth FROM nodes n WHERE n.id = $1 \
                UNION ALL \
                SELECT c.*, s.depth + 1 FROM nodes c \
                INNER JOIN subtree s ON c.parent_id = s.id \
                WHERE s.depth < $2 \
             ) SELECT * FROM subtree ORDER BY depth ASC, created_at ASC",
        )
        .bind(id)
        .bind(MAX_SUBTREE_DEPTH)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load subtree", e))
    }

    async fn update(&self, node: &Node) -> AppResult<Node> {
        sqlx::query_as::<_, Node>(
            "UPDATE nodes SET parent_id = $2, kind = $3, name = $4, path = $5, \
             size_bytes = $6, mime_type = $7, extension = $8, checksum_sha256 = $9, \
             disk = $10, absolute_url = $11, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(node.id)
        .bind(node.parent_id)
        .bind(node.kind)
        .bind(&node.name)
        .bind(&node.path)
        .bind(node.size_bytes)
        .bind(&node.mime_type)
        .bind(&node.extension)
        .bind(&node.checksum_sha256)
        .bind(&node.disk)
        .bind(&node.absolute_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update node", e))?
        .ok_or_else(|| AppError::not_found(format!("Node {} not found", node.id)))
    }

    async fn delete(&self, id: NodeId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete node", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, query: &NodeQuery) -> AppResult<Vec<Node>> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT * FROM nodes WHERE TRUE");
        Self::push_filters(&mut builder, query);

        builder.push(" ORDER BY ");
        if query.roots_first {
            builder.push("CASE WHEN parent_id IS NULL THEN 0 ELSE 1 END, ");
        }
        match query.sort.field {
            NodeSortField::Name => builder.push("LOWER(name) "),
            NodeSortField::Size => builder.push("size_bytes "),
            NodeSortField::CreatedAt => builder.push("created_at "),
        };
        builder.push(query.sort.direction.as_sql());

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        }

        builder
            .build_query_as::<Node>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list nodes", e))
    }

    async fn count(&self, query: &NodeQuery) -> AppResult<u64> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM nodes WHERE TRUE");
        Self::push_filters(&mut builder, query);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count nodes", e))?;
        Ok(count as u64)
    }
}
