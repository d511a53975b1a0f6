//! Sorting types for listing operations.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Asc
    }
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Whitelisted sortable node columns.
///
/// Requests may name arbitrary fields; anything outside this set falls
/// back to sorting by name, so caller input never reaches SQL directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSortField {
    /// Sort by display name.
    Name,
    /// Sort by size in bytes.
    Size,
    /// Sort by creation timestamp.
    CreatedAt,
}

impl Default for NodeSortField {
    fn default() -> Self {
        Self::Name
    }
}

impl NodeSortField {
    /// Resolve a requested field name, falling back to `Name` for anything
    /// not in the whitelist.
    pub fn from_request(field: &str) -> Self {
        match field {
            "size" => Self::Size,
            "created_at" => Self::CreatedAt,
            _ => Self::Name,
        }
    }

    /// Return the column name for this field.
    pub fn as_column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Size => "size_bytes",
            Self::CreatedAt => "created_at",
        }
    }
}

/// A sort specification: a whitelisted field plus a direction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NodeSort {
    /// Which column to sort by.
    #[serde(default)]
    pub field: NodeSortField,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl NodeSort {
    /// Create a new sort specification.
    pub fn new(field: NodeSortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Ascending sort on the given field.
    pub fn asc(field: NodeSortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending sort on the given field.
    pub fn desc(field: NodeSortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_falls_back_to_name() {
        assert_eq!(NodeSortField::from_request("name"), NodeSortField::Name);
        assert_eq!(NodeSortField::from_request("size"), NodeSortField::Size);
        assert_eq!(
            NodeSortField::from_request("created_at"),
            NodeSortField::CreatedAt
        );
        assert_eq!(
            NodeSortField::from_request("mime_type; DROP TABLE nodes"),
            NodeSortField::Name
        );
    }
}
