//! Newtype wrapper around [`uuid::Uuid`] for node identifiers.
//!
//! Using a distinct type prevents accidentally passing an unrelated UUID
//! where a node identifier is expected. When the `sqlx` feature is
//! enabled, the ID type also implements `sqlx::Type`, `sqlx::Encode`,
//! and `sqlx::Decode` for PostgreSQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node in the resource tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an identifier from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The all-zero identifier.
    ///
    /// Legacy rows imported from systems that used `0` as the root marker
    /// carry this value in `parent_id`; tree assembly treats it the same
    /// as a missing parent.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the all-zero identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }

    /// Return a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<NodeId> for Uuid {
    fn from(id: NodeId) -> Uuid {
        id.0
    }
}

#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Postgres> for NodeId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "sqlx")]
impl<'q> sqlx::Encode<'q, sqlx::Postgres> for NodeId {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Uuid as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for NodeId {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <Uuid as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_new() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_node_id_display() {
        let uuid = Uuid::new_v4();
        let id = NodeId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_node_id_from_str() {
        let uuid = Uuid::new_v4();
        let id: NodeId = uuid.to_string().parse().expect("should parse");
        assert_eq!(id.0, uuid);
    }

    #[test]
    fn test_nil_sentinel() {
        assert!(NodeId::nil().is_nil());
        assert!(!NodeId::new().is_nil());
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = NodeId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: NodeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
