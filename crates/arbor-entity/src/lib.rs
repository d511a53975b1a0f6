//! # arbor-entity
//!
//! Domain entity models for Arbor. Every struct in this crate represents
//! a database table row or a derived view of one. Database entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! `sqlx::FromRow`.
//!
//! The crate also hosts the generic tree builder that turns flat,
//! parent-referencing rows into nested forests.

pub mod node;
pub mod tree;

pub use node::{FolderRef, NewNode, Node, NodeKind, NodeView};
pub use tree::{TreeEntry, TreeRecord, build_forest};
