//! Core type definitions used across the Arbor workspace.

pub mod id;
pub mod pagination;
pub mod projection;
pub mod sorting;

pub use id::NodeId;
pub use pagination::{PageRequest, PageResponse};
pub use projection::Projection;
pub use sorting::{NodeSort, NodeSortField, SortDirection};
