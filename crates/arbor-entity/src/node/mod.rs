//! Node domain entities.

pub mod model;
pub mod view;

pub use model::{NewNode, Node, NodeKind};
pub use view::{FolderRef, NodeView};
