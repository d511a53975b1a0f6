//! Generic tree assembly from flat, parent-referencing rows.
//!
//! Any record that can report its own identifier and its parent's can be
//! arranged into a forest. The builder makes one bucketing pass and one
//! depth-first attachment pass, both O(n); it never sorts, so callers
//! control ordering by ordering the input rows.

use std::collections::HashMap;

use arbor_core::types::NodeId;
use serde::Serialize;

/// A record that can participate in tree assembly.
pub trait TreeRecord {
    /// This record's identifier.
    fn tree_id(&self) -> NodeId;

    /// The identifier of this record's parent, if any. The nil identifier
    /// is treated the same as `None` (legacy root marker).
    fn tree_parent(&self) -> Option<NodeId>;
}

/// A record together with its attached children.
///
/// The record's own fields are flattened into the entry when serialized,
/// and `children` is always present, `[]` at the leaves.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry<T> {
    /// The record itself.
    #[serde(flatten)]
    pub record: T,
    /// Child entries, in input order.
    pub children: Vec<TreeEntry<T>>,
}

impl<T> TreeEntry<T> {
    /// Total number of entries in this subtree, including this one.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeEntry::len).sum::<usize>()
    }

    /// Whether this entry has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arrange flat records into a forest rooted at records whose parent is
/// `None` or the nil identifier.
///
/// Each bucket of children is taken (removed) exactly once when its
/// parent is attached, so every record is visited at most once: records
/// forming a cyclic parent chain are unreachable from any root and are
/// dropped, and the walk always terminates. Records whose parent id does
/// not appear in the input are silently omitted, never surfaced as roots.
pub fn build_forest<T: TreeRecord>(records: Vec<T>) -> Vec<TreeEntry<T>> {
    let mut children_of: HashMap<Option<NodeId>, Vec<T>> = HashMap::new();
    for record in records {
        let parent = record.tree_parent().filter(|p| !p.is_nil());
        children_of.entry(parent).or_default().push(record);
    }

    let roots = children_of.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|root| attach(root, &mut children_of))
        .collect()
}

fn attach<T: TreeRecord>(
    record: T,
    children_of: &mut HashMap<Option<NodeId>, Vec<T>>,
) -> TreeEntry<T> {
    let children = children_of
        .remove(&Some(record.tree_id()))
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach(child, children_of))
        .collect();
    TreeEntry { record, children }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, PartialEq)]
    struct Row {
        id: NodeId,
        parent_id: Option<NodeId>,
        name: &'static str,
    }

    impl TreeRecord for Row {
        fn tree_id(&self) -> NodeId {
            self.id
        }

        fn tree_parent(&self) -> Option<NodeId> {
            self.parent_id
        }
    }

    fn row(id: NodeId, parent: Option<NodeId>, name: &'static str) -> Row {
        Row {
            id,
            parent_id: parent,
            name,
        }
    }

    #[test]
    fn test_nested_forest() {
        let a = NodeId::new();
        let b = NodeId::new();
        let c = NodeId::new();
        let rows = vec![
            row(a, None, "Images"),
            row(b, Some(a), "2024"),
            row(c, Some(b), "a.png"),
        ];

        let forest = build_forest(rows);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].record.name, "Images");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].record.name, "2024");
        assert_eq!(forest[0].children[0].children[0].record.name, "a.png");
        assert!(forest[0].children[0].children[0].children.is_empty());
    }

    #[test]
    fn test_nil_parent_is_a_root() {
        let a = NodeId::new();
        let rows = vec![row(a, Some(NodeId::nil()), "legacy-root")];
        let forest = build_forest(rows);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].record.name, "legacy-root");
    }

    #[test]
    fn test_orphans_are_omitted() {
        let a = NodeId::new();
        let missing = NodeId::new();
        let rows = vec![row(a, Some(missing), "dangling")];
        assert!(build_forest(rows).is_empty());
    }

    #[test]
    fn test_cyclic_chain_terminates_and_drops_members() {
        let a = NodeId::new();
        let b = NodeId::new();
        let c = NodeId::new();
        let rows = vec![
            row(a, Some(b), "a"),
            row(b, Some(a), "b"),
            row(c, None, "sane"),
        ];

        let forest = build_forest(rows);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].record.name, "sane");
    }

    #[test]
    fn test_self_parent_terminates() {
        let a = NodeId::new();
        let rows = vec![row(a, Some(a), "ouroboros")];
        assert!(build_forest(rows).is_empty());
    }

    #[test]
    fn test_input_order_preserved() {
        let root = NodeId::new();
        let c1 = NodeId::new();
        let c2 = NodeId::new();
        let c3 = NodeId::new();
        let rows = vec![
            row(root, None, "root"),
            row(c2, Some(root), "second"),
            row(c1, Some(root), "first"),
            row(c3, Some(root), "third"),
        ];

        let forest = build_forest(rows);
        let names: Vec<_> = forest[0]
            .children
            .iter()
            .map(|c| c.record.name)
            .collect();
        assert_eq!(names, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_children_key_serialized_at_leaves() {
        let a = NodeId::new();
        let forest = build_forest(vec![row(a, None, "leaf")]);
        let json = serde_json::to_value(&forest).expect("serialize");
        assert_eq!(json[0]["name"], "leaf");
        assert_eq!(json[0]["children"], serde_json::json!([]));
    }

    #[test]
    fn test_subtree_len() {
        let a = NodeId::new();
        let b = NodeId::new();
        let forest = build_forest(vec![row(a, None, "a"), row(b, Some(a), "b")]);
        assert_eq!(forest[0].len(), 2);
    }
}
