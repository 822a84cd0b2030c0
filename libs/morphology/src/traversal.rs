//! # Tree Traversal
//!
//! Depth-first pre-order walks driven by an explicit work stack, so trees
//! with tens of thousands of compartments never touch the call stack.
//!
//! ## Order
//!
//! A visited node pushes its existing children in stored order; the next
//! node is popped from the top. The last child is therefore walked first,
//! and every subtree is finished before its siblings are started. Polyline
//! assembly relies on this: after a leaf closes a branch, the next node
//! popped is the root of a sibling subtree whose parent was already emitted.
//!
//! ## Malformed input
//!
//! A valid morphology is a forest, so no walk can visit more nodes than the
//! tree holds. Exceeding that budget means a cycle (or a node listed under
//! two parents) and fails with [`MorphologyError::MalformedTree`].

use crate::compartment::Compartment;
use crate::error::MorphologyError;
use crate::tree::CompartmentTree;

/// Pre-order walk of the subtree under `root`.
///
/// Child ids missing from the tree are skipped.
///
/// # Errors
///
/// Returns [`MorphologyError::MalformedTree`] if the walk visits more nodes
/// than the tree contains.
///
/// # Example
///
/// ```rust
/// use morphology::{preorder, Compartment, CompartmentTree, CompartmentType, NO_PARENT};
/// use glam::DVec3;
///
/// let tree = CompartmentTree::from_compartments(vec![
///     Compartment::new(1, CompartmentType::SOMA, DVec3::ZERO, 1.0, NO_PARENT),
///     Compartment::new(2, CompartmentType::AXON, DVec3::X, 1.0, 1),
///     Compartment::new(3, CompartmentType::AXON, DVec3::Y, 1.0, 1),
/// ])
/// .unwrap();
///
/// let root = tree.root().unwrap();
/// let ids: Vec<_> = preorder(&tree, root).unwrap().iter().map(|c| c.id).collect();
/// assert_eq!(ids, vec![1, 3, 2]);
/// ```
pub fn preorder<'a>(
    tree: &'a CompartmentTree,
    root: &'a Compartment,
) -> Result<Vec<&'a Compartment>, MorphologyError> {
    let mut budget = tree.len().max(1);
    let mut order = Vec::new();
    walk(tree, root, &mut budget, &mut order)?;
    Ok(order)
}

/// Pre-order walks of every root, concatenated in root order.
///
/// The visit budget is shared across roots, so a node reachable from two
/// roots is reported as malformed as well.
///
/// # Errors
///
/// Returns [`MorphologyError::MalformedTree`] on a cycle or shared subtree.
pub fn preorder_forest(tree: &CompartmentTree) -> Result<Vec<&Compartment>, MorphologyError> {
    let mut budget = tree.len();
    let mut order = Vec::with_capacity(tree.len());

    for (i, root) in tree.roots().enumerate() {
        let before = order.len();
        walk(tree, root, &mut budget, &mut order)?;
        log::debug!(
            "root {i} (id {}): {} compartments",
            root.id,
            order.len() - before
        );
    }

    Ok(order)
}

fn walk<'a>(
    tree: &'a CompartmentTree,
    root: &'a Compartment,
    budget: &mut usize,
    order: &mut Vec<&'a Compartment>,
) -> Result<(), MorphologyError> {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if *budget == 0 {
            return Err(MorphologyError::malformed(format!(
                "traversal from compartment {} exceeded {} visits (cycle or shared child near id {})",
                root.id,
                tree.len(),
                node.id
            )));
        }
        *budget -= 1;
        order.push(node);
        stack.extend(tree.children_of(node));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment::{CompartmentId, CompartmentType, NO_PARENT};
    use glam::DVec3;

    fn node(id: CompartmentId, parent: CompartmentId, children: &[CompartmentId]) -> Compartment {
        let mut c = Compartment::new(id, CompartmentType::AXON, DVec3::ZERO, 1.0, parent);
        c.children = children.to_vec();
        c
    }

    fn tree_of(nodes: Vec<Compartment>) -> CompartmentTree {
        let mut tree = CompartmentTree::new();
        for n in nodes {
            tree.insert(n);
        }
        tree
    }

    fn ids(order: &[&Compartment]) -> Vec<CompartmentId> {
        order.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_parent_before_child() {
        let tree = tree_of(vec![
            node(1, NO_PARENT, &[2, 5]),
            node(2, 1, &[3, 4]),
            node(3, 2, &[]),
            node(4, 2, &[]),
            node(5, 1, &[]),
        ]);
        let order = preorder(&tree, tree.get(1).unwrap()).unwrap();
        assert_eq!(ids(&order), vec![1, 5, 2, 4, 3]);
    }

    #[test]
    fn test_missing_children_skipped() {
        let tree = tree_of(vec![node(1, NO_PARENT, &[2, 77]), node(2, 1, &[88])]);
        let order = preorder(&tree, tree.get(1).unwrap()).unwrap();
        assert_eq!(ids(&order), vec![1, 2]);
    }

    #[test]
    fn test_cycle_is_malformed() {
        let tree = tree_of(vec![
            node(1, NO_PARENT, &[2]),
            node(2, 1, &[3]),
            node(3, 2, &[2]),
        ]);
        let err = preorder(&tree, tree.get(1).unwrap()).unwrap_err();
        assert!(matches!(err, MorphologyError::MalformedTree { .. }));
    }

    #[test]
    fn test_self_loop_is_malformed() {
        let tree = tree_of(vec![node(1, NO_PARENT, &[1])]);
        assert!(preorder_forest(&tree).is_err());
    }

    #[test]
    fn test_forest_concatenates_roots() {
        let tree = tree_of(vec![
            node(1, NO_PARENT, &[2]),
            node(2, 1, &[]),
            node(10, NO_PARENT, &[11]),
            node(11, 10, &[]),
        ]);
        let order = preorder_forest(&tree).unwrap();
        assert_eq!(ids(&order), vec![1, 2, 10, 11]);
    }

    #[test]
    fn test_shared_subtree_across_roots_is_malformed() {
        let tree = tree_of(vec![
            node(1, NO_PARENT, &[3]),
            node(2, NO_PARENT, &[3]),
            node(3, 1, &[]),
        ]);
        assert!(preorder_forest(&tree).is_err());
    }

    #[test]
    fn test_empty_forest() {
        let tree = CompartmentTree::new();
        assert!(preorder_forest(&tree).unwrap().is_empty());
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let depth = 200_000;
        let mut nodes = Vec::with_capacity(depth);
        for id in 0..depth as CompartmentId {
            let parent = if id == 0 { NO_PARENT } else { id - 1 };
            let children = if id + 1 < depth as CompartmentId {
                vec![id + 1]
            } else {
                Vec::new()
            };
            nodes.push(node(id, parent, &children));
        }
        let tree = tree_of(nodes);
        assert_eq!(preorder_forest(&tree).unwrap().len(), depth);
    }
}
