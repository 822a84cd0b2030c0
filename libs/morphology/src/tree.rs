//! # Compartment Tree
//!
//! Arena of compartments addressed by id. Parent and child links are ids
//! resolved through the tree, so ownership of every compartment stays with
//! the tree.

use crate::compartment::{Compartment, CompartmentId, CompartmentType};
use crate::error::MorphologyError;
use std::collections::HashMap;

/// A morphology: a forest of compartments keyed by id.
///
/// Insertion order is preserved so root discovery and traversal are
/// deterministic for a given input.
///
/// # Example
///
/// ```rust
/// use morphology::{Compartment, CompartmentTree, CompartmentType, NO_PARENT};
/// use glam::DVec3;
///
/// let tree = CompartmentTree::from_compartments(vec![
///     Compartment::new(1, CompartmentType::SOMA, DVec3::ZERO, 5.0, NO_PARENT),
///     Compartment::new(2, CompartmentType::AXON, DVec3::X, 1.0, 1),
/// ])
/// .unwrap();
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.get(1).map(|c| c.children.clone()), Some(vec![2]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompartmentTree {
    compartments: Vec<Compartment>,
    index: HashMap<CompartmentId, usize>,
}

impl CompartmentTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree with room for `capacity` compartments.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            compartments: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Builds a tree from compartments, deriving every `children` list from
    /// the `parent` ids in input order.
    ///
    /// Children lists on the input are discarded. A parent id that is not in
    /// the input leaves the compartment unlinked (it is simply not reached
    /// from any root).
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::DuplicateId`] if two compartments share an id.
    pub fn from_compartments(
        compartments: impl IntoIterator<Item = Compartment>,
    ) -> Result<Self, MorphologyError> {
        let iter = compartments.into_iter();
        let mut tree = Self::with_capacity(iter.size_hint().0);

        for mut compartment in iter {
            if tree.index.contains_key(&compartment.id) {
                return Err(MorphologyError::DuplicateId(compartment.id));
            }
            compartment.children.clear();
            tree.index.insert(compartment.id, tree.compartments.len());
            tree.compartments.push(compartment);
        }

        let mut orphans = 0usize;
        for i in 0..tree.compartments.len() {
            let (id, parent) = (tree.compartments[i].id, tree.compartments[i].parent);
            if tree.compartments[i].is_root() {
                continue;
            }
            match tree.index.get(&parent) {
                Some(&p) => tree.compartments[p].children.push(id),
                None => orphans += 1,
            }
        }
        if orphans > 0 {
            log::warn!("{orphans} compartment(s) reference a missing parent and will not be rendered");
        }

        Ok(tree)
    }

    /// Inserts a compartment as given, keeping its `children` list.
    ///
    /// Returns the previous compartment with the same id, which is replaced
    /// in place.
    pub fn insert(&mut self, compartment: Compartment) -> Option<Compartment> {
        match self.index.get(&compartment.id) {
            Some(&i) => Some(std::mem::replace(&mut self.compartments[i], compartment)),
            None => {
                self.index.insert(compartment.id, self.compartments.len());
                self.compartments.push(compartment);
                None
            }
        }
    }

    /// Returns the number of compartments.
    #[inline]
    pub fn len(&self) -> usize {
        self.compartments.len()
    }

    /// Returns true if the tree holds no compartments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.compartments.is_empty()
    }

    /// Looks up a compartment by id.
    #[inline]
    pub fn get(&self, id: CompartmentId) -> Option<&Compartment> {
        self.index.get(&id).map(|&i| &self.compartments[i])
    }

    /// Returns true if a compartment with this id exists.
    #[inline]
    pub fn contains(&self, id: CompartmentId) -> bool {
        self.index.contains_key(&id)
    }

    /// Iterates compartments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Compartment> {
        self.compartments.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Compartment> {
        self.compartments.iter_mut()
    }

    /// All compartments without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &Compartment> {
        self.compartments.iter().filter(|c| c.is_root())
    }

    /// The first root of any type.
    pub fn root(&self) -> Option<&Compartment> {
        self.roots().next()
    }

    /// The cell body: the first root whose type is [`CompartmentType::SOMA`].
    pub fn soma(&self) -> Option<&Compartment> {
        self.roots().find(|c| c.kind == CompartmentType::SOMA)
    }

    /// The parent of a compartment, if it exists in this tree.
    pub fn parent_of(&self, compartment: &Compartment) -> Option<&Compartment> {
        if compartment.is_root() {
            return None;
        }
        self.get(compartment.parent)
    }

    /// Children of a compartment that exist in this tree, in stored order.
    pub fn children_of<'a>(
        &'a self,
        compartment: &'a Compartment,
    ) -> impl Iterator<Item = &'a Compartment> + 'a {
        compartment.children.iter().filter_map(move |&id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment::NO_PARENT;
    use glam::DVec3;

    fn node(id: CompartmentId, parent: CompartmentId) -> Compartment {
        let kind = if parent == NO_PARENT {
            CompartmentType::SOMA
        } else {
            CompartmentType::BASAL_DENDRITE
        };
        Compartment::new(id, kind, DVec3::new(id as f64, 0.0, 0.0), 1.0, parent)
    }

    #[test]
    fn test_children_follow_input_order() {
        let tree =
            CompartmentTree::from_compartments(vec![node(1, NO_PARENT), node(3, 1), node(2, 1)])
                .unwrap();
        assert_eq!(tree.get(1).unwrap().children, vec![3, 2]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = CompartmentTree::from_compartments(vec![node(1, NO_PARENT), node(1, NO_PARENT)])
            .unwrap_err();
        assert!(matches!(err, MorphologyError::DuplicateId(1)));
    }

    #[test]
    fn test_missing_parent_leaves_node_unlinked() {
        let tree = CompartmentTree::from_compartments(vec![node(1, NO_PARENT), node(5, 99)])
            .unwrap();
        assert!(tree.get(1).unwrap().children.is_empty());
        assert!(tree.parent_of(tree.get(5).unwrap()).is_none());
        assert_eq!(tree.roots().count(), 1);
    }

    #[test]
    fn test_multiple_roots_and_soma() {
        let mut axon_root = node(10, NO_PARENT);
        axon_root.kind = CompartmentType::AXON;
        let tree =
            CompartmentTree::from_compartments(vec![axon_root, node(1, NO_PARENT), node(2, 1)])
                .unwrap();
        let roots: Vec<_> = tree.roots().map(|c| c.id).collect();
        assert_eq!(roots, vec![10, 1]);
        assert_eq!(tree.root().map(|c| c.id), Some(10));
        assert_eq!(tree.soma().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut tree = CompartmentTree::new();
        assert!(tree.insert(node(1, NO_PARENT)).is_none());
        assert!(tree.insert(node(2, 1)).is_none());
        let mut replacement = node(1, NO_PARENT);
        replacement.radius = 7.0;
        let previous = tree.insert(replacement).unwrap();
        assert_eq!(previous.radius, 1.0);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.iter().next().map(|c| c.radius), Some(7.0));
    }

    #[test]
    fn test_children_of_skips_missing_ids() {
        let mut tree = CompartmentTree::new();
        let mut root = node(1, NO_PARENT);
        root.children = vec![2, 42];
        tree.insert(root);
        tree.insert(node(2, 1));
        let root = tree.get(1).unwrap();
        let ids: Vec<_> = tree.children_of(root).map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
    }
}
