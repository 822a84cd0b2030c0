//! # Polyline Assembly
//!
//! Flattens a compartment forest into one polyline per branch with parallel
//! per-point attributes.
//!
//! ## Algorithm
//!
//! Nodes are visited in pre-order. Each node becomes exactly one point. A
//! branch opened below an already placed node starts with that node's point
//! index, so sibling branches share their junction point instead of
//! duplicating it. A node with no existing children closes the branch.
//!
//! One compartment is the designated root: the caller names it, otherwise
//! it is the first root of the forest, whatever its type. Its point radius
//! is replaced by the raw radius of its last visited child when that radius
//! is positive.

use crate::color::{ColorPolicy, Rgb};
use crate::error::MeshError;
use config::constants::DEFAULT_MIN_RADIUS;
use glam::DVec3;
use log::debug;
use morphology::{
    preorder_forest, Compartment, CompartmentId, CompartmentTree, CompartmentType,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Point cloud with one index list per branch.
///
/// All per-point vectors are parallel to `points`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylineBuffer {
    /// Point positions.
    pub points: Vec<DVec3>,
    /// Radius per point.
    pub radii: Vec<f64>,
    /// Compartment type per point.
    pub kinds: Vec<CompartmentType>,
    /// Color per point.
    pub colors: Vec<Rgb>,
    /// Source compartment per point.
    pub compartment_ids: Vec<CompartmentId>,
    /// One index list per branch.
    pub lines: Vec<Vec<u32>>,
    /// Point of the designated root, if the tree has one.
    pub soma_point: Option<u32>,
}

impl PolylineBuffer {
    /// Builds a buffer from free-standing lines of `(position, radius)`
    /// samples, such as projection tracts, with no tree behind them.
    ///
    /// Lines never share points. Point ids count up from 0 and every point
    /// gets type 0 and `color`.
    pub fn from_lines(lines: &[Vec<(DVec3, f64)>], color: Rgb) -> Self {
        let mut buffer = Self::default();
        for line in lines {
            let indices = line
                .iter()
                .map(|&(position, radius)| {
                    let id = buffer.points.len() as CompartmentId;
                    buffer.push_point(position, radius, CompartmentType(0), color, id)
                })
                .collect();
            buffer.lines.push(indices);
        }
        buffer
    }

    /// Number of points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of branches.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// True if no points were assembled.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Radius attribute of the designated root point.
    pub fn soma_radius(&self) -> Option<f64> {
        self.soma_point.map(|i| self.radii[i as usize])
    }

    /// Color of the designated root point.
    pub fn soma_color(&self) -> Option<Rgb> {
        self.soma_point.map(|i| self.colors[i as usize])
    }

    fn push_point(
        &mut self,
        position: DVec3,
        radius: f64,
        kind: CompartmentType,
        color: Rgb,
        id: CompartmentId,
    ) -> u32 {
        let index = self.points.len() as u32;
        self.points.push(position);
        self.radii.push(radius);
        self.kinds.push(kind);
        self.colors.push(color);
        self.compartment_ids.push(id);
        index
    }
}

/// Options for [`assemble`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyOptions {
    /// Lower bound applied to every recorded radius.
    pub min_radius: f64,
    /// Compartment rendered as the soma; the first root when unset.
    pub root: Option<CompartmentId>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            min_radius: DEFAULT_MIN_RADIUS,
            root: None,
        }
    }
}

impl AssemblyOptions {
    /// Resolves the designated root in `tree`.
    ///
    /// Returns `None` only for an empty tree without a designation.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidOptions`] when the designated id is not
    /// in the tree.
    pub fn designated_root<'a>(
        &self,
        tree: &'a CompartmentTree,
    ) -> Result<Option<&'a Compartment>, MeshError> {
        match self.root {
            Some(id) => tree.get(id).map(Some).ok_or_else(|| {
                MeshError::invalid_options(format!("root compartment {id} is not in the tree"))
            }),
            None => Ok(tree.root()),
        }
    }
}

/// Builds the polyline buffer of a whole forest.
///
/// The designated root's point radius is replaced by the unclamped radius of
/// its last visited child when that radius is positive.
///
/// # Errors
///
/// Returns [`MeshError::Tree`] for cyclic or shared structure,
/// [`MeshError::ColorResolution`] when the color policy cannot color a node
/// and [`MeshError::InvalidOptions`] for an unknown designated root.
///
/// # Example
///
/// ```rust
/// use morphology::parse_swc;
/// use morphology_mesh::{assemble, AssemblyOptions, ColorPolicy};
///
/// let tree = parse_swc("1 1 0 0 0 0 -1\n2 3 0 5 0 2 1\n3 3 0 9 0 1 2\n").unwrap();
/// let buffer = assemble(&tree, &ColorPolicy::by_type(), &AssemblyOptions::default()).unwrap();
/// assert_eq!(buffer.lines, vec![vec![0, 1, 2]]);
/// assert_eq!(buffer.soma_radius(), Some(2.0));
/// ```
pub fn assemble(
    tree: &CompartmentTree,
    color: &ColorPolicy,
    options: &AssemblyOptions,
) -> Result<PolylineBuffer, MeshError> {
    let order = preorder_forest(tree)?;
    let soma_id = options.designated_root(tree)?.map(|c| c.id);

    let mut buffer = PolylineBuffer::default();
    let mut point_of: HashMap<CompartmentId, u32> = HashMap::with_capacity(order.len());
    let mut branch: Vec<u32> = Vec::new();

    let mut soma_child_radius: Option<f64> = None;

    for node in order {
        if branch.is_empty() && !node.is_root() {
            if let Some(&parent_point) = point_of.get(&node.parent) {
                branch.push(parent_point);
            }
        }

        let index = buffer.push_point(
            node.position,
            node.radius.max(options.min_radius),
            node.kind,
            color.color_of(node)?,
            node.id,
        );
        point_of.insert(node.id, index);
        branch.push(index);

        if soma_id == Some(node.id) {
            buffer.soma_point = Some(index);
        } else if !node.is_root() && soma_id == Some(node.parent) {
            soma_child_radius = Some(node.radius);
        }

        if tree.children_of(node).next().is_none() {
            buffer.lines.push(std::mem::take(&mut branch));
        }
    }

    if let (Some(point), Some(radius)) = (buffer.soma_point, soma_child_radius) {
        if radius > 0.0 {
            buffer.radii[point as usize] = radius;
        }
    }

    debug!(
        "assembled {} points in {} branches",
        buffer.point_count(),
        buffer.line_count()
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphology::{Compartment, NO_PARENT};

    fn node(id: CompartmentId, kind: CompartmentType, radius: f64, parent: CompartmentId) -> Compartment {
        Compartment::new(id, kind, DVec3::new(id as f64, 0.0, 0.0), radius, parent)
    }

    fn build(nodes: Vec<Compartment>) -> PolylineBuffer {
        let tree = CompartmentTree::from_compartments(nodes).unwrap();
        assemble(&tree, &ColorPolicy::by_type(), &AssemblyOptions::default()).unwrap()
    }

    #[test]
    fn test_branches_share_junction_point() {
        // 1 -> {2, 4}, 2 -> 3
        let buffer = build(vec![
            node(1, CompartmentType::SOMA, 5.0, NO_PARENT),
            node(2, CompartmentType::BASAL_DENDRITE, 1.0, 1),
            node(3, CompartmentType::BASAL_DENDRITE, 1.0, 2),
            node(4, CompartmentType::AXON, 1.0, 1),
        ]);
        // Last child first: 1, 4, 2, 3
        assert_eq!(buffer.compartment_ids, vec![1, 4, 2, 3]);
        assert_eq!(buffer.lines, vec![vec![0, 1], vec![0, 2, 3]]);
        assert_eq!(buffer.point_count(), 4);
    }

    #[test]
    fn test_soma_radius_from_child() {
        let buffer = build(vec![
            node(1, CompartmentType::SOMA, 0.0, NO_PARENT),
            node(2, CompartmentType::AXON, 3.0, 1),
        ]);
        assert_eq!(buffer.soma_radius(), Some(3.0));
        // Child keeps its own radius
        assert_eq!(buffer.radii[1], 3.0);
    }

    #[test]
    fn test_soma_radius_kept_without_children() {
        let buffer = build(vec![node(1, CompartmentType::SOMA, 0.0, NO_PARENT)]);
        assert_eq!(buffer.soma_radius(), Some(0.0));
        assert_eq!(buffer.lines, vec![vec![0]]);
    }

    #[test]
    fn test_soma_radius_kept_when_child_radius_zero() {
        let buffer = build(vec![
            node(1, CompartmentType::SOMA, 4.0, NO_PARENT),
            node(2, CompartmentType::AXON, 0.0, 1),
        ]);
        assert_eq!(buffer.soma_radius(), Some(4.0));
    }

    #[test]
    fn test_last_visited_soma_child_wins() {
        // Children visited in reverse: 3 then 2
        let buffer = build(vec![
            node(1, CompartmentType::SOMA, 0.0, NO_PARENT),
            node(2, CompartmentType::AXON, 2.0, 1),
            node(3, CompartmentType::AXON, 7.0, 1),
        ]);
        assert_eq!(buffer.soma_radius(), Some(2.0));
    }

    #[test]
    fn test_first_root_is_designated_whatever_its_type() {
        let buffer = build(vec![
            node(1, CompartmentType::BASAL_DENDRITE, 0.0, NO_PARENT),
            node(2, CompartmentType::BASAL_DENDRITE, 2.5, 1),
        ]);
        assert_eq!(buffer.soma_point, Some(0));
        assert_eq!(buffer.radii, vec![2.5, 2.5]);
        assert_eq!(buffer.lines, vec![vec![0, 1]]);
    }

    #[test]
    fn test_explicit_root_designation() {
        let tree = CompartmentTree::from_compartments(vec![
            node(1, CompartmentType::AXON, 1.0, NO_PARENT),
            node(2, CompartmentType::AXON, 1.0, 1),
            node(5, CompartmentType::APICAL_DENDRITE, 0.0, NO_PARENT),
            node(6, CompartmentType::APICAL_DENDRITE, 4.0, 5),
        ])
        .unwrap();
        let options = AssemblyOptions {
            root: Some(5),
            ..AssemblyOptions::default()
        };
        let buffer = assemble(&tree, &ColorPolicy::by_type(), &options).unwrap();
        assert_eq!(buffer.compartment_ids, vec![1, 2, 5, 6]);
        assert_eq!(buffer.soma_point, Some(2));
        assert_eq!(buffer.radii, vec![1.0, 1.0, 4.0, 4.0]);

        let unknown = AssemblyOptions {
            root: Some(404),
            ..AssemblyOptions::default()
        };
        let result = assemble(&tree, &ColorPolicy::by_type(), &unknown);
        assert!(matches!(result, Err(MeshError::InvalidOptions { .. })));
    }

    #[test]
    fn test_min_radius_floor() {
        let tree = CompartmentTree::from_compartments(vec![
            node(1, CompartmentType::SOMA, 0.1, NO_PARENT),
            node(2, CompartmentType::AXON, 2.0, 1),
            node(3, CompartmentType::AXON, 0.1, 2),
        ])
        .unwrap();
        let options = AssemblyOptions {
            min_radius: 0.5,
            ..AssemblyOptions::default()
        };
        let buffer = assemble(&tree, &ColorPolicy::Fixed([1, 2, 3]), &options).unwrap();
        assert_eq!(buffer.radii, vec![2.0, 2.0, 0.5]);
        assert_eq!(buffer.colors, vec![[1, 2, 3]; 3]);
    }

    #[test]
    fn test_soma_override_uses_unclamped_child_radius() {
        let tree = CompartmentTree::from_compartments(vec![
            node(1, CompartmentType::SOMA, 0.0, NO_PARENT),
            node(2, CompartmentType::AXON, 0.2, 1),
        ])
        .unwrap();
        let options = AssemblyOptions {
            min_radius: 0.5,
            ..AssemblyOptions::default()
        };
        let buffer = assemble(&tree, &ColorPolicy::by_type(), &options).unwrap();
        assert_eq!(buffer.soma_radius(), Some(0.2));
        assert_eq!(buffer.radii[1], 0.5);
    }

    #[test]
    fn test_missing_children_close_branch() {
        let mut dangling = node(2, CompartmentType::AXON, 1.0, 1);
        dangling.children.push(99);
        let mut tree = CompartmentTree::new();
        let mut root = node(1, CompartmentType::AXON, 1.0, NO_PARENT);
        root.children.push(2);
        tree.insert(root);
        tree.insert(dangling);
        tree.insert(node(10, CompartmentType::AXON, 1.0, NO_PARENT));
        let buffer = assemble(&tree, &ColorPolicy::by_type(), &AssemblyOptions::default()).unwrap();
        assert_eq!(buffer.lines, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_colors_follow_type() {
        let buffer = build(vec![
            node(1, CompartmentType::SOMA, 1.0, NO_PARENT),
            node(2, CompartmentType::APICAL_DENDRITE, 1.0, 1),
        ]);
        assert_eq!(buffer.colors, vec![[160, 160, 160], [255, 127, 80]]);
        assert_eq!(buffer.soma_color(), Some([160, 160, 160]));
    }

    #[test]
    fn test_from_lines_keeps_lines_apart() {
        let lines = vec![
            vec![(DVec3::ZERO, 1.0), (DVec3::X, 2.0)],
            vec![(DVec3::Y, 0.5), (DVec3::Z, 0.5), (DVec3::ONE, 0.25)],
        ];
        let buffer = PolylineBuffer::from_lines(&lines, [9, 9, 9]);
        assert_eq!(buffer.lines, vec![vec![0, 1], vec![2, 3, 4]]);
        assert_eq!(buffer.radii, vec![1.0, 2.0, 0.5, 0.5, 0.25]);
        assert_eq!(buffer.compartment_ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(buffer.soma_point, None);
    }

    #[test]
    fn test_cycle_is_malformed() {
        let mut tree = CompartmentTree::new();
        let mut a = node(1, CompartmentType::AXON, 1.0, NO_PARENT);
        a.children.push(2);
        let mut b = node(2, CompartmentType::AXON, 1.0, 1);
        b.children.push(1);
        tree.insert(a);
        tree.insert(b);
        let result = assemble(&tree, &ColorPolicy::by_type(), &AssemblyOptions::default());
        assert!(matches!(result, Err(MeshError::Tree(_))));
    }
}
