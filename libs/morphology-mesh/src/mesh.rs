//! # Mesh Data Structure
//!
//! Triangle mesh with optional per-vertex colors, normals and the skeleton
//! attributes (radius, type, compartment id) each vertex was swept from.

use crate::color::Rgb;
use config::constants::{DEFAULT_COLOR, VERTEX_MERGE_EPSILON};
use glam::DVec3;
use morphology::{CompartmentId, CompartmentType, NO_PARENT};
use std::collections::BTreeMap;

/// Skeleton data carried by a mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttributes {
    /// Radius of the source point.
    pub radius: f64,
    /// Type of the source compartment.
    pub kind: CompartmentType,
    /// Id of the source compartment.
    pub compartment_id: CompartmentId,
}

impl Default for VertexAttributes {
    fn default() -> Self {
        Self {
            radius: 0.0,
            kind: CompartmentType(0),
            compartment_id: NO_PARENT,
        }
    }
}

/// A triangle mesh with vertices and indices.
///
/// # Example
///
/// ```rust
/// use morphology_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert!(mesh.validate());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
    /// Optional vertex colors
    colors: Option<Vec<Rgb>>,
    /// Optional vertex normals
    normals: Option<Vec<DVec3>>,
    /// Optional skeleton attributes per vertex
    attributes: Option<Vec<VertexAttributes>>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            ..Self::default()
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Sets vertex colors, one per vertex.
    pub fn set_colors(&mut self, colors: Vec<Rgb>) {
        debug_assert_eq!(colors.len(), self.vertices.len());
        self.colors = Some(colors);
    }

    /// Sets a uniform color for all vertices.
    pub fn set_uniform_color(&mut self, color: Rgb) {
        self.colors = Some(vec![color; self.vertices.len()]);
    }

    /// Returns the vertex colors.
    pub fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }

    /// Sets vertex normals.
    pub fn set_normals(&mut self, normals: Vec<DVec3>) {
        debug_assert_eq!(normals.len(), self.vertices.len());
        self.normals = Some(normals);
    }

    /// Returns the vertex normals.
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Sets per-vertex skeleton attributes.
    pub fn set_attributes(&mut self, attributes: Vec<VertexAttributes>) {
        debug_assert_eq!(attributes.len(), self.vertices.len());
        self.attributes = Some(attributes);
    }

    /// Sets the same skeleton attributes on every vertex.
    pub fn set_uniform_attributes(&mut self, attributes: VertexAttributes) {
        self.attributes = Some(vec![attributes; self.vertices.len()]);
    }

    /// Returns the per-vertex skeleton attributes.
    pub fn attributes(&self) -> Option<&[VertexAttributes]> {
        self.attributes.as_deref()
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(&first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        self.vertices[1..]
            .iter()
            .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Appends another mesh. Surfaces are not intersected; they may
    /// interpenetrate.
    ///
    /// A per-vertex channel present on only one side is padded with neutral
    /// values on the other, so every channel stays aligned with the vertices.
    pub fn merge(&mut self, other: &Mesh) {
        let own = self.vertices.len();
        let offset = own as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );

        let theirs = other.vertices.len();
        merge_channel(&mut self.colors, other.colors.as_deref(), own, theirs, DEFAULT_COLOR);
        merge_channel(&mut self.normals, other.normals.as_deref(), own, theirs, DVec3::ZERO);
        merge_channel(
            &mut self.attributes,
            other.attributes.as_deref(),
            own,
            theirs,
            VertexAttributes::default(),
        );
    }

    /// Groups triangles by the compartment type of their last vertex.
    ///
    /// Lets a renderer assign one material per anatomical class. Returns an
    /// empty map when the mesh carries no attributes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use morphology_mesh::{Mesh, VertexAttributes};
    /// use morphology::CompartmentType;
    /// use glam::DVec3;
    ///
    /// let mut mesh = Mesh::new();
    /// for p in [DVec3::ZERO, DVec3::X, DVec3::Y] {
    ///     mesh.add_vertex(p);
    /// }
    /// mesh.add_triangle(0, 1, 2);
    /// mesh.set_uniform_attributes(VertexAttributes {
    ///     kind: CompartmentType::AXON,
    ///     ..VertexAttributes::default()
    /// });
    ///
    /// let groups = mesh.partition_by_type();
    /// assert_eq!(groups[&CompartmentType::AXON].len(), 1);
    /// ```
    pub fn partition_by_type(&self) -> BTreeMap<CompartmentType, Vec<[u32; 3]>> {
        let mut groups: BTreeMap<CompartmentType, Vec<[u32; 3]>> = BTreeMap::new();
        let Some(attributes) = self.attributes.as_deref() else {
            return groups;
        };

        for tri in &self.triangles {
            let kind = attributes[tri[2] as usize].kind;
            groups.entry(kind).or_default().push(*tri);
        }

        groups
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No degenerate triangles (repeated index or zero area)
    /// - Every per-vertex channel matches the vertex count
    ///
    /// Returns true if valid. Swept tubes with zero radius are legal output
    /// but fail this check.
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len();
        let channels_aligned = self.colors.as_ref().map_or(true, |c| c.len() == vertex_count)
            && self.normals.as_ref().map_or(true, |n| n.len() == vertex_count)
            && self
                .attributes
                .as_ref()
                .map_or(true, |a| a.len() == vertex_count);
        if !channels_aligned {
            return false;
        }

        self.triangles.iter().all(|tri| {
            if tri.iter().any(|&i| i as usize >= vertex_count) {
                return false;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];
            (v1 - v0).cross(v2 - v0).length() >= VERTEX_MERGE_EPSILON
        })
    }
}

fn merge_channel<T: Clone>(
    mine: &mut Option<Vec<T>>,
    theirs: Option<&[T]>,
    own_len: usize,
    their_len: usize,
    fill: T,
) {
    match (mine.as_mut(), theirs) {
        (Some(values), Some(other)) => values.extend_from_slice(other),
        (Some(values), None) => values.extend(std::iter::repeat(fill).take(their_len)),
        (None, Some(other)) => {
            let mut values = vec![fill; own_len];
            values.extend_from_slice(other);
            *mine = Some(values);
        }
        (None, None) => {}
    }
}
