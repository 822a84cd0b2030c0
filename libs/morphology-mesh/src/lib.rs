//! # Morphology Mesh
//!
//! Turns a compartment tree into a capped, radius-varying tube surface with
//! per-vertex color, ready for PLY or VTK export.
//!
//! ## Architecture
//!
//! ```text
//! CompartmentTree → assemble (PolylineBuffer) → clean_polylines
//!                 → sweep_tubes (Mesh) → + soma sphere → export
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use morphology::parse_swc;
//! use morphology_mesh::{generate_mesh, ColorPolicy, TubeOptions};
//!
//! let tree = parse_swc("1 1 0 0 0 0 -1\n2 3 0 5 0 2 1\n3 3 0 9 0 1 2\n").unwrap();
//! let mesh = generate_mesh(&tree, &ColorPolicy::by_type(), &TubeOptions::default()).unwrap();
//!
//! // One 3-point tube plus the default 32x16 soma sphere
//! assert_eq!(mesh.triangle_count(), 2 * 2 * 6 + 2 * 4 + 896);
//! ```

pub mod clean;
pub mod color;
pub mod error;
pub mod export;
pub mod mesh;
pub mod polyline;
pub mod primitives;
pub mod tube;

pub use clean::clean_polylines;
pub use color::{CategoricalColors, ColorPolicy, ColorStop, HeatMap, Rgb, ScalarAttribute};
pub use error::MeshError;
pub use mesh::{Mesh, VertexAttributes};
pub use polyline::{assemble, AssemblyOptions, PolylineBuffer};
pub use tube::{sweep_tubes, SomaRadius, TubeOptions, TubeRadius};

use log::debug;
use morphology::CompartmentTree;

/// Generates the tube surface of every branch, without the soma sphere.
///
/// # Errors
///
/// - [`MeshError::InvalidOptions`] for out-of-range options or a designated
///   root missing from the tree
/// - [`MeshError::Tree`] for cyclic or shared structure
/// - [`MeshError::ColorResolution`] when a node cannot be colored
/// - [`MeshError::EmptyMesh`] for an empty tree with `reject_empty` set
pub fn generate_tube(
    tree: &CompartmentTree,
    color: &ColorPolicy,
    options: &TubeOptions,
) -> Result<Mesh, MeshError> {
    let buffer = assemble_checked(tree, color, options)?;
    tube_from_buffer(&buffer, options)
}

/// Generates the tube surface and appends the soma sphere.
///
/// The soma is [`TubeOptions::root`], or the first root of the tree when
/// that is unset, whatever its compartment type. The sphere is centered on
/// it, colored like its point and sized by [`TubeOptions::soma_radius`]. It
/// is appended, not unioned, so it overlaps the tubes leaving the soma.
///
/// # Errors
///
/// As [`generate_tube`], plus [`MeshError::DegenerateGeometry`] for an
/// unusable sphere.
pub fn generate_mesh(
    tree: &CompartmentTree,
    color: &ColorPolicy,
    options: &TubeOptions,
) -> Result<Mesh, MeshError> {
    let buffer = assemble_checked(tree, color, options)?;
    let mut mesh = tube_from_buffer(&buffer, options)?;

    let designated = options.assembly().designated_root(tree)?;
    if let (Some(soma), Some(point)) = (designated, buffer.soma_point) {
        let radius = match options.soma_radius {
            SomaRadius::FromChild => buffer.radii[point as usize],
            SomaRadius::Stored => soma.radius,
            SomaRadius::Fixed(r) => r,
        };
        let mut sphere = primitives::create_sphere(
            soma.position,
            radius,
            options.sphere_theta,
            options.sphere_phi,
        )?;
        sphere.set_uniform_color(buffer.colors[point as usize]);
        sphere.set_uniform_attributes(VertexAttributes {
            radius,
            kind: soma.kind,
            compartment_id: soma.id,
        });
        debug!(
            "soma {} sphere radius {radius}, {} triangles",
            soma.id,
            sphere.triangle_count()
        );
        mesh.merge(&sphere);
    }

    Ok(mesh)
}

/// Cleans and sweeps an already assembled buffer, such as one built with
/// [`PolylineBuffer::from_lines`].
///
/// # Errors
///
/// See [`sweep_tubes`].
pub fn tube_from_buffer(buffer: &PolylineBuffer, options: &TubeOptions) -> Result<Mesh, MeshError> {
    let cleaned = clean_polylines(buffer, options.merge_tolerance);
    let mesh = sweep_tubes(&cleaned, options)?;
    debug!(
        "swept {} lines into {} vertices, {} triangles",
        cleaned.line_count(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn assemble_checked(
    tree: &CompartmentTree,
    color: &ColorPolicy,
    options: &TubeOptions,
) -> Result<PolylineBuffer, MeshError> {
    options.validate()?;
    let buffer = assemble(tree, color, &options.assembly())?;
    if buffer.is_empty() && options.reject_empty {
        return Err(MeshError::EmptyMesh);
    }
    Ok(buffer)
}
