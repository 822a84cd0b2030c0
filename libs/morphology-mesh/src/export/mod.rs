//! # Mesh Export
//!
//! Writers for the formats external renderers consume:
//!
//! - **PLY** (ASCII): positions, triangles and vertex colors
//! - **VTK** (legacy ASCII polydata): positions, triangles and every
//!   per-vertex channel (radius, colors, normals, type, compartment id)

pub mod ply;
pub mod vtk;

pub use ply::{save_ply, write_ply};
pub use vtk::{save_vtk, write_vtk};
