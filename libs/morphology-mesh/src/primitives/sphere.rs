//! # Sphere Primitive
//!
//! Latitude/longitude sphere with a vertex at each pole.

use crate::error::MeshError;
use crate::mesh::Mesh;
use config::constants::{
    MAX_SPHERE_PHI, MAX_SPHERE_THETA, MAX_TRIANGLES, MAX_VERTICES, MIN_SPHERE_PHI,
    MIN_SPHERE_THETA,
};
use glam::DVec3;
use std::f64::consts::{PI, TAU};

/// Creates a sphere mesh with analytic normals.
///
/// # Arguments
///
/// * `center` - Sphere center
/// * `radius` - Sphere radius; zero collapses every vertex onto the center
/// * `theta` - Segments around the polar axis
/// * `phi` - Latitude lines from pole to pole, both poles included
///
/// # Algorithm
///
/// - North pole, then `phi - 2` rings of `theta` vertices, then south pole
/// - Ring `i` sits at polar angle `π i / (phi - 1)`
/// - Fans close both poles; quads between rings become two triangles
///
/// This gives `2 + theta (phi - 2)` vertices and `2 theta (phi - 2)`
/// triangles, the same tessellation as VTK's sphere source.
///
/// # Errors
///
/// Returns [`MeshError::DegenerateGeometry`] for a bad radius or a
/// resolution outside the configured bounds, and
/// [`MeshError::TooManyVertices`] / [`MeshError::TooManyTriangles`] past
/// the mesh limits.
///
/// # Example
///
/// ```rust
/// use morphology_mesh::primitives::create_sphere;
/// use glam::DVec3;
///
/// let mesh = create_sphere(DVec3::ZERO, 5.0, 32, 16).unwrap();
/// assert_eq!(mesh.triangle_count(), 896);
/// ```
pub fn create_sphere(center: DVec3, radius: f64, theta: u32, phi: u32) -> Result<Mesh, MeshError> {
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(MeshError::degenerate(format!(
            "Sphere radius must be finite and non-negative: {radius}"
        )));
    }
    if !(MIN_SPHERE_THETA..=MAX_SPHERE_THETA).contains(&theta)
        || !(MIN_SPHERE_PHI..=MAX_SPHERE_PHI).contains(&phi)
    {
        return Err(MeshError::degenerate(format!(
            "Sphere resolution must be within {MIN_SPHERE_THETA}x{MIN_SPHERE_PHI}..={MAX_SPHERE_THETA}x{MAX_SPHERE_PHI}: {theta}x{phi}"
        )));
    }

    let rings = phi - 2;
    let ring_vertices = (theta as usize).checked_mul(rings as usize);
    let vertex_count = ring_vertices.and_then(|n| n.checked_add(2)).unwrap_or(usize::MAX);
    if vertex_count > MAX_VERTICES {
        return Err(MeshError::TooManyVertices {
            count: vertex_count,
            max: MAX_VERTICES,
        });
    }
    let triangle_count = ring_vertices.and_then(|n| n.checked_mul(2)).unwrap_or(usize::MAX);
    if triangle_count > MAX_TRIANGLES {
        return Err(MeshError::TooManyTriangles {
            count: triangle_count,
            max: MAX_TRIANGLES,
        });
    }

    let mut mesh = Mesh::with_capacity(vertex_count, triangle_count);
    let mut normals = Vec::with_capacity(vertex_count);

    let mut push = |mesh: &mut Mesh, dir: DVec3| {
        normals.push(dir);
        mesh.add_vertex(center + radius * dir)
    };

    let north = push(&mut mesh, DVec3::Z);

    // First vertex of each ring; ring vertices are consecutive
    let mut ring_start = Vec::with_capacity(rings as usize);
    for i in 1..phi - 1 {
        let polar = PI * f64::from(i) / f64::from(phi - 1);
        let (sin_p, cos_p) = polar.sin_cos();
        ring_start.push(mesh.vertex_count() as u32);
        for j in 0..theta {
            let azimuth = TAU * f64::from(j) / f64::from(theta);
            let (sin_a, cos_a) = azimuth.sin_cos();
            push(&mut mesh, DVec3::new(sin_p * cos_a, sin_p * sin_a, cos_p));
        }
    }

    let south = push(&mut mesh, -DVec3::Z);

    let at = |ring: usize, j: u32| ring_start[ring] + j % theta;

    // Top cap
    for j in 0..theta {
        mesh.add_triangle(north, at(0, j), at(0, j + 1));
    }

    // Bands between adjacent rings
    for i in 0..ring_start.len() - 1 {
        for j in 0..theta {
            let (a0, a1) = (at(i, j), at(i, j + 1));
            let (b0, b1) = (at(i + 1, j), at(i + 1, j + 1));
            mesh.add_triangle(a0, b0, b1);
            mesh.add_triangle(a0, b1, a1);
        }
    }

    // Bottom cap (reversed)
    let last = ring_start.len() - 1;
    for j in 0..theta {
        mesh.add_triangle(south, at(last, j + 1), at(last, j));
    }

    mesh.set_normals(normals);
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_counts() {
        let mesh = create_sphere(DVec3::ZERO, 5.0, 32, 16).unwrap();
        assert_eq!(mesh.vertex_count(), 2 + 32 * 14);
        assert_eq!(mesh.triangle_count(), 896);
        assert!(mesh.validate());
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let center = DVec3::new(1.0, -2.0, 3.0);
        let mesh = create_sphere(center, 2.5, 8, 6).unwrap();
        for v in mesh.vertices() {
            assert_relative_eq!(v.distance(center), 2.5, epsilon = 1e-12);
        }
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(max.z - min.z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_faces_outward() {
        let mesh = create_sphere(DVec3::ZERO, 1.0, 12, 8).unwrap();
        for tri in mesh.triangles() {
            let [a, b, c] = tri.map(|i| mesh.vertex(i));
            let face = (b - a).cross(c - a);
            assert!(face.dot(a + b + c) > 0.0);
        }
    }

    #[test]
    fn test_sphere_normals_are_radial() {
        let mesh = create_sphere(DVec3::ZERO, 3.0, 8, 4).unwrap();
        let normals = mesh.normals().unwrap();
        assert_eq!(normals.len(), mesh.vertex_count());
        for (v, n) in mesh.vertices().iter().zip(normals) {
            assert_relative_eq!(v.dot(*n), 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_radius_sphere() {
        let center = DVec3::new(4.0, 4.0, 4.0);
        let mesh = create_sphere(center, 0.0, 32, 16).unwrap();
        assert_eq!(mesh.triangle_count(), 896);
        assert!(mesh.vertices().iter().all(|&v| v == center));
    }

    #[test]
    fn test_sphere_rejects_bad_input() {
        assert!(create_sphere(DVec3::ZERO, -1.0, 8, 8).is_err());
        assert!(create_sphere(DVec3::ZERO, f64::NAN, 8, 8).is_err());
        assert!(create_sphere(DVec3::ZERO, 1.0, 2, 8).is_err());
        assert!(create_sphere(DVec3::ZERO, 1.0, 8, 2).is_err());
    }

    #[test]
    fn test_coarsest_sphere_is_a_bicone() {
        let mesh = create_sphere(DVec3::ZERO, 1.0, 4, 3).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 8);
        assert!(mesh.validate());
    }

    #[test]
    fn test_oversized_resolution_is_an_error() {
        let result = create_sphere(DVec3::ZERO, 1.0, 70_000, 70_000);
        assert!(matches!(result, Err(MeshError::DegenerateGeometry { .. })));
        let result = create_sphere(DVec3::ZERO, 1.0, u32::MAX, u32::MAX);
        assert!(result.is_err());
    }
}
