//! # Tube Sweep
//!
//! Sweeps a ring of `sides` vertices along every polyline of a cleaned
//! buffer.
//!
//! ## Algorithm
//!
//! - Tangent at a point: average of the adjacent segment directions
//! - Frame: the first normal is any vector perpendicular to the first
//!   tangent; each following normal is the previous one projected onto the
//!   new cross-section plane, so rings do not twist
//! - Ring `j` at angle `2πj / sides`: `p + r (cos θ n + sin θ b)` with
//!   `b = t × n`
//! - Consecutive rings are stitched with two triangles per side; each end
//!   is closed by a flat fan on its own vertices

use crate::error::MeshError;
use crate::mesh::{Mesh, VertexAttributes};
use crate::polyline::{AssemblyOptions, PolylineBuffer};
use config::constants::{
    GlobalConfig, DEFAULT_MIN_RADIUS, DEFAULT_TUBE_SIDES, EPSILON, MAX_SPHERE_PHI,
    MAX_SPHERE_THETA, MAX_TRIANGLES, MAX_TUBE_SIDES, MAX_VERTICES, MIN_SPHERE_PHI,
    MIN_SPHERE_THETA, MIN_TUBE_SIDES, SOMA_PHI_RESOLUTION, SOMA_THETA_RESOLUTION,
    VERTEX_MERGE_EPSILON,
};
use glam::DVec3;
use morphology::CompartmentId;
use serde::Deserialize;
use std::f64::consts::TAU;

/// Cross-section radius of the swept tube.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TubeRadius {
    /// Each ring uses the radius attribute of its point.
    #[default]
    VaryByScalar,
    /// Every ring uses the same radius.
    Fixed(f64),
}

/// Radius of the soma sphere.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SomaRadius {
    /// The assembled soma radius, corrected from its child.
    #[default]
    FromChild,
    /// The radius stored on the soma compartment.
    Stored,
    /// A caller-chosen radius.
    Fixed(f64),
}

/// Options for tube and mesh generation.
///
/// Deserializes from a partial table; missing keys take their defaults and
/// unknown keys are rejected.
///
/// ```rust
/// use morphology_mesh::{TubeOptions, TubeRadius};
///
/// let options = TubeOptions {
///     sides: 8,
///     radius: TubeRadius::Fixed(0.5),
///     ..TubeOptions::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TubeOptions {
    /// Vertices per ring.
    pub sides: u32,
    /// Ring radius source.
    pub radius: TubeRadius,
    /// Lower bound on recorded point radii.
    pub min_radius: f64,
    /// Points closer than this are merged before sweeping.
    pub merge_tolerance: f64,
    /// Close both ends of every tube.
    pub capping: bool,
    /// Compartment rendered as the soma; the first root when unset.
    pub root: Option<CompartmentId>,
    /// Soma sphere radius source.
    pub soma_radius: SomaRadius,
    /// Soma sphere azimuthal resolution.
    pub sphere_theta: u32,
    /// Soma sphere polar resolution, poles included.
    pub sphere_phi: u32,
    /// Fail with [`MeshError::EmptyMesh`] when the tree yields no points.
    pub reject_empty: bool,
}

impl Default for TubeOptions {
    fn default() -> Self {
        Self {
            sides: DEFAULT_TUBE_SIDES,
            radius: TubeRadius::VaryByScalar,
            min_radius: DEFAULT_MIN_RADIUS,
            merge_tolerance: VERTEX_MERGE_EPSILON,
            capping: true,
            root: None,
            soma_radius: SomaRadius::FromChild,
            sphere_theta: SOMA_THETA_RESOLUTION,
            sphere_phi: SOMA_PHI_RESOLUTION,
            reject_empty: true,
        }
    }
}

impl TubeOptions {
    /// Defaults with the side count and merge tolerance of a validated
    /// global configuration.
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            sides: config.tube_sides,
            merge_tolerance: config.merge_tolerance,
            ..Self::default()
        }
    }

    /// Checks every field range.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidOptions`] naming the first bad field.
    pub fn validate(&self) -> Result<(), MeshError> {
        if !(MIN_TUBE_SIDES..=MAX_TUBE_SIDES).contains(&self.sides) {
            return Err(MeshError::invalid_options(format!(
                "sides must be in {MIN_TUBE_SIDES}..={MAX_TUBE_SIDES}, got {}",
                self.sides
            )));
        }
        if let TubeRadius::Fixed(r) = self.radius {
            check_radius("radius", r)?;
        }
        check_radius("min_radius", self.min_radius)?;
        if !(self.merge_tolerance.is_finite() && self.merge_tolerance > 0.0) {
            return Err(MeshError::invalid_options(format!(
                "merge_tolerance must be finite and positive, got {}",
                self.merge_tolerance
            )));
        }
        if let SomaRadius::Fixed(r) = self.soma_radius {
            check_radius("soma_radius", r)?;
        }
        if !(MIN_SPHERE_THETA..=MAX_SPHERE_THETA).contains(&self.sphere_theta) {
            return Err(MeshError::invalid_options(format!(
                "sphere_theta must be in {MIN_SPHERE_THETA}..={MAX_SPHERE_THETA}, got {}",
                self.sphere_theta
            )));
        }
        if !(MIN_SPHERE_PHI..=MAX_SPHERE_PHI).contains(&self.sphere_phi) {
            return Err(MeshError::invalid_options(format!(
                "sphere_phi must be in {MIN_SPHERE_PHI}..={MAX_SPHERE_PHI}, got {}",
                self.sphere_phi
            )));
        }
        Ok(())
    }

    /// The assembly options these tube options imply.
    pub fn assembly(&self) -> AssemblyOptions {
        AssemblyOptions {
            min_radius: self.min_radius,
            root: self.root,
        }
    }
}

fn check_radius(field: &str, value: f64) -> Result<(), MeshError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MeshError::invalid_options(format!(
            "{field} must be finite and non-negative, got {value}"
        )))
    }
}

/// Sweeps a tube along every line of a cleaned buffer.
///
/// Every vertex carries the color, radius, type and compartment id of the
/// point it was swept from, plus an outward normal.
///
/// # Errors
///
/// Returns [`MeshError::InvalidOptions`] for bad options and
/// [`MeshError::TooManyVertices`] / [`MeshError::TooManyTriangles`] when the
/// result would exceed the mesh limits.
pub fn sweep_tubes(buffer: &PolylineBuffer, options: &TubeOptions) -> Result<Mesh, MeshError> {
    options.validate()?;
    let sides = options.sides as usize;

    let (vertex_count, triangle_count) = buffer
        .lines
        .iter()
        .filter(|line| line.len() >= 2)
        .map(|line| tube_counts(line.len(), sides, options.capping))
        .fold((0usize, 0usize), |(v, t), (lv, lt)| (v + lv, t + lt));
    if vertex_count > MAX_VERTICES {
        return Err(MeshError::TooManyVertices {
            count: vertex_count,
            max: MAX_VERTICES,
        });
    }
    if triangle_count > MAX_TRIANGLES {
        return Err(MeshError::TooManyTriangles {
            count: triangle_count,
            max: MAX_TRIANGLES,
        });
    }

    let mut sweep = Sweep::with_capacity(vertex_count, triangle_count);
    for line in buffer.lines.iter().filter(|line| line.len() >= 2) {
        sweep.line(buffer, line, options);
    }
    Ok(sweep.finish())
}

/// Vertices and triangles of one swept line of `points` points. Lines of
/// fewer than 2 points are not swept.
fn tube_counts(points: usize, sides: usize, capping: bool) -> (usize, usize) {
    if points < 2 {
        return (0, 0);
    }
    let caps = usize::from(capping) * 2;
    let vertices = points * sides + caps * sides;
    let triangles = (points - 1) * 2 * sides + caps * (sides - 2);
    (vertices, triangles)
}

/// Mesh under construction with its parallel vertex channels.
struct Sweep {
    mesh: Mesh,
    colors: Vec<[u8; 3]>,
    normals: Vec<DVec3>,
    attributes: Vec<VertexAttributes>,
}

impl Sweep {
    fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            mesh: Mesh::with_capacity(vertices, triangles),
            colors: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            attributes: Vec::with_capacity(vertices),
        }
    }

    fn line(&mut self, buffer: &PolylineBuffer, line: &[u32], options: &TubeOptions) {
        let sides = options.sides;
        let points: Vec<DVec3> = line.iter().map(|&i| buffer.points[i as usize]).collect();
        let tangents = tangents(&points);
        let normals = sliding_normals(&tangents);

        let ring_radius = |i: u32| match options.radius {
            TubeRadius::VaryByScalar => buffer.radii[i as usize],
            TubeRadius::Fixed(r) => r,
        };

        let rings: Vec<u32> = line
            .iter()
            .enumerate()
            .map(|(k, &point)| {
                let r = ring_radius(point);
                self.ring(buffer, point, r, tangents[k], normals[k], sides, None)
            })
            .collect();

        for pair in rings.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            for j in 0..sides {
                let jn = (j + 1) % sides;
                let (a0, a1, b0, b1) = (a + j, a + jn, b + j, b + jn);
                self.mesh.add_triangle(a0, a1, b0);
                self.mesh.add_triangle(a1, b1, b0);
            }
        }

        if options.capping {
            let last = line.len() - 1;
            let first_point = line[0];
            let last_point = line[last];

            let c = self.ring(
                buffer,
                first_point,
                ring_radius(first_point),
                tangents[0],
                normals[0],
                sides,
                Some(-tangents[0]),
            );
            for j in 1..sides - 1 {
                self.mesh.add_triangle(c, c + j + 1, c + j);
            }

            let c = self.ring(
                buffer,
                last_point,
                ring_radius(last_point),
                tangents[last],
                normals[last],
                sides,
                Some(tangents[last]),
            );
            for j in 1..sides - 1 {
                self.mesh.add_triangle(c, c + j, c + j + 1);
            }
        }
    }

    /// Emits one ring and returns the index of its first vertex. Ring
    /// vertices get radial normals unless `flat` is given.
    #[allow(clippy::too_many_arguments)]
    fn ring(
        &mut self,
        buffer: &PolylineBuffer,
        point: u32,
        radius: f64,
        tangent: DVec3,
        normal: DVec3,
        sides: u32,
        flat: Option<DVec3>,
    ) -> u32 {
        let i = point as usize;
        let center = buffer.points[i];
        let binormal = tangent.cross(normal);
        let attributes = VertexAttributes {
            radius: buffer.radii[i],
            kind: buffer.kinds[i],
            compartment_id: buffer.compartment_ids[i],
        };

        let start = self.mesh.vertex_count() as u32;
        for j in 0..sides {
            let theta = TAU * f64::from(j) / f64::from(sides);
            let dir = theta.cos() * normal + theta.sin() * binormal;
            self.mesh.add_vertex(center + radius * dir);
            self.normals.push(flat.unwrap_or(dir));
            self.colors.push(buffer.colors[i]);
            self.attributes.push(attributes);
        }
        start
    }

    fn finish(mut self) -> Mesh {
        self.mesh.set_colors(self.colors);
        self.mesh.set_normals(self.normals);
        self.mesh.set_attributes(self.attributes);
        self.mesh
    }
}

/// Unit tangent per point; interior points average their two segments.
fn tangents(points: &[DVec3]) -> Vec<DVec3> {
    let segments: Vec<DVec3> = points
        .windows(2)
        .map(|w| unit_or_zero(w[1] - w[0]))
        .collect();

    let mut result = Vec::with_capacity(points.len());
    let mut previous = DVec3::Z;
    for k in 0..points.len() {
        let before = if k > 0 { segments[k - 1] } else { DVec3::ZERO };
        let after = segments.get(k).copied().unwrap_or(DVec3::ZERO);
        let t = unit_or_zero(before + after);
        let t = if t != DVec3::ZERO {
            t
        } else if after != DVec3::ZERO {
            after
        } else if before != DVec3::ZERO {
            before
        } else {
            previous
        };
        result.push(t);
        previous = t;
    }
    result
}

fn unit_or_zero(v: DVec3) -> DVec3 {
    let length = v.length();
    if length < EPSILON {
        DVec3::ZERO
    } else {
        v / length
    }
}

/// Rotation-minimizing normals along `tangents`.
fn sliding_normals(tangents: &[DVec3]) -> Vec<DVec3> {
    let mut result = Vec::with_capacity(tangents.len());
    let mut previous: Option<DVec3> = None;
    for &t in tangents {
        let n = previous
            .map(|p| unit_or_zero(p - t * p.dot(t)))
            .filter(|n| *n != DVec3::ZERO)
            .unwrap_or_else(|| t.any_orthonormal_vector());
        result.push(n);
        previous = Some(n);
    }
    result
}
