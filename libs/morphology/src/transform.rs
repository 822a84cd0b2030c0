//! # Affine Transforms
//!
//! Matrix builders for placing reconstructions in a common frame, and the
//! tree operations that apply them.

use crate::tree::CompartmentTree;
use glam::{DMat4, DVec3};

// =============================================================================
// MATRIX BUILDERS
// =============================================================================

/// Translation by `(x, y, z)`.
pub fn translate(x: f64, y: f64, z: f64) -> DMat4 {
    DMat4::from_translation(DVec3::new(x, y, z))
}

/// Per-axis scale.
///
/// # Example
///
/// ```rust
/// use morphology::transform::scale;
/// use glam::DVec3;
///
/// // Correct shrinkage along the slicing axis
/// let m = scale(1.0, 1.0, 3.0);
/// assert_eq!(m.transform_point3(DVec3::new(1.0, 1.0, 1.0)), DVec3::new(1.0, 1.0, 3.0));
/// ```
pub fn scale(x: f64, y: f64, z: f64) -> DMat4 {
    DMat4::from_scale(DVec3::new(x, y, z))
}

/// Right-handed rotation about the x axis: a positive angle turns +y toward
/// +z.
///
/// Alignment tables written for the left-handed `rotate3x` convention turn
/// +y toward -z; negate their angle when porting them.
pub fn rotate_x(radians: f64) -> DMat4 {
    DMat4::from_rotation_x(radians)
}

/// Right-handed rotation about the y axis.
pub fn rotate_y(radians: f64) -> DMat4 {
    DMat4::from_rotation_y(radians)
}

/// Right-handed rotation about the z axis: a positive angle turns +x toward
/// +y.
///
/// Alignment tables written for the left-handed `rotate3z` convention turn
/// +x toward -y; negate their angle when porting them.
pub fn rotate_z(radians: f64) -> DMat4 {
    DMat4::from_rotation_z(radians)
}

/// Builds an affine matrix from three row-major rows `[a b c t]`, the layout
/// of per-specimen alignment tables.
///
/// # Example
///
/// ```rust
/// use morphology::transform::from_alignment_rows;
/// use glam::DVec3;
///
/// let m = from_alignment_rows([
///     [1.0, 0.0, 0.0, 10.0],
///     [0.0, 1.0, 0.0, 20.0],
///     [0.0, 0.0, 1.0, 30.0],
/// ]);
/// assert_eq!(m.transform_point3(DVec3::ZERO), DVec3::new(10.0, 20.0, 30.0));
/// ```
pub fn from_alignment_rows(rows: [[f64; 4]; 3]) -> DMat4 {
    let full = [rows[0], rows[1], rows[2], [0.0, 0.0, 0.0, 1.0]];
    // glam stores columns; reading rows as columns and transposing restores them
    DMat4::from_cols_array_2d(&full).transpose()
}

// =============================================================================
// TREE OPERATIONS
// =============================================================================

impl CompartmentTree {
    /// Applies `matrix` to every position and multiplies every radius by
    /// `radius_scale`.
    pub fn transform_in_place(&mut self, matrix: &DMat4, radius_scale: f64) {
        for c in self.iter_mut() {
            c.position = matrix.transform_point3(c.position);
            c.radius *= radius_scale;
        }
    }

    /// Returns a transformed copy; see [`transform_in_place`](Self::transform_in_place).
    pub fn transformed(&self, matrix: &DMat4, radius_scale: f64) -> Self {
        let mut out = self.clone();
        out.transform_in_place(matrix, radius_scale);
        out
    }

    /// Translates the tree so the soma sits at the origin.
    ///
    /// Returns the applied offset, or `None` (tree unchanged) without a soma.
    pub fn center_on_soma(&mut self) -> Option<DVec3> {
        let offset = -self.soma()?.position;
        self.transform_in_place(&DMat4::from_translation(offset), 1.0);
        Some(offset)
    }
}
