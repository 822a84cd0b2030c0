//! # Configuration Constants
//!
//! Centralized constants for the morphology mesh pipeline.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison and point-merge tolerances
//! - **Tessellation**: Tube cross-section and soma sphere resolution
//! - **Colors**: Type table, categorical palette and heat-map ramp
//! - **Limits**: Maximum values for safety bounds

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Tolerance for merging coincident polyline points before sweeping.
///
/// Junction points shared between a parent branch and its children can
/// produce zero-length segments; points within this distance collapse into
/// the first one seen.
///
/// # Example
///
/// ```rust
/// use config::constants::{EPSILON, VERTEX_MERGE_EPSILON};
///
/// assert!(VERTEX_MERGE_EPSILON >= EPSILON);
/// ```
pub const VERTEX_MERGE_EPSILON: f64 = 1e-8;

// =============================================================================
// TESSELLATION CONSTANTS
// =============================================================================

/// Default number of sides of the tube cross-section polygon.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_TUBE_SIDES;
///
/// assert_eq!(DEFAULT_TUBE_SIDES, 6);
/// ```
pub const DEFAULT_TUBE_SIDES: u32 = 6;

/// Smallest cross-section that still encloses area (a triangle).
pub const MIN_TUBE_SIDES: u32 = 3;

/// Upper bound on tube sides. Beyond this the mesh grows without any
/// visible benefit for skeleton-scale geometry.
pub const MAX_TUBE_SIDES: u32 = 256;

/// Default radius floor applied to every compartment during assembly.
///
/// Zero keeps stored radii untouched; collapsed branches still sweep.
pub const DEFAULT_MIN_RADIUS: f64 = 0.0;

/// Azimuthal resolution of the soma sphere (segments around the equator).
///
/// # Example
///
/// ```rust
/// use config::constants::{SOMA_PHI_RESOLUTION, SOMA_THETA_RESOLUTION};
///
/// // Triangles in a pole-capped latitude/longitude sphere
/// let triangles = 2 * SOMA_THETA_RESOLUTION * (SOMA_PHI_RESOLUTION - 2);
/// assert_eq!(triangles, 896);
/// ```
pub const SOMA_THETA_RESOLUTION: u32 = 32;

/// Polar resolution of the soma sphere: latitude lines pole to pole, poles
/// included.
pub const SOMA_PHI_RESOLUTION: u32 = 16;

/// Minimum azimuthal sphere resolution.
pub const MIN_SPHERE_THETA: u32 = 3;

/// Minimum polar sphere resolution (one ring between the poles).
pub const MIN_SPHERE_PHI: u32 = 3;

/// Maximum azimuthal sphere resolution.
pub const MAX_SPHERE_THETA: u32 = 1024;

/// Maximum polar sphere resolution.
pub const MAX_SPHERE_PHI: u32 = 1024;

// =============================================================================
// COLOR CONSTANTS
// =============================================================================

/// Color used when a vertex has no color of its own (merging colored and
/// uncolored meshes).
pub const DEFAULT_COLOR: [u8; 3] = [255, 255, 255];

/// Color for compartment types missing from a categorical table.
pub const UNKNOWN_TYPE_COLOR: [u8; 3] = [127, 127, 127];

/// Standard color per compartment type code.
///
/// Soma, axon, basal dendrite, apical dendrite.
///
/// # Example
///
/// ```rust
/// use config::constants::TYPE_COLORS;
///
/// let soma = TYPE_COLORS.iter().find(|(code, _)| *code == 1).map(|(_, c)| *c);
/// assert_eq!(soma, Some([160, 160, 160]));
/// ```
pub const TYPE_COLORS: [(u8, [u8; 3]); 4] = [
    (1, [160, 160, 160]),
    (2, [70, 130, 180]),
    (3, [178, 34, 34]),
    (4, [255, 127, 80]),
];

/// Ten-entry qualitative palette for categorical labels.
pub const CATEGORY_PALETTE: [[u8; 3]; 10] = [
    [31, 119, 180],
    [255, 157, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
    [188, 189, 34],
    [23, 190, 207],
];

/// Default heat-map ramp: `(position, [r, g, b])` stops from red through
/// yellow to white.
///
/// # Example
///
/// ```rust
/// use config::constants::HEAT_MAP_STOPS;
///
/// assert_eq!(HEAT_MAP_STOPS.first().map(|s| s.0), Some(0.0));
/// assert_eq!(HEAT_MAP_STOPS.last().map(|s| s.0), Some(1.0));
/// ```
pub const HEAT_MAP_STOPS: [(f64, [u8; 3]); 3] = [
    (0.0, [255, 0, 0]),
    (0.66, [255, 255, 0]),
    (1.0, [255, 255, 255]),
];

/// Number of standard deviations around the mean kept by the heat-map
/// range before normalization.
pub const HEAT_MAP_SIGMA_CLAMP: f64 = 2.0;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Maximum number of vertices in a single generated mesh.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_VERTICES;
///
/// let vertex_count = 1000;
/// assert!(vertex_count < MAX_VERTICES);
/// ```
pub const MAX_VERTICES: usize = 50_000_000;

/// Maximum number of triangles in a single generated mesh.
pub const MAX_TRIANGLES: usize = 100_000_000;

// =============================================================================
// GLOBAL CONFIG
// =============================================================================

/// Immutable snapshot of pipeline settings shared between crates.
///
/// # Examples
/// ```
/// use config::constants::GlobalConfig;
/// let config = GlobalConfig::default();
/// assert!(config.merge_tolerance > 0.0);
/// assert_eq!(config.tube_sides, 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalConfig {
    /// Distance below which polyline points are merged.
    pub merge_tolerance: f64,
    /// Sides of the tube cross-section polygon.
    pub tube_sides: u32,
}

impl GlobalConfig {
    /// Builds a configuration, rejecting a non-positive tolerance and side
    /// counts outside `[MIN_TUBE_SIDES, MAX_TUBE_SIDES]`.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GlobalConfig;
    /// let cfg = GlobalConfig::new(1.0e-6, 12).expect("valid config");
    /// assert_eq!(cfg.tube_sides, 12);
    /// ```
    pub fn new(merge_tolerance: f64, tube_sides: u32) -> Result<Self, ConfigError> {
        if !(merge_tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(merge_tolerance));
        }
        if !(MIN_TUBE_SIDES..=MAX_TUBE_SIDES).contains(&tube_sides) {
            return Err(ConfigError::InvalidSides(tube_sides));
        }
        Ok(Self {
            merge_tolerance,
            tube_sides,
        })
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            merge_tolerance: VERTEX_MERGE_EPSILON,
            tube_sides: DEFAULT_TUBE_SIDES,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the merge tolerance is zero, negative or NaN.
    InvalidTolerance(f64),
    /// Raised when the side count cannot form a usable cross-section.
    InvalidSides(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "merge tolerance must be positive: {value}")
            }
            ConfigError::InvalidSides(value) => {
                write!(
                    f,
                    "tube sides must be within {MIN_TUBE_SIDES}..={MAX_TUBE_SIDES}: {value}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
