//! # Mesh Errors
//!
//! Error types for polyline assembly, color mapping, tube generation and
//! export.

use morphology::MorphologyError;
use thiserror::Error;

/// Errors that can occur during mesh generation.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The compartment tree could not be walked (cycle, shared subtree)
    #[error(transparent)]
    Tree(#[from] MorphologyError),

    /// A continuous color map found no ramp segment for a value
    #[error("No color for value {value}: no ramp segment brackets it")]
    ColorResolution { value: f64 },

    /// Heat-map stops or fit data are unusable
    #[error("Invalid color ramp: {message}")]
    InvalidColorRamp { message: String },

    /// Generation produced no points at all
    #[error("Empty mesh: the tree produced no points")]
    EmptyMesh,

    /// Generation options out of range
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// Degenerate geometry
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Too many vertices
    #[error("Too many vertices: {count} (max: {max})")]
    TooManyVertices { count: usize, max: usize },

    /// Too many triangles
    #[error("Too many triangles: {count} (max: {max})")]
    TooManyTriangles { count: usize, max: usize },

    /// Serialization failed
    #[error("Export failed: {message}")]
    Export { message: String },

    /// Underlying file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    /// Creates an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates an invalid color ramp error.
    pub fn invalid_ramp(message: impl Into<String>) -> Self {
        Self::InvalidColorRamp {
            message: message.into(),
        }
    }

    /// Creates an export error.
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }
}
