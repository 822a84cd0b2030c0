//! # Config Crate
//!
//! Centralized configuration constants for the morphology mesh pipeline.
//! Tessellation defaults, merge tolerances, color tables and safety limits
//! are defined here so the tree, mesh and CLI crates agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_TUBE_SIDES, MIN_TUBE_SIDES, VERTEX_MERGE_EPSILON};
//!
//! // Points closer than the merge tolerance collapse into one
//! let gap: f64 = 1e-12;
//! assert!(gap < VERTEX_MERGE_EPSILON);
//!
//! // Requested side counts are clamped to a drawable polygon
//! let requested = 2;
//! let sides = if requested >= MIN_TUBE_SIDES { requested } else { DEFAULT_TUBE_SIDES };
//! assert_eq!(sides, DEFAULT_TUBE_SIDES);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Renderer Neutral**: No values tied to a particular viewer
//! - **Documented**: Every constant states what consumes it

pub mod constants;
