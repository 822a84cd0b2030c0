//! # Morphology
//!
//! In-memory neuron reconstructions: a forest of compartments with
//! position, radius and anatomical type.
//!
//! ## Architecture
//!
//! ```text
//! SWC text → CompartmentTree (arena by id) → preorder / preorder_forest
//! ```
//!
//! The tree is read-only while a mesh is generated from it; transforms are
//! applied beforehand.
//!
//! ## Usage
//!
//! ```rust
//! use morphology::{parse_swc, preorder_forest};
//!
//! let tree = parse_swc("1 1 0 0 0 4 -1\n2 3 0 5 0 1 1\n3 3 0 9 0 1 2\n").unwrap();
//! let order = preorder_forest(&tree).unwrap();
//! assert_eq!(order.len(), 3);
//! ```

pub mod compartment;
pub mod error;
pub mod swc;
pub mod transform;
pub mod traversal;
pub mod tree;

pub use compartment::{Compartment, CompartmentId, CompartmentType, NO_PARENT};
pub use error::MorphologyError;
pub use swc::{parse_swc, read_swc};
pub use traversal::{preorder, preorder_forest};
pub use tree::CompartmentTree;
