//! # Primitives
//!
//! Closed surfaces appended next to the swept tubes.

pub mod sphere;

pub use sphere::create_sphere;
