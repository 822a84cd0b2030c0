//! # Compartments
//!
//! One skeleton node of a reconstruction: position, radius, anatomical type
//! and links to its parent and children by id.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a compartment, unique within one tree.
pub type CompartmentId = i64;

/// Parent id carried by root compartments.
pub const NO_PARENT: CompartmentId = -1;

/// Anatomical class of a compartment.
///
/// Only used for coloring and classification; traversal never looks at it.
/// Codes outside the named constants are carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompartmentType(pub u8);

impl CompartmentType {
    /// Cell body.
    pub const SOMA: Self = Self(1);
    /// Axon.
    pub const AXON: Self = Self(2);
    /// Basal dendrite.
    pub const BASAL_DENDRITE: Self = Self(3);
    /// Apical dendrite.
    pub const APICAL_DENDRITE: Self = Self(4);

    /// Returns the raw type code.
    #[inline]
    pub fn code(self) -> u8 {
        self.0
    }

    /// Short lowercase name, or `"custom"` for unnamed codes.
    pub fn name(self) -> &'static str {
        match self {
            Self::SOMA => "soma",
            Self::AXON => "axon",
            Self::BASAL_DENDRITE => "basal_dendrite",
            Self::APICAL_DENDRITE => "apical_dendrite",
            _ => "custom",
        }
    }
}

impl fmt::Display for CompartmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

/// A node of the morphology skeleton.
///
/// Links are ids looked up through the owning
/// [`CompartmentTree`](crate::CompartmentTree); a compartment never owns
/// another compartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    /// Unique id within the tree.
    pub id: CompartmentId,
    /// Parent id, or [`NO_PARENT`] for a root.
    pub parent: CompartmentId,
    /// Child ids in traversal-relevant order.
    pub children: Vec<CompartmentId>,
    /// Position in model space.
    pub position: DVec3,
    /// Cross-section radius. Zero is legal.
    pub radius: f64,
    /// Anatomical class.
    pub kind: CompartmentType,
}

impl Compartment {
    /// Creates a compartment with no children.
    ///
    /// # Example
    ///
    /// ```rust
    /// use morphology::{Compartment, CompartmentType, NO_PARENT};
    /// use glam::DVec3;
    ///
    /// let soma = Compartment::new(1, CompartmentType::SOMA, DVec3::ZERO, 5.0, NO_PARENT);
    /// assert!(soma.is_root());
    /// ```
    pub fn new(
        id: CompartmentId,
        kind: CompartmentType,
        position: DVec3,
        radius: f64,
        parent: CompartmentId,
    ) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            position,
            radius,
            kind,
        }
    }

    /// True if this compartment has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent == NO_PARENT
    }

    /// True if this compartment lists no children at all.
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
