//! # Morphology Errors
//!
//! Error types for tree construction, traversal and SWC reading.

use crate::compartment::CompartmentId;
use thiserror::Error;

/// Errors that can occur while building or walking a compartment tree.
#[derive(Debug, Error)]
pub enum MorphologyError {
    /// Traversal would not terminate, or a structural invariant is broken
    #[error("Malformed tree: {message}")]
    MalformedTree { message: String },

    /// A line of skeleton text could not be read
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Two compartments share an id
    #[error("Duplicate compartment id: {0}")]
    DuplicateId(CompartmentId),

    /// Underlying file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MorphologyError {
    /// Creates a malformed tree error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTree {
            message: message.into(),
        }
    }

    /// Creates a parse error for a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
