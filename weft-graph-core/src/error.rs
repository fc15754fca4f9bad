//! Error types for weft-graph-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
///
/// Every failure is detected eagerly at the offending call and reported to
/// the immediate caller; nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Access or reassignment with a type other than the one the cell holds
    #[error("type mismatch: value holds {holds}, access asked for {asked}")]
    TypeMismatch {
        /// Type currently held by the cell
        holds: &'static str,
        /// Type the caller asked for
        asked: &'static str,
    },

    /// Out-of-bounds integer access
    #[error("{what} {index} out of bounds (length {len})")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Malformed structural input (ragged matrix, non-square matrix,
    /// duplicate or out-of-range coordinates, non-canonical symmetric input)
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A length does not match the size the target requires
    #[error("size mismatch: {what} has length {found}, expected {expected}")]
    SizeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// Label already present in an index
    #[error("duplicate label: '{0}'")]
    DuplicateLabel(String),
}

impl Error {
    /// Create a type mismatch error
    pub fn type_mismatch(holds: &'static str, asked: &'static str) -> Self {
        Error::TypeMismatch { holds, asked }
    }

    /// Create an out-of-bounds error
    pub fn out_of_bounds(what: &'static str, index: usize, len: usize) -> Self {
        Error::OutOfBounds { what, index, len }
    }

    /// Create a shape mismatch error
    pub fn shape(msg: impl Into<String>) -> Self {
        Error::ShapeMismatch(msg.into())
    }

    /// Create a size mismatch error
    pub fn size(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Error::SizeMismatch {
            what: what.into(),
            expected,
            found,
        }
    }

    /// Create a duplicate label error
    pub fn duplicate_label(label: impl Into<String>) -> Self {
        Error::DuplicateLabel(label.into())
    }
}
