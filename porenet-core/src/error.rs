//! Error types for the porenet core library.

use thiserror::Error;

use crate::voxel::Shape;

/// Error raised when constructing a [`crate::volume::Volume`] from raw bytes.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum VolumeError {
    /// The byte payload does not match the product of the shape extents.
    #[error("volume data holds {actual} bytes but shape {shape:?} requires {expected}")]
    SizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },
    /// A volume must have a non-zero extent along every axis.
    #[error("volume shape {shape:?} has a zero extent")]
    EmptyShape { shape: Shape },
}

/// Convenient alias for results returned by the core API.
pub type Result<T, E = VolumeError> = core::result::Result<T, E>;
