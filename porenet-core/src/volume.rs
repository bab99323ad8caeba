//! Dense 3D byte volumes.
//!
//! The same container carries three domain meanings across the pipeline:
//! grayscale intensity (segmentation input), a binary pore/solid mask
//! (cluster-labelling input, [`PORE`]/[`SOLID`]), and the ternary
//! pore/surface/bulk classification emitted by the morphology reductions.
//! The skeleton core only ever consumes the binary view.

use crate::error::VolumeError;
use crate::voxel::{Shape, Voxel};

/// Byte value flagging a pore voxel in the binary view.
pub const PORE: u8 = 1;
/// Byte value flagging a solid voxel in the binary view.
pub const SOLID: u8 = 0;

/// A dense 3D byte array laid out x-fastest, then y, then z.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volume {
    shape: Shape,
    data: Vec<u8>,
}

impl Volume {
    /// Wraps a raw byte payload, checking it against `shape`.
    ///
    /// # Errors
    /// Returns [`VolumeError::SizeMismatch`] when the payload length does
    /// not equal the product of the extents, and [`VolumeError::EmptyShape`]
    /// when any extent is zero.
    pub fn from_raw(shape: Shape, data: Vec<u8>) -> Result<Self, VolumeError> {
        if shape.is_empty() {
            return Err(VolumeError::EmptyShape { shape });
        }
        if data.len() != shape.len() {
            return Err(VolumeError::SizeMismatch {
                shape,
                expected: shape.len(),
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates a volume with every voxel set to `value`.
    ///
    /// # Panics
    /// Panics when `shape` has a zero extent.
    #[must_use]
    pub fn filled(shape: Shape, value: u8) -> Self {
        assert!(!shape.is_empty(), "volume shape {shape:?} has a zero extent");
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }

    /// The cube extents.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Reads the byte at `voxel`.
    ///
    /// # Panics
    /// Panics when `voxel` lies outside the cube.
    #[must_use]
    pub fn get(&self, voxel: Voxel) -> u8 {
        self.data[self.shape.linear_index(voxel)]
    }

    /// Writes the byte at `voxel`.
    ///
    /// # Panics
    /// Panics when `voxel` lies outside the cube.
    pub fn set(&mut self, voxel: Voxel, value: u8) {
        let index = self.shape.linear_index(voxel);
        self.data[index] = value;
    }

    /// Binary view: true when the voxel is flagged as pore.
    #[must_use]
    pub fn is_pore(&self, voxel: Voxel) -> bool {
        self.get(voxel) == PORE
    }

    /// Binary view: a pore voxel with at least one 26-neighbour that is
    /// not pore. Neighbours outside the cube count as non-pore, so every
    /// pore voxel on an outer face is a contour voxel.
    #[must_use]
    pub fn is_contour(&self, voxel: Voxel) -> bool {
        if !self.is_pore(voxel) {
            return false;
        }
        self.shape.neighbours(voxel).count() < 26
            || self
                .shape
                .neighbours(voxel)
                .any(|neighbour| !self.is_pore(neighbour))
    }

    /// Counts the voxels holding `value`.
    #[must_use]
    pub fn count(&self, value: u8) -> usize {
        self.data.iter().filter(|&&byte| byte == value).count()
    }

    /// The underlying bytes in layout order.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the volume, returning the underlying bytes.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_mismatched_payload() {
        let err = Volume::from_raw(Shape::new(2, 2, 2), vec![0; 7]).expect_err("size mismatch");
        assert!(matches!(
            err,
            VolumeError::SizeMismatch {
                expected: 8,
                actual: 7,
                ..
            }
        ));
    }

    #[test]
    fn from_raw_rejects_zero_extent() {
        let err = Volume::from_raw(Shape::new(0, 4, 4), Vec::new()).expect_err("empty shape");
        assert!(matches!(err, VolumeError::EmptyShape { .. }));
    }

    #[test]
    fn contour_includes_outer_faces() {
        let volume = Volume::filled(Shape::new(3, 3, 3), PORE);
        assert!(volume.is_contour(Voxel::new(0, 1, 1)));
        assert!(!volume.is_contour(Voxel::new(1, 1, 1)));
    }

    #[test]
    fn contour_requires_a_non_pore_neighbour_in_the_interior() {
        let mut volume = Volume::filled(Shape::new(5, 5, 5), PORE);
        volume.set(Voxel::new(2, 2, 2), SOLID);
        assert!(volume.is_contour(Voxel::new(2, 2, 1)));
        assert!(!volume.is_contour(Voxel::new(2, 2, 2)));
    }
}
