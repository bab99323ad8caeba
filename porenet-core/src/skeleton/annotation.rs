//! Per-voxel seed annotations produced by the distance transform.

use std::collections::HashMap;

use crate::heap::Handle;
use crate::voxel::{Shape, Voxel};

/// Distance-transform record attached to one pore voxel.
///
/// Invariant: `distance` always equals the sum of the squared per-axis
/// `displacements`, which in turn accumulate the absolute per-axis offsets
/// walked from `seed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedAnnotation {
    /// Exact squared Euclidean distance to the owning boundary voxel.
    pub distance: u64,
    /// Accumulated absolute per-axis offsets to the owning boundary voxel.
    pub displacements: [i64; 3],
    /// 26-connected boundary component containing the owning voxel.
    pub contour_label: u32,
    /// Flood-fill enumeration rank of the owning voxel within its contour.
    pub pixel_label: u32,
    /// The boundary voxel that claimed this voxel.
    pub seed: Voxel,
    pub(crate) removed: bool,
    pub(crate) handle: Option<Handle>,
}

impl SeedAnnotation {
    /// Annotation of a boundary voxel: it owns itself at distance zero.
    #[must_use]
    pub(crate) fn boundary(voxel: Voxel, contour_label: u32, pixel_label: u32) -> Self {
        Self {
            distance: 0,
            displacements: [0; 3],
            contour_label,
            pixel_label,
            seed: voxel,
            removed: false,
            handle: None,
        }
    }
}

/// Mapping from pore voxel to its [`SeedAnnotation`].
///
/// Grows monotonically during the transform; annotations are never
/// removed, and once the transform marks one as settled it is never
/// relaxed again.
#[derive(Debug)]
pub struct AnnotationMap {
    shape: Shape,
    entries: HashMap<Voxel, SeedAnnotation>,
}

impl AnnotationMap {
    #[must_use]
    pub(crate) fn new(shape: Shape) -> Self {
        Self {
            shape,
            entries: HashMap::new(),
        }
    }

    /// The shape of the annotated cube.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// True when `voxel` carries an annotation.
    #[must_use]
    pub fn has(&self, voxel: Voxel) -> bool {
        self.entries.contains_key(&voxel)
    }

    /// The annotation of `voxel`, if present.
    #[must_use]
    pub fn get(&self, voxel: Voxel) -> Option<&SeedAnnotation> {
        self.entries.get(&voxel)
    }

    pub(crate) fn get_mut(&mut self, voxel: Voxel) -> Option<&mut SeedAnnotation> {
        self.entries.get_mut(&voxel)
    }

    pub(crate) fn insert(&mut self, voxel: Voxel, annotation: SeedAnnotation) {
        self.entries.insert(voxel, annotation);
    }

    /// Number of annotated voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no voxel is annotated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(voxel, annotation)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Voxel, &SeedAnnotation)> {
        self.entries.iter().map(|(&voxel, annotation)| (voxel, annotation))
    }

    /// Maximal seed divergence of `voxel`: the largest squared distance
    /// between its seed and the seed of any annotated 26-neighbour.
    /// Voxels where this is locally maximal are medial-axis candidates.
    ///
    /// Returns `None` when `voxel` itself carries no annotation.
    #[must_use]
    pub fn seed_divergence(&self, voxel: Voxel) -> Option<u64> {
        let own_seed = self.get(voxel)?.seed;
        Some(
            self.shape
                .neighbours(voxel)
                .filter_map(|neighbour| self.get(neighbour))
                .map(|annotation| own_seed.squared_distance(annotation.seed))
                .max()
                .unwrap_or(0),
        )
    }

    /// Annotated voxels whose seed divergence is not exceeded by any
    /// annotated 26-neighbour.
    #[must_use]
    pub fn medial_axis_candidates(&self) -> Vec<Voxel> {
        let mut candidates: Vec<Voxel> = self
            .entries
            .keys()
            .copied()
            .filter(|&voxel| {
                let own = self
                    .seed_divergence(voxel)
                    .expect("iterated voxels are annotated");
                self.shape
                    .neighbours(voxel)
                    .filter_map(|neighbour| self.seed_divergence(neighbour))
                    .all(|divergence| divergence <= own)
            })
            .collect();
        candidates.sort_unstable();
        candidates
    }
}
