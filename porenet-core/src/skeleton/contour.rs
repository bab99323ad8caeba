//! Boundary discovery: contour labelling of the pore surface.
//!
//! A flood fill over 26-connectivity partitions the contour voxels into
//! connected boundary components. Each component receives a
//! `contour_label`, and the fill's visit order numbers its voxels with a
//! 1-based `pixel_label`.

use std::collections::VecDeque;

use crate::volume::Volume;
use crate::voxel::Voxel;

use super::annotation::{AnnotationMap, SeedAnnotation};

/// Summary of the contour fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContourStats {
    /// Number of 26-connected boundary components.
    pub contours: u32,
    /// Voxel count of each contour, indexed by `contour_label - 1`.
    pub pixels_per_contour: Vec<u32>,
}

/// Computes the contour partition statistics of a pore mask.
#[must_use]
pub fn contour_statistics(volume: &Volume) -> ContourStats {
    let mut annotations = AnnotationMap::new(volume.shape());
    compute_contours(volume, &mut annotations).1
}

/// Seeds `annotations` with one [`SeedAnnotation`] per contour voxel and
/// returns the seeds in flood-fill visit order alongside the fill
/// statistics.
pub(super) fn compute_contours(
    volume: &Volume,
    annotations: &mut AnnotationMap,
) -> (Vec<Voxel>, ContourStats) {
    let shape = volume.shape();
    let mut seeds = Vec::new();
    let mut pixels_per_contour = Vec::new();
    let mut contour_label = 0u32;

    for start in shape.voxels() {
        if !volume.is_contour(start) || annotations.has(start) {
            continue;
        }
        contour_label += 1;
        let pixels = fill_contour(volume, annotations, &mut seeds, start, contour_label);
        pixels_per_contour.push(pixels);
    }

    (
        seeds,
        ContourStats {
            contours: contour_label,
            pixels_per_contour,
        },
    )
}

fn fill_contour(
    volume: &Volume,
    annotations: &mut AnnotationMap,
    seeds: &mut Vec<Voxel>,
    start: Voxel,
    contour_label: u32,
) -> u32 {
    let shape = volume.shape();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    let mut pixel_label = 0u32;

    while let Some(voxel) = queue.pop_front() {
        if !volume.is_contour(voxel) || annotations.has(voxel) {
            continue;
        }
        pixel_label += 1;
        annotations.insert(voxel, SeedAnnotation::boundary(voxel, contour_label, pixel_label));
        seeds.push(voxel);
        for neighbour in shape.neighbours(voxel) {
            if volume.is_contour(neighbour) && !annotations.has(neighbour) {
                queue.push_back(neighbour);
            }
        }
    }

    pixel_label
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::volume::{PORE, SOLID};
    use crate::voxel::Shape;

    #[test]
    fn all_pore_cube_has_one_contour_covering_the_shell() {
        let volume = Volume::filled(Shape::new(3, 3, 3), PORE);
        let mut annotations = AnnotationMap::new(volume.shape());
        let (seeds, stats) = compute_contours(&volume, &mut annotations);
        // Every voxel of a 3x3x3 cube touches the outer surface.
        assert_eq!(stats.contours, 1);
        assert_eq!(stats.pixels_per_contour, vec![27]);
        assert_eq!(seeds.len(), 27);
    }

    #[test]
    fn separate_pore_bodies_get_distinct_contour_labels() {
        let mut volume = Volume::filled(Shape::new(7, 3, 3), SOLID);
        volume.set(Voxel::new(1, 1, 1), PORE);
        volume.set(Voxel::new(5, 1, 1), PORE);
        let mut annotations = AnnotationMap::new(volume.shape());
        let (_, stats) = compute_contours(&volume, &mut annotations);
        assert_eq!(stats.contours, 2);
        assert_ne!(
            annotations.get(Voxel::new(1, 1, 1)).expect("seeded").contour_label,
            annotations.get(Voxel::new(5, 1, 1)).expect("seeded").contour_label,
        );
    }

    #[test]
    fn pixel_labels_are_monotonic_within_a_contour() {
        let volume = Volume::filled(Shape::new(4, 4, 1), PORE);
        let mut annotations = AnnotationMap::new(volume.shape());
        let (seeds, stats) = compute_contours(&volume, &mut annotations);
        assert_eq!(stats.contours, 1);
        for (rank, voxel) in seeds.iter().enumerate() {
            let annotation = annotations.get(*voxel).expect("seeded");
            assert_eq!(annotation.pixel_label as usize, rank + 1);
            assert_eq!(annotation.distance, 0);
            assert_eq!(annotation.seed, *voxel);
        }
    }
}
