//! Exact Euclidean distance transform via the image-foresting transform.
//!
//! Every contour voxel enters a min-priority queue at distance zero. The
//! queue drains in `(distance, insertion order)` order; each settled
//! voxel tries to relax its pore 26-neighbours with the path cost
//! obtained by extending its accumulated per-axis displacements. Because
//! the displacement vector is carried exactly, the converged field is the
//! true squared Euclidean distance, not a chamfer approximation.

use std::cmp::Ordering;

use tracing::debug;

use crate::heap::HandleHeap;
use crate::volume::Volume;
use crate::voxel::Voxel;

use super::annotation::{AnnotationMap, SeedAnnotation};
use super::contour::compute_contours;

/// Queue priority: distance first, then the heap's own FIFO sequence.
#[derive(Clone, Copy, Debug)]
struct IftKey {
    distance: u64,
    voxel: Voxel,
}

impl PartialEq for IftKey {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for IftKey {}

impl PartialOrd for IftKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IftKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.cmp(&other.distance)
    }
}

/// Runs the distance transform over the pore mask.
///
/// An empty pore mask yields an empty annotation map; that is a
/// domain-legitimate result, not an error.
#[must_use]
pub fn skeletonize(volume: &Volume) -> AnnotationMap {
    let shape = volume.shape();
    let mut annotations = AnnotationMap::new(shape);
    let (seeds, stats) = compute_contours(volume, &mut annotations);
    debug!(
        contours = stats.contours,
        seeds = seeds.len(),
        "contour discovery complete"
    );

    let mut queue = HandleHeap::with_capacity(seeds.len());
    for voxel in seeds {
        let handle = queue.insert(IftKey { distance: 0, voxel });
        annotations
            .get_mut(voxel)
            .expect("contour voxels are annotated")
            .handle = Some(handle);
    }

    while let Some(key) = queue.pop() {
        let origin = {
            let annotation = annotations
                .get_mut(key.voxel)
                .expect("queued voxels are annotated");
            annotation.removed = true;
            annotation.handle = None;
            annotation.clone()
        };
        for neighbour in shape.neighbours(key.voxel) {
            if volume.is_pore(neighbour) {
                relax(&mut annotations, &mut queue, key.voxel, &origin, neighbour);
            }
        }
    }

    annotations
}

fn relax(
    annotations: &mut AnnotationMap,
    queue: &mut HandleHeap<IftKey>,
    origin_voxel: Voxel,
    origin: &SeedAnnotation,
    neighbour: Voxel,
) {
    if annotations.get(neighbour).is_some_and(|a| a.removed) {
        return;
    }

    let mut displacements = [0i64; 3];
    let mut distance = 0u64;
    for axis in 0..3 {
        let step =
            (neighbour.coordinate(axis) as i64 - origin_voxel.coordinate(axis) as i64).abs();
        let accumulated = origin.displacements[axis] + step;
        displacements[axis] = accumulated;
        distance += (accumulated * accumulated) as u64;
    }

    match annotations.get_mut(neighbour) {
        None => {
            let handle = queue.insert(IftKey {
                distance,
                voxel: neighbour,
            });
            annotations.insert(
                neighbour,
                SeedAnnotation {
                    distance,
                    displacements,
                    contour_label: origin.contour_label,
                    pixel_label: origin.pixel_label,
                    seed: origin.seed,
                    removed: false,
                    handle: Some(handle),
                },
            );
        }
        Some(annotation) if distance < annotation.distance => {
            annotation.distance = distance;
            annotation.displacements = displacements;
            annotation.contour_label = origin.contour_label;
            annotation.pixel_label = origin.pixel_label;
            annotation.seed = origin.seed;
            let handle = annotation.handle.expect("unsettled voxels stay queued");
            queue.decrease(
                handle,
                IftKey {
                    distance,
                    voxel: neighbour,
                },
            );
        }
        Some(_) => {}
    }
}
