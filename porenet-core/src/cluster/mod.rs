//! Percolating-cluster labelling of the pore space.
//!
//! A single sweep of the enhanced Hoshen–Kopelman algorithm labels every
//! 26-connected component of pore voxels while tracking per-cluster sizes
//! and bounding boxes. Only the clusters whose bounding box spans the
//! whole cube along every axis — the infinite clusters of percolation
//! theory — are kept; all other pore voxels are rewritten to solid.

mod link_table;

use std::collections::HashSet;

use tracing::debug;

use crate::volume::{PORE, SOLID, Volume};
use crate::voxel::{Shape, Voxel};

use link_table::LinkTable;

/// Counts reported by [`retain_percolating`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterOutcome {
    /// Number of distinct 26-connected pore clusters found.
    pub clusters: usize,
    /// Number of clusters spanning the cube along every axis.
    pub percolating: usize,
}

/// Inclusive per-cluster bounding box, absent once a cluster has been
/// merged away.
#[derive(Clone, Copy, Debug)]
struct BoundingBox {
    min: [usize; 3],
    max: [usize; 3],
}

impl BoundingBox {
    fn at(voxel: Voxel) -> Self {
        let point = [voxel.x, voxel.y, voxel.z];
        Self {
            min: point,
            max: point,
        }
    }

    fn include(&mut self, voxel: Voxel) {
        let point = [voxel.x, voxel.y, voxel.z];
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    fn merge(&mut self, other: &Self) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(other.min[axis]);
            self.max[axis] = self.max[axis].max(other.max[axis]);
        }
    }

    /// True when the inclusive extents multiply out to the full cube,
    /// i.e. the box spans every axis end to end.
    fn spans(&self, shape: Shape) -> bool {
        (0..3)
            .map(|axis| self.max[axis] - self.min[axis] + 1)
            .product::<usize>()
            == shape.len()
    }
}

/// Rewrites a binary pore mask in place, keeping only the voxels that
/// belong to a percolating 26-connected pore cluster.
///
/// # Panics
/// Panics when the consistency check after labelling finds a pore voxel
/// whose labelled neighbour disagrees; that indicates a labelling bug and
/// is unrecoverable.
pub fn retain_percolating(volume: &mut Volume) -> ClusterOutcome {
    let shape = volume.shape();
    let mut labels = vec![0u32; shape.len()];
    let mut link = LinkTable::new();
    let mut boxes: Vec<Option<BoundingBox>> = vec![None];

    sweep(volume, &mut labels, &mut link, &mut boxes);
    verify(volume, &mut labels, &mut link);

    let percolating = percolating_labels(&link, &boxes, shape);
    let clusters = link.proper_labels().count();
    debug!(
        clusters,
        percolating = percolating.len(),
        "cluster labelling complete"
    );

    for (index, &label) in labels.iter().enumerate() {
        let keep = label != 0 && percolating.contains(&label);
        volume.set(shape.voxel_at(index), if keep { PORE } else { SOLID });
    }

    ClusterOutcome {
        clusters,
        percolating: percolating.len(),
    }
}

fn sweep(
    volume: &Volume,
    labels: &mut [u32],
    link: &mut LinkTable,
    boxes: &mut Vec<Option<BoundingBox>>,
) {
    let shape = volume.shape();
    let mut found = Vec::with_capacity(13);
    for voxel in shape.voxels() {
        if !volume.is_pore(voxel) {
            continue;
        }

        found.clear();
        for neighbour in shape.preceding_neighbours(voxel) {
            let label = labels[shape.linear_index(neighbour)];
            if label != 0 {
                found.push(link.proper(label));
            }
        }
        found.sort_unstable();
        found.dedup();

        let index = shape.linear_index(voxel);
        match found.as_slice() {
            [] => {
                let label = link.allocate();
                labels[index] = label;
                boxes.push(Some(BoundingBox::at(voxel)));
            }
            [label] => {
                labels[index] = *label;
                link.grow(*label, 1);
                bounding_box(boxes, *label).include(voxel);
            }
            [target, rest @ ..] => {
                // Smallest label absorbs the others so the merge result is
                // independent of sweep order.
                let target = *target;
                labels[index] = target;
                let absorbed: i64 = rest.iter().map(|&label| link.size(label)).sum();
                link.grow(target, 1 + absorbed);
                for &label in rest {
                    let merged = boxes[label as usize]
                        .take()
                        .expect("a proper label has a bounding box");
                    bounding_box(boxes, target).merge(&merged);
                    link.alias(label, target);
                }
                bounding_box(boxes, target).include(voxel);
            }
        }
    }
}

fn bounding_box(boxes: &mut [Option<BoundingBox>], label: u32) -> &mut BoundingBox {
    boxes[label as usize]
        .as_mut()
        .expect("a proper label has a bounding box")
}

/// Second sweep: resolve every stored label to its proper label and check
/// that neighbouring pore voxels agree. Off-cube neighbours are unknown
/// and pass.
fn verify(volume: &Volume, labels: &mut [u32], link: &mut LinkTable) {
    let shape = volume.shape();
    for entry in labels.iter_mut() {
        if *entry != 0 {
            *entry = link.proper(*entry);
        }
    }
    for voxel in shape.voxels() {
        let label = labels[shape.linear_index(voxel)];
        if label == 0 {
            continue;
        }
        for neighbour in shape.neighbours(voxel) {
            let neighbour_label = labels[shape.linear_index(neighbour)];
            assert!(
                neighbour_label == 0 || neighbour_label == label,
                "cluster labelling is inconsistent at {voxel:?}: \
                 neighbour {neighbour:?} holds label {neighbour_label} instead of {label}"
            );
        }
    }
}

/// Walks the clusters largest first; once one fails to span the cube no
/// smaller cluster can, so the walk stops there.
fn percolating_labels(
    link: &LinkTable,
    boxes: &[Option<BoundingBox>],
    shape: Shape,
) -> HashSet<u32> {
    let mut sized: Vec<(u32, i64)> = link.proper_labels().collect();
    sized.sort_unstable_by_key(|&(label, size)| (std::cmp::Reverse(size), label));

    let mut percolating = HashSet::new();
    for (label, _) in sized {
        let spans = boxes[label as usize]
            .as_ref()
            .expect("a proper label has a bounding box")
            .spans(shape);
        if !spans {
            break;
        }
        percolating.insert(label);
    }
    percolating
}
