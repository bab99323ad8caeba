//! Plateau clustering of local-maximum voxels.
//!
//! Two local maxima share a cluster when a path of local maxima connects
//! them through face or edge steps; corner-diagonal steps do not count.
//! The router consults these clusters to decide whether two competing
//! paths have already met the same pair of plateaus.

use std::collections::VecDeque;

use crate::graph::PoreGraph;
use crate::voxel::Voxel;

/// Cluster label of a vertex outside every plateau.
pub(crate) const UNCLUSTERED: i64 = -1;

/// Handle over the discovered plateau clusters.
#[derive(Clone, Copy, Debug)]
pub struct MaximaClusters {
    labels: u32,
}

impl MaximaClusters {
    /// Number of clusters discovered.
    #[must_use]
    pub fn label_count(&self) -> u32 {
        self.labels
    }

    /// Order-independent key identifying an unordered pair of cluster
    /// labels.
    #[must_use]
    pub fn pair_key(&self, a: i64, b: i64) -> i64 {
        a.min(b) * i64::from(self.labels) + a.max(b)
    }

    /// Cluster label of `voxel`, [`UNCLUSTERED`] when it belongs to none.
    pub(crate) fn label_of<G: PoreGraph>(graph: &G, voxel: Voxel) -> i64 {
        if !graph.contains(voxel) {
            return UNCLUSTERED;
        }
        graph
            .cluster_id(voxel)
            .map_or(UNCLUSTERED, i64::from)
    }
}

/// Labels every connected plateau of local maxima and memoises the
/// local-maximum flag on all visited vertices.
pub fn discover_maxima<G: PoreGraph>(graph: &mut G) -> MaximaClusters {
    let mut vertices: Vec<Voxel> = graph.vertices().collect();
    vertices.sort_unstable();

    let mut next_label = 0u32;
    for voxel in vertices {
        if graph.is_local_max(voxel) {
            graph.set_local_max(voxel, true);
            if graph.cluster_id(voxel).is_none() {
                flood_plateau(graph, voxel, next_label);
                next_label += 1;
            }
        } else {
            graph.set_local_max(voxel, false);
        }
    }

    MaximaClusters { labels: next_label }
}

fn flood_plateau<G: PoreGraph>(graph: &mut G, seed: Voxel, label: u32) {
    let mut queue = VecDeque::new();
    queue.push_back(seed);
    while let Some(voxel) = queue.pop_front() {
        graph.set_cluster_id(voxel, label);
        for neighbour in graph.neighbours(voxel) {
            if neighbour.is_corner_neighbour(voxel) {
                continue;
            }
            if graph.is_local_max(neighbour) {
                graph.set_local_max(neighbour, true);
                if graph.cluster_id(neighbour).is_none() {
                    graph.set_cluster_id(neighbour, label);
                    queue.push_back(neighbour);
                }
            } else {
                graph.set_local_max(neighbour, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::HashGraph;
    use crate::skeleton::skeletonize;
    use crate::volume::{PORE, SOLID, Volume};
    use crate::voxel::Shape;

    #[test]
    fn plateau_voxels_share_one_cluster() {
        // A 2x2x2 pore block is a single plateau of boundary voxels.
        let mut volume = Volume::filled(Shape::new(4, 4, 4), SOLID);
        for z in 1..3 {
            for y in 1..3 {
                for x in 1..3 {
                    volume.set(Voxel::new(x, y, z), PORE);
                }
            }
        }
        let annotations = skeletonize(&volume);
        let mut graph = HashGraph::build(&annotations);
        let clusters = discover_maxima(&mut graph);
        assert_eq!(clusters.label_count(), 1);
        for voxel in graph.vertices().collect::<Vec<_>>() {
            assert_eq!(graph.cluster_id(voxel), Some(0));
            assert_eq!(graph.cached_local_max(voxel), Some(true));
        }
    }

    #[test]
    fn separate_plateaus_get_distinct_labels() {
        let mut volume = Volume::filled(Shape::new(9, 3, 3), SOLID);
        volume.set(Voxel::new(1, 1, 1), PORE);
        volume.set(Voxel::new(7, 1, 1), PORE);
        let annotations = skeletonize(&volume);
        let mut graph = HashGraph::build(&annotations);
        let clusters = discover_maxima(&mut graph);
        assert_eq!(clusters.label_count(), 2);
        assert_ne!(
            graph.cluster_id(Voxel::new(1, 1, 1)),
            graph.cluster_id(Voxel::new(7, 1, 1))
        );
    }

    #[test]
    fn pair_keys_are_symmetric_and_distinct() {
        let clusters = MaximaClusters { labels: 5 };
        assert_eq!(clusters.pair_key(1, 3), clusters.pair_key(3, 1));
        assert_ne!(clusters.pair_key(0, 1), clusters.pair_key(0, 2));
        assert_ne!(clusters.pair_key(1, 2), clusters.pair_key(2, 3));
    }

    #[test]
    fn non_maximal_vertices_get_a_false_cache() {
        let volume = Volume::filled(Shape::new(5, 5, 5), PORE);
        let annotations = skeletonize(&volume);
        let mut graph = HashGraph::build(&annotations);
        discover_maxima(&mut graph);
        assert_eq!(graph.cached_local_max(Voxel::new(1, 2, 2)), Some(false));
        assert_eq!(graph.cached_local_max(Voxel::new(2, 2, 2)), Some(true));
    }
}
