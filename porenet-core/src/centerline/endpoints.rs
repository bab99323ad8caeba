//! Pore-opening centerpoints on the cube faces.
//!
//! Each outer face of the cube is partitioned into its 2D-connected pore
//! components; the voxel of maximal inscribed-sphere radius inside a
//! component is the centerpoint of that pore opening. One face's
//! centerpoints act as routing sources, the others' as sinks.

use std::collections::{HashSet, VecDeque};

use crate::graph::PoreGraph;
use crate::voxel::Voxel;

/// A pore-opening centerpoint on a cube face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centerpoint {
    /// The centerpoint voxel.
    pub voxel: Voxel,
    /// Inscribed-sphere radius at the centerpoint.
    pub radius: f64,
}

/// Finds the centerpoint of every pore opening on the face
/// `{ v | v.coordinate(axis) == coordinate }`.
///
/// Components are flooded through the in-plane 26-neighbourhood (eight
/// in-plane neighbours) restricted to graph vertices.
#[must_use]
pub fn face_centerpoints<G: PoreGraph>(
    graph: &G,
    axis: usize,
    coordinate: usize,
) -> Vec<Centerpoint> {
    let shape = graph.shape();
    let mut used: HashSet<Voxel> = HashSet::new();
    let mut centerpoints = Vec::new();

    for voxel in shape.voxels() {
        if voxel.coordinate(axis) != coordinate || !graph.contains(voxel) || used.contains(&voxel)
        {
            continue;
        }
        centerpoints.push(flood_component(graph, axis, voxel, &mut used));
    }

    centerpoints
}

fn flood_component<G: PoreGraph>(
    graph: &G,
    axis: usize,
    start: Voxel,
    used: &mut HashSet<Voxel>,
) -> Centerpoint {
    let shape = graph.shape();
    let mut best = start;
    let mut best_distance = graph.squared_distance(start);
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(voxel) = queue.pop_front() {
        if !used.insert(voxel) {
            continue;
        }
        for neighbour in shape.neighbours_in_plane(voxel, axis) {
            if !graph.contains(neighbour) || used.contains(&neighbour) {
                continue;
            }
            queue.push_back(neighbour);
            let candidate = graph.squared_distance(neighbour);
            if candidate > best_distance {
                best = neighbour;
                best_distance = candidate;
            }
        }
    }

    Centerpoint {
        voxel: best,
        radius: graph.radius(best),
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
    fn single_opening_yields_one_centerpoint() {
        let mut volume = Volume::filled(Shape::new(5, 5, 7), SOLID);
        for z in 0..7 {
            for y in 1..4 {
                for x in 1..4 {
                    volume.set(Voxel::new(x, y, z), PORE);
                }
            }
        }
        let graph = HashGraph::build(&skeletonize(&volume));
        let points = face_centerpoints(&graph, 2, 0);
        // Every voxel of the opening touches the face, so all tie at
        // radius zero and the sweep's first voxel wins.
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].voxel, Voxel::new(1, 1, 0));
        assert_eq!(points[0].radius, 0.0);
    }

    #[test]
    fn disjoint_openings_yield_one_centerpoint_each() {
        let mut volume = Volume::filled(Shape::new(9, 3, 4), SOLID);
        for z in 0..4 {
            volume.set(Voxel::new(1, 1, z), PORE);
            volume.set(Voxel::new(7, 1, z), PORE);
        }
        let graph = HashGraph::build(&skeletonize(&volume));
        let points = face_centerpoints(&graph, 2, 0);
        assert_eq!(points.len(), 2);
        let voxels: Vec<Voxel> = points.iter().map(|p| p.voxel).collect();
        assert!(voxels.contains(&Voxel::new(1, 1, 0)));
        assert!(voxels.contains(&Voxel::new(7, 1, 0)));
    }

    #[test]
    fn face_without_pores_yields_no_centerpoints() {
        let mut volume = Volume::filled(Shape::new(4, 4, 4), SOLID);
        volume.set(Voxel::new(1, 1, 1), PORE);
        let graph = HashGraph::build(&skeletonize(&volume));
        assert!(face_centerpoints(&graph, 0, 0).is_empty());
        assert!(face_centerpoints(&graph, 2, 3).is_empty());
    }
}
