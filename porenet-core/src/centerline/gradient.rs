//! Interior-pointing gradient of the boundary distance field.
//!
//! The gradient at a pore voxel is the distance-weighted sum of the
//! offsets to its pore neighbours, normalised to unit length: it points
//! away from the nearest pore wall. The router scores every step against
//! it — a step parallel (or anti-parallel) to the gradient is free, a
//! perpendicular one costs the full penalty.

use std::collections::HashSet;

use crate::graph::PoreGraph;
use crate::voxel::Voxel;

const TOLERANCE: f64 = 1.0e-5;

/// A 3D direction vector with `f64` components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3(pub [f64; 3]);

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self([0.0; 3]);

    /// Offset vector `from - to` between two voxel coordinates.
    #[must_use]
    pub fn between(from: Voxel, to: Voxel) -> Self {
        Self([
            from.x as f64 - to.x as f64,
            from.y as f64 - to.y as f64,
            from.z as f64 - to.z as f64,
        ])
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.0.iter().zip(other.0).map(|(a, b)| a * b).sum()
    }

    /// Squared Euclidean norm.
    #[must_use]
    pub fn squared_norm(self) -> f64 {
        self.dot(self)
    }

    /// Unit-length copy, or the zero vector when the squared norm falls
    /// below the tolerance.
    #[must_use]
    pub fn normalised(self) -> Self {
        let squared = self.squared_norm();
        if squared <= TOLERANCE {
            return Self::ZERO;
        }
        let norm = squared.sqrt();
        Self(self.0.map(|component| component / norm))
    }

    /// True when `self + other` vanishes within tolerance on every axis.
    #[must_use]
    pub fn sum_is_zero(self, other: Self) -> bool {
        self.0
            .iter()
            .zip(other.0)
            .all(|(a, b)| (a + b).abs() <= TOLERANCE)
    }
}

/// On-demand gradient computation over a pore graph, masked by the
/// router's frontier of already-settled voxels.
pub struct GradientField<'g, G> {
    graph: &'g G,
    visited: HashSet<Voxel>,
}

impl<'g, G: PoreGraph> GradientField<'g, G> {
    /// Creates a field with an empty visited set.
    #[must_use]
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            visited: HashSet::new(),
        }
    }

    /// Adds `voxel` to the visited set; visited voxels stop contributing
    /// to [`Self::compute`].
    pub fn mark_visited(&mut self, voxel: Voxel) {
        self.visited.insert(voxel);
    }

    /// True when `voxel` has been marked visited.
    #[must_use]
    pub fn is_visited(&self, voxel: Voxel) -> bool {
        self.visited.contains(&voxel)
    }

    /// Unit gradient at `voxel` over its unvisited pore neighbours.
    #[must_use]
    pub fn compute(&self, voxel: Voxel) -> Vec3 {
        let mut gradient = Vec3::ZERO;
        for neighbour in self.graph.shape().neighbours(voxel) {
            if !self.graph.contains(neighbour) || self.is_visited(neighbour) {
                continue;
            }
            self.accumulate(&mut gradient, voxel, neighbour);
        }
        gradient.normalised()
    }

    /// Unit gradient at `voxel` excluding one specific neighbour and all
    /// corner-diagonal neighbours. Used to evaluate a step against the
    /// gradient it would see at its destination.
    #[must_use]
    pub fn compute_ignoring(&self, voxel: Voxel, ignored: Voxel) -> Vec3 {
        let mut gradient = Vec3::ZERO;
        for neighbour in self.graph.shape().neighbours(voxel) {
            if !self.graph.contains(neighbour)
                || neighbour == ignored
                || neighbour.is_corner_neighbour(voxel)
            {
                continue;
            }
            self.accumulate(&mut gradient, voxel, neighbour);
        }
        gradient.normalised()
    }

    fn accumulate(&self, gradient: &mut Vec3, voxel: Voxel, neighbour: Voxel) {
        let distance = self.graph.squared_distance(neighbour) as f64;
        let offset = Vec3::between(neighbour, voxel);
        for axis in 0..3 {
            gradient.0[axis] += offset.0[axis] * distance;
        }
    }

    /// Penalty of stepping `from -> to` under `gradient`: zero when the
    /// step is parallel or anti-parallel to the gradient, one when
    /// perpendicular.
    #[must_use]
    pub fn step_penalty(&self, from: Voxel, to: Voxel, gradient: Vec3) -> f64 {
        let direction = Vec3::between(to, from).normalised();
        let dot = direction.dot(gradient);
        1.0 - dot * dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::HashGraph;
    use crate::skeleton::skeletonize;
    use crate::volume::{PORE, SOLID, Volume};
    use crate::voxel::Shape;

    fn channel_graph() -> HashGraph {
        let mut volume = Volume::filled(Shape::new(5, 5, 9), SOLID);
        for z in 0..9 {
            for y in 1..4 {
                for x in 1..4 {
                    volume.set(Voxel::new(x, y, z), PORE);
                }
            }
        }
        HashGraph::build(&skeletonize(&volume))
    }

    #[test]
    fn gradient_points_toward_the_channel_axis() {
        let graph = channel_graph();
        let field = GradientField::new(&graph);
        let gradient = field.compute(Voxel::new(1, 1, 4));
        // The channel centre lies toward growing x and y.
        assert!(gradient.0[0] > 0.0);
        assert!(gradient.0[1] > 0.0);
        let norm = gradient.squared_norm();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gradient_vanishes_on_a_symmetric_plateau() {
        let graph = channel_graph();
        let field = GradientField::new(&graph);
        // On the channel axis the neighbour contributions cancel.
        let gradient = field.compute(Voxel::new(2, 2, 4));
        assert_eq!(gradient, Vec3::ZERO);
    }

    #[test]
    fn visited_neighbours_stop_contributing() {
        let graph = channel_graph();
        let mut field = GradientField::new(&graph);
        let before = field.compute(Voxel::new(2, 2, 4));
        for y in 1..4 {
            for x in 1..4 {
                field.mark_visited(Voxel::new(x, y, 3));
            }
        }
        let after = field.compute(Voxel::new(2, 2, 4));
        assert_eq!(before, Vec3::ZERO);
        // With the preceding slice masked the gradient tips forward.
        assert!(after.0[2] > 0.0);
    }

    #[test]
    fn step_penalty_spans_zero_to_one() {
        let graph = channel_graph();
        let field = GradientField::new(&graph);
        let axial = Vec3([0.0, 0.0, 1.0]);
        let along = field.step_penalty(Voxel::new(2, 2, 3), Voxel::new(2, 2, 4), axial);
        let against = field.step_penalty(Voxel::new(2, 2, 4), Voxel::new(2, 2, 3), axial);
        let across = field.step_penalty(Voxel::new(2, 2, 3), Voxel::new(3, 2, 3), axial);
        assert!(along.abs() < 1e-9);
        assert!(against.abs() < 1e-9);
        assert!((across - 1.0).abs() < 1e-9);
    }

    #[test]
    fn opposite_offsets_sum_to_zero() {
        let a = Vec3::between(Voxel::new(1, 2, 3), Voxel::new(2, 2, 3));
        let b = Vec3::between(Voxel::new(3, 2, 3), Voxel::new(2, 2, 3));
        assert!(a.sum_is_zero(b));
        assert!(!a.sum_is_zero(a));
    }
}
