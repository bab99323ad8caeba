//! Gradient-biased single-source shortest paths over the pore graph.
//!
//! A Dijkstra-style traversal whose edge cost rewards staying on the
//! ridge of the distance field: traversing a deep voxel is cheap
//! (`1 / (1 + radius)`), and a large multiplier keeps that term dominant
//! while the gradient penalties only break ties. Steps are filtered so a
//! non-maximal vertex must sit on a locally convex ridge, and plateau
//! vertices are forced to turn. When the frontier re-encounters a
//! settled vertex across an unvisited pair of maxima plateaus with a
//! near-zero step penalty, the meeting edge is recorded as a
//! centerline-cycle candidate.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::graph::PoreGraph;
use crate::heap::{Handle, HandleHeap};
use crate::voxel::Voxel;

use super::gradient::{GradientField, Vec3};
use super::maxima::{MaximaClusters, UNCLUSTERED};

/// Weight multiplier that keeps the depth term dominant over the
/// accumulated penalties, which then only act as tie-breakers.
const WEIGHT_DOMINANCE: f64 = 1.0e3;

/// Step-penalty ceiling under which a frontier collision counts as a
/// centerline-cycle candidate.
const CYCLE_PENALTY_LIMIT: f64 = 0.1;

/// Scratch annotation attached to a vertex during one routing run.
#[derive(Clone, Debug)]
pub struct RouteAnnotation {
    /// Priority of the minimum-cost path reaching this vertex.
    pub priority: f64,
    /// Previous vertex on that path, absent for the source.
    pub predecessor: Option<Voxel>,
    /// Accumulated `1 / (1 + radius)` weights along the path.
    pub accumulated_distance: f64,
    /// Accumulated step penalties along the path.
    pub accumulated_penalty: f64,
    /// Maxima-plateau label propagated along the path.
    pub path_cluster: i64,
    pub(crate) removed: bool,
    handle: Option<Handle>,
}

impl RouteAnnotation {
    fn unreached() -> Self {
        Self {
            priority: f64::INFINITY,
            predecessor: None,
            accumulated_distance: 0.0,
            accumulated_penalty: 0.0,
            path_cluster: UNCLUSTERED,
            removed: false,
            handle: None,
        }
    }

    /// True when a path from the source reached this vertex.
    #[must_use]
    pub fn is_reached(&self) -> bool {
        self.priority.is_finite()
    }
}

/// Result of routing from one source: the predecessor forest plus the
/// frontier collisions recorded as cycle candidates.
#[derive(Debug, Default)]
pub struct RouteResult {
    annotations: HashMap<Voxel, RouteAnnotation>,
    /// Settled vertex pairs where two branches of the forest met.
    pub cycle_candidates: Vec<(Voxel, Voxel)>,
}

impl RouteResult {
    /// The annotation of `voxel`, if the run touched it.
    #[must_use]
    pub fn annotation(&self, voxel: Voxel) -> Option<&RouteAnnotation> {
        self.annotations.get(&voxel)
    }

    /// Number of touched vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// True when the run touched no vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Heap key: priority first, accumulated penalties second; the heap's
/// internal counter supplies the final FIFO tie-break.
#[derive(Clone, Copy, Debug)]
struct RouteKey {
    priority: f64,
    penalties: f64,
    voxel: Voxel,
}

impl PartialEq for RouteKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RouteKey {}

impl PartialOrd for RouteKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RouteKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.penalties.total_cmp(&other.penalties))
    }
}

/// Single-source centerline router over a maxima-annotated pore graph.
pub struct Router<'g, G> {
    graph: &'g G,
    maxima: MaximaClusters,
}

struct RunState<'g, G> {
    annotations: HashMap<Voxel, RouteAnnotation>,
    queue: HandleHeap<RouteKey>,
    gradient: GradientField<'g, G>,
    visited_pairs: HashSet<i64>,
    cycle_candidates: Vec<(Voxel, Voxel)>,
}

impl<'g, G: PoreGraph> Router<'g, G> {
    /// Creates a router over `graph`, whose maxima plateaus have already
    /// been discovered.
    #[must_use]
    pub fn new(graph: &'g G, maxima: MaximaClusters) -> Self {
        Self { graph, maxima }
    }

    /// Routes from `source`, returning `None` when the source is not a
    /// vertex of the graph. All scratch state, including the insertion
    /// counter behind the queue's FIFO tie-break, is scoped to this call.
    #[must_use]
    pub fn route(&self, source: Voxel) -> Option<RouteResult> {
        if !self.graph.contains(source) {
            return None;
        }

        let mut state = RunState {
            annotations: HashMap::new(),
            queue: HandleHeap::new(),
            gradient: GradientField::new(self.graph),
            visited_pairs: HashSet::new(),
            cycle_candidates: Vec::new(),
        };

        let mut origin = RouteAnnotation::unreached();
        origin.priority = 0.0;
        origin.removed = true;
        origin.path_cluster = MaximaClusters::label_of(self.graph, source);
        origin.handle = Some(state.queue.insert(RouteKey {
            priority: 0.0,
            penalties: 0.0,
            voxel: source,
        }));
        state.annotations.insert(source, origin);

        while let Some(key) = state.queue.pop() {
            self.settle(&mut state, key.voxel);
        }

        debug!(
            source = ?source,
            settled = state.annotations.len(),
            cycle_candidates = state.cycle_candidates.len(),
            "routing run complete"
        );

        Some(RouteResult {
            annotations: state.annotations,
            cycle_candidates: state.cycle_candidates,
        })
    }

    fn settle(&self, state: &mut RunState<'_, G>, vertex: Voxel) {
        let predecessor = {
            let annotation = state
                .annotations
                .get_mut(&vertex)
                .expect("queued vertices are annotated");
            annotation.removed = true;
            annotation.handle = None;
            annotation.predecessor
        };

        state.gradient.mark_visited(vertex);
        let gradient = state.gradient.compute(vertex);

        if let Some(previous) = predecessor {
            let pair = (
                self.path_label(state, vertex),
                self.path_label(state, previous),
            );
            self.mark_pair_visited(state, pair.0, pair.1);
        }

        for candidate in self.valid_neighbours(vertex, predecessor) {
            if state
                .annotations
                .get(&candidate)
                .is_some_and(|annotation| annotation.removed)
            {
                self.consider_cycle(state, vertex, candidate);
                continue;
            }
            self.relax(state, vertex, candidate, predecessor, gradient);
        }
    }

    fn relax(
        &self,
        state: &mut RunState<'_, G>,
        vertex: Voxel,
        candidate: Voxel,
        predecessor: Option<Voxel>,
        gradient: Vec3,
    ) {
        let reference = state
            .annotations
            .get(&vertex)
            .expect("settled vertices are annotated");
        let (priority, penalty, distance) = self.edge_cost(
            &state.gradient,
            gradient,
            vertex,
            candidate,
            predecessor,
            reference.accumulated_distance,
            reference.accumulated_penalty,
        );

        let current = state
            .annotations
            .entry(candidate)
            .or_insert_with(RouteAnnotation::unreached);
        if priority >= current.priority {
            return;
        }

        current.priority = priority;
        current.predecessor = Some(vertex);
        current.accumulated_distance = distance;
        current.accumulated_penalty = penalty;

        let key = RouteKey {
            priority,
            penalties: penalty,
            voxel: candidate,
        };
        match current.handle {
            Some(handle) => state.queue.decrease(handle, key),
            None => current.handle = Some(state.queue.insert(key)),
        }

        // A vertex inside a maxima plateau keeps its own cluster;
        // otherwise the label flows along the path.
        let own_cluster = MaximaClusters::label_of(self.graph, candidate);
        let label = if own_cluster != UNCLUSTERED {
            own_cluster
        } else {
            self.path_label(state, vertex)
        };
        state
            .annotations
            .get_mut(&candidate)
            .expect("annotation was just inserted")
            .path_cluster = label;
    }

    /// Cost of stepping `vertex -> candidate` under the gradient at the
    /// settled vertex. Returns `(priority, accumulated penalty,
    /// accumulated distance)` for the candidate.
    #[allow(clippy::too_many_arguments)]
    fn edge_cost(
        &self,
        field: &GradientField<'_, G>,
        gradient: Vec3,
        vertex: Voxel,
        candidate: Voxel,
        predecessor: Option<Voxel>,
        reference_distance: f64,
        reference_penalty: f64,
    ) -> (f64, f64, f64) {
        let weight = 1.0 / (1.0 + self.graph.radius(candidate));
        let accumulated_distance = reference_distance + weight;

        if !self.graph.is_local_max(vertex) {
            let mut penalty = field.step_penalty(vertex, candidate, gradient);
            if predecessor.is_some() {
                let destination_gradient = field.compute_ignoring(candidate, vertex);
                penalty += field.step_penalty(vertex, candidate, destination_gradient);
            }
            let accumulated_penalty = 0.5 + penalty * weight + weight;
            let priority =
                1.0 + reference_penalty + accumulated_penalty + WEIGHT_DOMINANCE * weight;
            return (priority, accumulated_penalty, accumulated_distance);
        }

        let mut direction_penalty = 0.0;
        if let Some(previous) = predecessor {
            let incoming = Vec3::between(previous, vertex);
            let outgoing = Vec3::between(candidate, vertex);
            // Straight through the plateau is free; turning costs half.
            direction_penalty = if incoming.sum_is_zero(outgoing) { 0.0 } else { 0.5 };
            if !self.graph.is_local_max(candidate) {
                let destination_gradient = field.compute_ignoring(candidate, vertex);
                direction_penalty += field.step_penalty(vertex, candidate, destination_gradient);
            }
        }
        direction_penalty += vertex.euclidean(candidate);

        let accumulated_penalty = direction_penalty * weight + weight;
        let priority = reference_penalty + accumulated_penalty + WEIGHT_DOMINANCE * weight;
        (priority, accumulated_penalty, accumulated_distance)
    }

    /// Keeps the candidates that continue a locally convex ridge.
    ///
    /// Corner-diagonal steps are always dropped, as are steps back onto a
    /// face-neighbour of the predecessor. A non-maximal vertex also drops
    /// a candidate when some deeper neighbour sits between the
    /// predecessor and the candidate. When the filter would leave
    /// nothing, it falls back to the looser list, then to the full
    /// neighbourhood.
    fn valid_neighbours(&self, vertex: Voxel, predecessor: Option<Voxel>) -> Vec<Voxel> {
        let neighbours = self.graph.neighbours(vertex);
        let Some(previous) = predecessor else {
            return neighbours;
        };

        let mut valid = Vec::new();
        let mut relaxed = Vec::new();

        if self.graph.is_local_max(vertex) {
            for &candidate in &neighbours {
                if candidate.is_corner_neighbour(vertex) {
                    continue;
                }
                if !candidate.is_face_neighbour(previous) {
                    valid.push(candidate);
                }
            }
        } else {
            let vertex_radius = self.graph.radius(vertex);
            for &candidate in &neighbours {
                if candidate.is_corner_neighbour(vertex) {
                    continue;
                }
                if candidate.is_face_neighbour(previous) {
                    continue;
                }
                let blocked = neighbours.iter().any(|&other| {
                    if other.is_corner_neighbour(vertex) || other == previous || other == candidate
                    {
                        return false;
                    }
                    let deeper = self.graph.radius(other) > vertex_radius;
                    if deeper && other.is_face_neighbour(vertex) {
                        return true;
                    }
                    deeper
                        && (other.is_edge_neighbour(previous) || other.is_face_neighbour(previous))
                        && (other.is_edge_neighbour(candidate)
                            || other.is_face_neighbour(candidate))
                });
                if !blocked {
                    valid.push(candidate);
                }
                relaxed.push(candidate);
            }
        }

        if !valid.is_empty() {
            valid
        } else if !relaxed.is_empty() {
            relaxed
        } else {
            neighbours
        }
    }

    /// Two branches of the forest met at a settled vertex. When their
    /// plateau pair is new and the meeting step runs nearly along the
    /// local gradient, record the edge as a cycle candidate.
    fn consider_cycle(&self, state: &mut RunState<'_, G>, vertex: Voxel, settled: Voxel) {
        let label_a = self.path_label(state, vertex);
        let label_b = self.path_label(state, settled);
        if self.is_pair_visited(state, label_a, label_b) {
            return;
        }
        let local_gradient = state.gradient.compute_ignoring(settled, vertex);
        let penalty = state.gradient.step_penalty(vertex, settled, local_gradient);
        if penalty < CYCLE_PENALTY_LIMIT {
            self.mark_pair_visited(state, label_a, label_b);
            state.cycle_candidates.push((vertex, settled));
        }
    }

    fn path_label(&self, state: &RunState<'_, G>, voxel: Voxel) -> i64 {
        state
            .annotations
            .get(&voxel)
            .map_or(UNCLUSTERED, |annotation| annotation.path_cluster)
    }

    fn is_pair_visited(&self, state: &RunState<'_, G>, a: i64, b: i64) -> bool {
        a == b || state.visited_pairs.contains(&self.maxima.pair_key(a, b))
    }

    fn mark_pair_visited(&self, state: &mut RunState<'_, G>, a: i64, b: i64) {
        if a != b {
            state.visited_pairs.insert(self.maxima.pair_key(a, b));
        }
    }
}

#[cfg(test)]
mod tests;
