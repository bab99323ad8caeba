//! The centerline set: extraction, branch bookkeeping, and splitting.
//!
//! Centerlines are extracted by walking predecessor chains backwards from
//! the sinks of a routing run. Voxels already emitted by an earlier walk
//! close the current segment and become branch points. Cycle candidates
//! reported by the router are accepted only when the ridge path
//! connecting their nearest maxima passes the topological-thinness
//! checks of the skeleton literature.

use std::collections::HashSet;
use std::mem;

use crate::graph::PoreGraph;
use crate::voxel::Voxel;

use super::line::{Centerline, CenterlineNode, LineStatistics};
use super::router::RouteResult;

/// An unordered collection of centerlines with per-line statistics.
#[derive(Debug, Default)]
pub struct CenterlineSet {
    lines: Vec<Centerline>,
    statistics: Vec<LineStatistics>,
    used: HashSet<Voxel>,
    branches: HashSet<Voxel>,
}

impl CenterlineSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored centerlines.
    #[must_use]
    pub fn lines(&self) -> &[Centerline] {
        &self.lines
    }

    /// Per-line statistics, parallel to [`Self::lines`].
    #[must_use]
    pub fn statistics(&self) -> &[LineStatistics] {
        &self.statistics
    }

    /// Number of centerlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no centerline has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when `voxel` was recorded as a branch point.
    #[must_use]
    pub fn is_branch(&self, voxel: Voxel) -> bool {
        self.branches.contains(&voxel)
    }

    /// Extracts the centerline ending at `sink` from a routing run and
    /// adds its segments to the set. An unreached sink adds nothing;
    /// that is a domain-legitimate empty result.
    pub fn add_path<G: PoreGraph>(&mut self, route: &RouteResult, graph: &G, sink: Voxel) {
        let Some(annotation) = route.annotation(sink) else {
            return;
        };
        if !annotation.is_reached() {
            return;
        }
        let segments = self.extract_segments(route, graph, sink);
        self.add_all(segments);
    }

    /// Validates a cycle candidate `(a, b)` reported by the router and,
    /// when the connecting ridge path is topologically thin, adds the
    /// centerlines ending at both vertices.
    pub fn add_cycle<G: PoreGraph>(&mut self, route: &RouteResult, graph: &G, a: Voxel, b: Voxel) {
        let ridge = build_ridge_path(route, graph, a, b);
        if !self.is_thin_ridge(graph, &ridge) {
            return;
        }
        let segments_a = self.extract_segments(route, graph, a);
        self.add_all(segments_a);
        let segments_b = self.extract_segments(route, graph, b);
        self.add_all(segments_b);
    }

    /// Splits every stored line at its internal branch points, appending
    /// the tails, then regenerates all statistics. Afterwards branch
    /// points appear only as endpoints.
    pub fn split_by_branch_points(&mut self) {
        self.statistics.clear();
        let mut index = 0;
        // Appended tails are scanned too, so chains of branch points
        // split fully.
        while index < self.lines.len() {
            for node_index in 0..self.lines[index].len() {
                if !self.branches.contains(&self.lines[index].node(node_index).voxel) {
                    continue;
                }
                let tail = self.lines[index].split(node_index);
                if !tail.is_empty() {
                    self.lines.push(tail);
                    break;
                }
            }
            index += 1;
        }
        self.statistics = self.lines.iter().map(LineStatistics::compute).collect();
    }

    fn add_all(&mut self, segments: Vec<Centerline>) {
        for segment in segments {
            self.statistics.push(LineStatistics::compute(&segment));
            self.lines.push(segment);
        }
    }

    /// Walks predecessors backwards from `end_point`, cutting segments
    /// where the walk crosses voxels already claimed by earlier lines.
    fn extract_segments<G: PoreGraph>(
        &mut self,
        route: &RouteResult,
        graph: &G,
        end_point: Voxel,
    ) -> Vec<Centerline> {
        let mut builder: Vec<CenterlineNode> = Vec::new();
        let mut segments: Vec<Centerline> = Vec::new();
        let mut point = end_point;
        let mut prev_point = end_point;
        let mut is_end_point = true;
        let mut is_building = true;

        while let Some(previous) = route
            .annotation(point)
            .expect("walked voxels are annotated")
            .predecessor
        {
            let was_building = is_building;
            let (added, add_prev) = self.handle_node(
                &mut builder,
                &mut segments,
                graph,
                point,
                prev_point,
                &mut is_building,
            );
            if !added && was_building && !is_building && !is_end_point {
                self.branches.insert(point);
            }
            if add_prev {
                self.branches.insert(prev_point);
            }
            self.used.insert(point);

            prev_point = point;
            point = previous;
            is_end_point = false;
        }

        // The source terminates the walk and closes the open segment.
        let (added, add_prev) = self.handle_node(
            &mut builder,
            &mut segments,
            graph,
            point,
            prev_point,
            &mut is_building,
        );
        if added {
            if add_prev {
                self.branches.insert(prev_point);
            }
            segments.push(close_segment(&mut builder));
            self.used.insert(point);
        }

        segments
    }

    /// One step of the segment builder. Returns `(added, add_prev)`:
    /// whether `point` opened or extended a segment, and whether the
    /// previous voxel was re-emitted to anchor a freshly opened one.
    fn handle_node<G: PoreGraph>(
        &self,
        builder: &mut Vec<CenterlineNode>,
        segments: &mut Vec<Centerline>,
        graph: &G,
        point: Voxel,
        prev_point: Voxel,
        is_building: &mut bool,
    ) -> (bool, bool) {
        let mut add_prev = false;
        if !self.used.contains(&point) {
            if !*is_building {
                builder.push(node_at(graph, prev_point));
                add_prev = true;
            }
            *is_building = true;
            builder.push(node_at(graph, point));
            return (true, add_prev);
        }
        if !builder.is_empty() {
            if *is_building {
                // Close the running segment on the meeting voxel.
                builder.push(node_at(graph, point));
                segments.push(close_segment(builder));
            }
            *is_building = false;
            return (false, add_prev);
        }
        *is_building = false;
        (false, add_prev)
    }

    /// Checks the candidate ridge path against the thinness requirements:
    /// distinct endpoints, no short-circuit across consecutive triples,
    /// and no deeper or already-claimed neighbour crowding the path.
    fn is_thin_ridge<G: PoreGraph>(&self, graph: &G, path: &[Voxel]) -> bool {
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return false;
        };
        if first == last {
            return false;
        }

        if path.len() == 3 {
            let (p0, p1, p2) = (path[0], path[1], path[2]);
            if !no_short_circuit(p0, p1, p2) {
                return false;
            }
            for neighbour in graph.neighbours(p1) {
                if !self.thin_at(p0, p1, p2, neighbour) {
                    return false;
                }
                if neighbour.is_face_neighbour(p1)
                    && neighbour != p0
                    && neighbour != p2
                    && graph.radius(neighbour) > graph.radius(p1)
                {
                    return false;
                }
                if !neighbour.is_corner_neighbour(p1)
                    && neighbour != p1
                    && neighbour != p0
                    && graph.radius(neighbour) > graph.radius(p2)
                {
                    return false;
                }
            }
            return true;
        }

        if path.len() > 3 {
            for i in 0..path.len() - 3 {
                let (p0, p1, p2) = (path[i], path[i + 1], path[i + 2]);
                if !no_short_circuit(p0, p1, p2) {
                    return false;
                }
                for neighbour in graph.neighbours(p1) {
                    if !self.thin_at(first, p1, last, neighbour) {
                        return false;
                    }
                    if !no_dominating_neighbour(graph, p0, p1, p2, neighbour) {
                        return false;
                    }
                    let ascending =
                        graph.radius(p0) < graph.radius(p1) || graph.radius(p1) < graph.radius(p2);
                    let monotone = if ascending {
                        monotone_ridge_neighbour(graph, p0, p1, p2, neighbour)
                    } else {
                        monotone_ridge_neighbour(graph, p2, p1, p0, neighbour)
                    };
                    if !monotone {
                        return false;
                    }
                }
            }
            return true;
        }

        false
    }

    /// A face-neighbour crowding an already-claimed middle voxel breaks
    /// thinness.
    fn thin_at(&self, start: Voxel, middle: Voxel, end: Voxel, neighbour: Voxel) -> bool {
        !(neighbour.is_face_neighbour(middle)
            && neighbour != start
            && neighbour != end
            && self.used.contains(&middle))
    }
}

/// The walk emits nodes sink-first; stored lines read source to sink.
fn close_segment(builder: &mut Vec<CenterlineNode>) -> Centerline {
    let mut nodes = mem::take(builder);
    nodes.reverse();
    Centerline::new(nodes)
}

fn node_at<G: PoreGraph>(graph: &G, voxel: Voxel) -> CenterlineNode {
    CenterlineNode {
        voxel,
        radius: graph.radius(voxel),
    }
}

fn edge_or_face(a: Voxel, b: Voxel) -> bool {
    a.is_face_neighbour(b) || a.is_edge_neighbour(b)
}

/// Consecutive voxels must be face- or edge-connected and the triple must
/// not short-circuit from its first to its third voxel.
fn no_short_circuit(p0: Voxel, p1: Voxel, p2: Voxel) -> bool {
    !edge_or_face(p0, p2) && edge_or_face(p0, p1) && edge_or_face(p1, p2)
}

/// No non-maximal face-neighbour of the middle voxel may be deeper than
/// it.
fn no_dominating_neighbour<G: PoreGraph>(
    graph: &G,
    p0: Voxel,
    p1: Voxel,
    p2: Voxel,
    neighbour: Voxel,
) -> bool {
    !(neighbour.is_face_neighbour(p1)
        && !graph.is_local_max(neighbour)
        && neighbour != p0
        && neighbour != p2
        && graph.radius(neighbour) > graph.radius(p1))
}

/// A neighbour touching the middle voxel but not the entry voxel must
/// not exceed the exit voxel's depth.
fn monotone_ridge_neighbour<G: PoreGraph>(
    graph: &G,
    entry: Voxel,
    middle: Voxel,
    exit: Voxel,
    neighbour: Voxel,
) -> bool {
    !(edge_or_face(neighbour, middle)
        && !edge_or_face(neighbour, entry)
        && neighbour != middle
        && neighbour != entry
        && graph.radius(neighbour) > graph.radius(exit))
}

/// Reconstructs the ridge path joining a cycle-candidate pair: from `a`
/// back to its nearest local maximum, then from `b` down to its own.
fn build_ridge_path<G: PoreGraph>(
    route: &RouteResult,
    graph: &G,
    a: Voxel,
    b: Voxel,
) -> Vec<Voxel> {
    let mut stack = vec![a];
    while let Some(previous) = route
        .annotation(*stack.last().expect("stack is non-empty"))
        .and_then(|annotation| annotation.predecessor)
    {
        if graph.is_local_max(*stack.last().expect("stack is non-empty")) {
            break;
        }
        stack.push(previous);
    }
    stack.reverse();

    let mut path = stack;
    path.push(b);
    while let Some(previous) = route
        .annotation(*path.last().expect("path is non-empty"))
        .and_then(|annotation| annotation.predecessor)
    {
        if graph.is_local_max(*path.last().expect("path is non-empty")) {
            break;
        }
        path.push(previous);
    }
    path
}
