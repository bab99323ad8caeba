//! Neighbour-addressable views of the annotated pore space.
//!
//! Both flavours expose the same [`PoreGraph`] contract; they differ only
//! in the storage trade-off. The hash-keyed flavour pays per-vertex hash
//! overhead but scales with the pore volume; the flat-indexed flavour
//! linearises coordinates into parallel arrays sized to the full cube,
//! buying O(1) lookups at O(N) memory regardless of porosity.

mod flat;
mod hash;

pub use flat::FlatGraph;
pub use hash::HashGraph;

use crate::voxel::{Shape, Voxel};

/// Storage flavour selection, driven by the `performance` configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphFlavour {
    /// Flat-indexed graph: fastest lookups, O(N) memory.
    Speed,
    /// Hash-keyed graph: memory proportional to the pore volume.
    Memory,
}

/// Per-vertex payload shared by both graph flavours.
#[derive(Clone, Debug)]
pub(crate) struct VertexRecord {
    pub(crate) distance: u64,
    pub(crate) radius: f64,
    pub(crate) local_max: Option<bool>,
    pub(crate) cluster: Option<u32>,
}

impl VertexRecord {
    pub(crate) fn new(distance: u64) -> Self {
        Self {
            distance,
            radius: (distance as f64).sqrt(),
            local_max: None,
            cluster: None,
        }
    }
}

/// Contract shared by the speed- and memory-favouring graphs.
///
/// Accessors taking a vertex panic when it is absent; callers must guard
/// with [`PoreGraph::contains`]. An absent-vertex access is a programming
/// error, not a recoverable condition.
pub trait PoreGraph {
    /// Extents of the underlying cube.
    fn shape(&self) -> Shape;

    /// True when `voxel` is a vertex of the graph.
    fn contains(&self, voxel: Voxel) -> bool;

    /// Inscribed-sphere radius at `voxel`: the square root of its
    /// squared boundary distance.
    fn radius(&self, voxel: Voxel) -> f64;

    /// Exact squared boundary distance at `voxel`.
    fn squared_distance(&self, voxel: Voxel) -> u64;

    /// The 26-neighbours of `voxel` that are themselves vertices.
    fn neighbours(&self, voxel: Voxel) -> Vec<Voxel>;

    /// Plateau cluster of local maxima containing `voxel`, once assigned.
    fn cluster_id(&self, voxel: Voxel) -> Option<u32>;

    /// Assigns `voxel` to a plateau cluster.
    fn set_cluster_id(&mut self, voxel: Voxel, cluster: u32);

    /// Memoised local-maximum flag, if it has been computed.
    fn cached_local_max(&self, voxel: Voxel) -> Option<bool>;

    /// Stores the local-maximum flag for `voxel`.
    fn set_local_max(&mut self, voxel: Voxel, flag: bool);

    /// Iterates all vertices in unspecified order.
    fn vertices(&self) -> Box<dyn Iterator<Item = Voxel> + '_>;

    /// True when no non-corner 26-neighbour strictly exceeds this
    /// voxel's radius. Corner-diagonal neighbours (Chebyshev distance 3)
    /// are excluded from the comparison. Served from the memoised flag
    /// when available.
    fn is_local_max(&self, voxel: Voxel) -> bool {
        if let Some(cached) = self.cached_local_max(voxel) {
            return cached;
        }
        let own = self.radius(voxel);
        self.neighbours(voxel)
            .into_iter()
            .filter(|&neighbour| !neighbour.is_corner_neighbour(voxel))
            .all(|neighbour| self.radius(neighbour) <= own)
    }
}
