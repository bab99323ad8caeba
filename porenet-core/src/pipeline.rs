//! End-to-end orchestration of the centerline pipeline.
//!
//! Stages run strictly in sequence: percolation filtering, the distance
//! transform, graph materialisation in the configured flavour, maxima
//! discovery, one routing run per inlet centerpoint, and finally branch
//! splitting of the collected set. Everything is synchronous and single
//! threaded; each stage owns its input and hands a new structure to the
//! next.

use tracing::{info, instrument};

use crate::centerline::{CenterlineSet, Centerpoint, Router, discover_maxima, face_centerpoints};
use crate::cluster::{ClusterOutcome, retain_percolating};
use crate::graph::{FlatGraph, GraphFlavour, HashGraph, PoreGraph};
use crate::skeleton::skeletonize;
use crate::volume::Volume;

/// What one full pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Cluster counts from the percolation filter.
    pub clusters: ClusterOutcome,
    /// The extracted centerline set, empty when nothing percolates.
    pub centerlines: CenterlineSet,
}

/// Runs the full pipeline over a binary pore mask, rewriting it to the
/// percolating mask in place.
///
/// A sample with no percolating cluster yields an empty centerline set;
/// that is a legitimate result, not an error.
#[instrument(name = "pipeline.run", skip(volume), fields(shape = ?volume.shape()))]
pub fn run(volume: &mut Volume, flavour: GraphFlavour) -> PipelineOutcome {
    let clusters = retain_percolating(volume);
    info!(
        clusters = clusters.clusters,
        percolating = clusters.percolating,
        "percolation filtering complete"
    );
    if clusters.percolating == 0 {
        info!("no percolating cluster, emitting an empty centerline set");
        return PipelineOutcome {
            clusters,
            centerlines: CenterlineSet::new(),
        };
    }

    let centerlines = extract_centerlines(volume, flavour);
    PipelineOutcome {
        clusters,
        centerlines,
    }
}

/// Extracts centerlines from an already percolation-filtered pore mask.
#[instrument(name = "pipeline.extract", skip(volume))]
pub fn extract_centerlines(volume: &Volume, flavour: GraphFlavour) -> CenterlineSet {
    let annotations = skeletonize(volume);
    info!(annotated = annotations.len(), "distance transform complete");
    match flavour {
        GraphFlavour::Speed => route_all_sources(FlatGraph::build(&annotations)),
        GraphFlavour::Memory => route_all_sources(HashGraph::build(&annotations)),
    }
}

fn route_all_sources<G: PoreGraph>(mut graph: G) -> CenterlineSet {
    let maxima = discover_maxima(&mut graph);
    info!(plateaus = maxima.label_count(), "maxima discovery complete");

    let shape = graph.shape();
    let sources: Vec<(usize, Centerpoint)> = (0..3)
        .flat_map(|axis| {
            face_centerpoints(&graph, axis, 0)
                .into_iter()
                .map(move |point| (axis, point))
        })
        .collect();
    let mut sinks: Vec<Centerpoint> = Vec::new();
    for axis in 0..3 {
        sinks.extend(face_centerpoints(&graph, axis, 0));
        sinks.extend(face_centerpoints(&graph, axis, shape.extent(axis) - 1));
    }
    info!(
        sources = sources.len(),
        sinks = sinks.len(),
        "endpoint discovery complete"
    );

    let router = Router::new(&graph, maxima);
    let mut set = CenterlineSet::new();
    for (axis, source) in sources {
        let Some(result) = router.route(source.voxel) else {
            continue;
        };
        // Sinks on the source's own face plane are not targets.
        let plane = source.voxel.coordinate(axis);
        for sink in &sinks {
            if sink.voxel.coordinate(axis) != plane {
                set.add_path(&result, &graph, sink.voxel);
            }
        }
        for &(a, b) in &result.cycle_candidates {
            set.add_cycle(&result, &graph, a, b);
        }
    }

    set.split_by_branch_points();
    info!(centerlines = set.len(), "centerline extraction complete");
    set
}
