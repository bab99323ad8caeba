//! Unit tests for the gradient-biased router.

use crate::graph::{FlatGraph, HashGraph, PoreGraph};
use crate::skeleton::skeletonize;
use crate::volume::{PORE, SOLID, Volume};
use crate::voxel::{Shape, Voxel};

use super::super::maxima::{MaximaClusters, discover_maxima};
use super::Router;

fn prepared(volume: &Volume) -> (HashGraph, MaximaClusters) {
    let mut graph = HashGraph::build(&skeletonize(volume));
    let maxima = discover_maxima(&mut graph);
    (graph, maxima)
}

#[test]
fn routing_from_an_absent_source_yields_none() {
    let volume = Volume::filled(Shape::new(3, 3, 3), PORE);
    let (graph, maxima) = prepared(&volume);
    let router = Router::new(&graph, maxima);
    assert!(router.route(Voxel::new(10, 10, 10)).is_none());
}

#[test]
fn full_cube_run_reaches_every_vertex_with_chains_to_the_source() {
    let volume = Volume::filled(Shape::new(10, 10, 10), PORE);
    let mut graph = FlatGraph::build(&skeletonize(&volume));
    let maxima = discover_maxima(&mut graph);
    let router = Router::new(&graph, maxima);
    let source = Voxel::new(0, 0, 0);
    let result = router.route(source).expect("source is in the graph");

    assert_eq!(result.len(), 1000);
    for voxel in graph.vertices().collect::<Vec<_>>() {
        let annotation = result.annotation(voxel).expect("vertex was reached");
        assert!(annotation.is_reached());
        if voxel != source {
            assert!(annotation.priority > 0.0, "at {voxel:?}");
        }

        // The predecessor chain stays on the graph and ends at the source.
        let mut cursor = voxel;
        let mut steps = 0;
        while let Some(previous) = result
            .annotation(cursor)
            .expect("chain stays annotated")
            .predecessor
        {
            assert!(graph.contains(previous));
            assert!(previous.is_neighbour(cursor));
            cursor = previous;
            steps += 1;
            assert!(steps <= 1000, "predecessor chain does not terminate");
        }
        assert_eq!(cursor, source);
    }
}

#[test]
fn channel_routing_walks_the_channel() {
    let mut volume = Volume::filled(Shape::new(3, 3, 20), SOLID);
    for z in 0..20 {
        volume.set(Voxel::new(1, 1, z), PORE);
    }
    let (graph, maxima) = prepared(&volume);
    let router = Router::new(&graph, maxima);
    let source = Voxel::new(1, 1, 0);
    let sink = Voxel::new(1, 1, 19);
    let result = router.route(source).expect("source is in the graph");

    let mut walked = vec![sink];
    let mut cursor = sink;
    while let Some(previous) = result.annotation(cursor).expect("reached").predecessor {
        walked.push(previous);
        cursor = previous;
    }
    walked.reverse();

    let expected: Vec<Voxel> = (0..20).map(|z| Voxel::new(1, 1, z)).collect();
    assert_eq!(walked, expected);
}

#[test]
fn accumulated_distances_grow_along_the_path() {
    let volume = Volume::filled(Shape::new(6, 6, 6), PORE);
    let (graph, maxima) = prepared(&volume);
    let router = Router::new(&graph, maxima);
    let result = router
        .route(Voxel::new(0, 0, 0))
        .expect("source is in the graph");

    for voxel in graph.vertices().collect::<Vec<_>>() {
        let annotation = result.annotation(voxel).expect("reached");
        if let Some(previous) = annotation.predecessor {
            let reference = result.annotation(previous).expect("reached");
            assert!(annotation.accumulated_distance > reference.accumulated_distance);
        }
    }
}

#[test]
fn plateau_labels_flow_along_the_path() {
    let mut volume = Volume::filled(Shape::new(3, 3, 12), SOLID);
    for z in 0..12 {
        volume.set(Voxel::new(1, 1, z), PORE);
    }
    let (graph, maxima) = prepared(&volume);
    // The whole channel is one plateau of tied maxima.
    assert_eq!(maxima.label_count(), 1);
    let router = Router::new(&graph, maxima);
    let result = router
        .route(Voxel::new(1, 1, 0))
        .expect("source is in the graph");
    for z in 0..12 {
        let annotation = result.annotation(Voxel::new(1, 1, z)).expect("reached");
        assert_eq!(annotation.path_cluster, 0);
    }
}
