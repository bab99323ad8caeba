//! Porenet core library.
//!
//! Extracts the centerline network of the connected pore space from a
//! segmented 3D tomographic volume. The pipeline labels the percolating
//! pore clusters, annotates every pore voxel with its exact squared
//! distance to the boundary via an image-foresting transform, and routes
//! gradient-biased minimum-cost paths between the pore openings on
//! opposing cube faces. The resulting polylines carry length,
//! tortuosity, and mean-radius statistics and convert into a capillary
//! node/link network for downstream flow simulation.

mod centerline;
mod cluster;
mod error;
mod graph;
mod heap;
mod morphology;
mod network;
mod pipeline;
mod segmentation;
mod skeleton;
mod volume;
mod voxel;

pub use crate::{
    centerline::{
        Centerline, CenterlineNode, CenterlineSet, Centerpoint, GradientField, LineStatistics,
        MaximaClusters, RouteAnnotation, RouteResult, Router, Vec3, discover_maxima,
        face_centerpoints,
    },
    cluster::{ClusterOutcome, retain_percolating},
    error::{Result, VolumeError},
    graph::{FlatGraph, GraphFlavour, HashGraph, PoreGraph},
    heap::{Handle, HandleHeap},
    morphology::{
        BoxCounts, PHASE_BULK, PHASE_PORE, PHASE_SURFACE, SurfaceReport, box_counting,
        classify_surfaces, porosity,
    },
    network::{Network, NetworkLink, NetworkNode},
    pipeline::{PipelineOutcome, extract_centerlines, run},
    segmentation::{
        Histogram, LEVELS, ThresholdRule, binarise, pore_fraction, select_threshold,
    },
    skeleton::{AnnotationMap, ContourStats, SeedAnnotation, contour_statistics, skeletonize},
    volume::{PORE, SOLID, Volume},
    voxel::{NEIGHBOUR_OFFSETS, Shape, Voxel},
};
