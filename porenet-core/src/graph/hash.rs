//! Hash-keyed pore graph (memory flavour).

use std::collections::HashMap;

use crate::skeleton::AnnotationMap;
use crate::voxel::{Shape, Voxel};

use super::{PoreGraph, VertexRecord};

/// Pore graph backed by a map from voxel coordinate to vertex record.
#[derive(Debug)]
pub struct HashGraph {
    shape: Shape,
    vertices: HashMap<Voxel, VertexRecord>,
}

impl HashGraph {
    /// Materialises the annotated pore voxels as a graph.
    #[must_use]
    pub fn build(annotations: &AnnotationMap) -> Self {
        let vertices = annotations
            .iter()
            .map(|(voxel, annotation)| (voxel, VertexRecord::new(annotation.distance)))
            .collect();
        Self {
            shape: annotations.shape(),
            vertices,
        }
    }

    fn record(&self, voxel: Voxel) -> &VertexRecord {
        self.vertices
            .get(&voxel)
            .unwrap_or_else(|| panic!("vertex {voxel:?} does not exist in graph"))
    }

    fn record_mut(&mut self, voxel: Voxel) -> &mut VertexRecord {
        self.vertices
            .get_mut(&voxel)
            .unwrap_or_else(|| panic!("vertex {voxel:?} does not exist in graph"))
    }
}

impl PoreGraph for HashGraph {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn contains(&self, voxel: Voxel) -> bool {
        self.vertices.contains_key(&voxel)
    }

    fn radius(&self, voxel: Voxel) -> f64 {
        self.record(voxel).radius
    }

    fn squared_distance(&self, voxel: Voxel) -> u64 {
        self.record(voxel).distance
    }

    fn neighbours(&self, voxel: Voxel) -> Vec<Voxel> {
        assert!(
            self.contains(voxel),
            "vertex {voxel:?} does not exist in graph"
        );
        self.shape
            .neighbours(voxel)
            .filter(|neighbour| self.contains(*neighbour))
            .collect()
    }

    fn cluster_id(&self, voxel: Voxel) -> Option<u32> {
        self.record(voxel).cluster
    }

    fn set_cluster_id(&mut self, voxel: Voxel, cluster: u32) {
        self.record_mut(voxel).cluster = Some(cluster);
    }

    fn cached_local_max(&self, voxel: Voxel) -> Option<bool> {
        self.record(voxel).local_max
    }

    fn set_local_max(&mut self, voxel: Voxel, flag: bool) {
        self.record_mut(voxel).local_max = Some(flag);
    }

    fn vertices(&self) -> Box<dyn Iterator<Item = Voxel> + '_> {
        Box::new(self.vertices.keys().copied())
    }
}
