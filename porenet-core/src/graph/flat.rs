//! Flat-indexed pore graph (speed flavour).

use crate::skeleton::AnnotationMap;
use crate::voxel::{Shape, Voxel};

use super::{PoreGraph, VertexRecord};

/// Pore graph backed by cube-sized parallel arrays with a presence
/// bitmap. Lookup is a single linearised index.
#[derive(Debug)]
pub struct FlatGraph {
    shape: Shape,
    present: Vec<bool>,
    records: Vec<VertexRecord>,
}

impl FlatGraph {
    /// Materialises the annotated pore voxels as a graph.
    #[must_use]
    pub fn build(annotations: &AnnotationMap) -> Self {
        let shape = annotations.shape();
        let mut present = vec![false; shape.len()];
        let mut records = vec![VertexRecord::new(0); shape.len()];
        for (voxel, annotation) in annotations.iter() {
            let index = shape.linear_index(voxel);
            present[index] = true;
            records[index] = VertexRecord::new(annotation.distance);
        }
        Self {
            shape,
            present,
            records,
        }
    }

    fn index(&self, voxel: Voxel) -> usize {
        let index = self.shape.linear_index(voxel);
        assert!(
            self.present[index],
            "vertex {voxel:?} does not exist in graph"
        );
        index
    }
}

impl PoreGraph for FlatGraph {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn contains(&self, voxel: Voxel) -> bool {
        self.shape.contains(voxel) && self.present[self.shape.linear_index(voxel)]
    }

    fn radius(&self, voxel: Voxel) -> f64 {
        self.records[self.index(voxel)].radius
    }

    fn squared_distance(&self, voxel: Voxel) -> u64 {
        self.records[self.index(voxel)].distance
    }

    fn neighbours(&self, voxel: Voxel) -> Vec<Voxel> {
        let _ = self.index(voxel);
        self.shape
            .neighbours(voxel)
            .filter(|neighbour| self.present[self.shape.linear_index(*neighbour)])
            .collect()
    }

    fn cluster_id(&self, voxel: Voxel) -> Option<u32> {
        self.records[self.index(voxel)].cluster
    }

    fn set_cluster_id(&mut self, voxel: Voxel, cluster: u32) {
        let index = self.index(voxel);
        self.records[index].cluster = Some(cluster);
    }

    fn cached_local_max(&self, voxel: Voxel) -> Option<bool> {
        self.records[self.index(voxel)].local_max
    }

    fn set_local_max(&mut self, voxel: Voxel, flag: bool) {
        let index = self.index(voxel);
        self.records[index].local_max = Some(flag);
    }

    fn vertices(&self) -> Box<dyn Iterator<Item = Voxel> + '_> {
        let shape = self.shape;
        Box::new(
            self.present
                .iter()
                .enumerate()
                .filter(|(_, &present)| present)
                .map(move |(index, _)| shape.voxel_at(index)),
        )
    }
}
